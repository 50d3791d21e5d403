//! `tripdb check` - connectivity and row-count diagnostics

use anyhow::{anyhow, Result};
use clap::Parser;
use tripdb_core::diagnostics::{self, troubleshooting_hints, DiagnosticReport};
use tripdb_core::TripdbConfig;

use super::{print_json, ConnectionArgs};

#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_check(args: CheckArgs) -> Result<()> {
    let config = TripdbConfig::load();
    let settings = args.connection.settings(&config);
    let pool_config = args.connection.pool_config(&config);

    match diagnostics::run(&settings, &pool_config).await {
        Ok(report) => {
            if args.json {
                print_json(&report)?;
            } else {
                print!("{}", render_report(&report));
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("✗ Database check failed: {}", err);
            eprintln!();
            eprintln!("Troubleshooting:");
            for hint in troubleshooting_hints(&err) {
                eprintln!("  - {}", hint);
            }
            Err(anyhow!("diagnostic check failed for {}", settings.target()))
        }
    }
}

fn render_report(report: &DiagnosticReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("✓ Connected to {}\n", report.target));
    out.push_str(&format!("  Server time: {}\n", report.server_time.to_rfc3339()));
    out.push_str(&format!("\nTables ({}):\n", report.tables.len()));
    if report.tables.is_empty() {
        out.push_str("  (none - run `tripdb init`)\n");
    }
    for table in &report.tables {
        out.push_str(&format!("  - {}\n", table));
    }
    out.push_str("\nRow counts:\n");
    for count in &report.row_counts {
        out.push_str(&format!("  {:<15} {}\n", count.table, count.rows));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tripdb_core::diagnostics::TableCount;

    #[test]
    fn renders_counts_and_tables() {
        let report = DiagnosticReport {
            target: "postgres@localhost:5432/tripdb".to_string(),
            server_time: Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
            tables: vec!["flights".to_string(), "geo_locations".to_string()],
            row_counts: vec![
                TableCount { table: "geo_locations", rows: 0 },
                TableCount { table: "flights", rows: 12 },
            ],
        };

        let text = render_report(&report);
        assert!(text.contains("Connected to postgres@localhost:5432/tripdb"));
        assert!(text.contains("2026-10-18T12:00:00+00:00"));
        assert!(text.contains("Tables (2):"));
        assert!(text.contains("  - geo_locations"));
        assert!(text.contains("flights         12"));
    }

    #[test]
    fn renders_empty_database_hint() {
        let report = DiagnosticReport {
            target: "t".to_string(),
            server_time: Utc::now(),
            tables: vec![],
            row_counts: vec![],
        };
        assert!(render_report(&report).contains("tripdb init"));
    }
}
