//! Diagnostic check: one pooled connection, a fixed set of read-only queries
//!
//! No retries. Any failure is returned to the caller, which prints
//! [`troubleshooting_hints`] and exits non-zero.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tracing::{debug, info};

use crate::config::{ConnectionSettings, PoolConfig};
use crate::db::create_pool_with_options;
use crate::error::{Result, TripError};

/// Tables whose row counts the check reports
pub const COUNTED_TABLES: [&str; 3] = ["geo_locations", "flights", "attractions"];

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub target: String,
    pub server_time: DateTime<Utc>,
    /// Base tables in `public`, alphabetical
    pub tables: Vec<String>,
    pub row_counts: Vec<TableCount>,
}

impl DiagnosticReport {
    pub fn rows(&self, table: &str) -> Option<i64> {
        self.row_counts
            .iter()
            .find(|count| count.table == table)
            .map(|count| count.rows)
    }
}

/// Open a single-connection pool, run the diagnostic queries, close the pool.
pub async fn run(settings: &ConnectionSettings, pool_config: &PoolConfig) -> Result<DiagnosticReport> {
    let target = settings.target();
    let pool = create_pool_with_options(settings, 1, pool_config).await?;
    info!(target_db = %target, "connected");

    let report = collect(&pool, &target).await;
    pool.close().await;
    debug!("pool closed");
    report
}

/// Run the diagnostic queries on an existing pool
pub async fn collect(pool: &PgPool, target: &str) -> Result<DiagnosticReport> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| TripError::connect(target, e))?;

    let server_time = server_time(&mut conn).await?;
    let tables = base_tables(&mut conn).await?;

    let mut row_counts = Vec::with_capacity(COUNTED_TABLES.len());
    for table in COUNTED_TABLES {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let rows = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| TripError::query(table, e))?;
        debug!(table, rows, "counted rows");
        row_counts.push(TableCount { table, rows });
    }

    // Returns the connection to the pool before the caller closes it
    drop(conn);

    Ok(DiagnosticReport {
        target: target.to_string(),
        server_time,
        tables,
        row_counts,
    })
}

async fn server_time(conn: &mut PoolConnection<Postgres>) -> Result<DateTime<Utc>> {
    sqlx::query_scalar::<_, DateTime<Utc>>("SELECT NOW()")
        .fetch_one(&mut **conn)
        .await
        .map_err(|e| TripError::query("SELECT NOW()", e))
}

async fn base_tables(conn: &mut PoolConnection<Postgres>) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
    )
    .fetch_all(&mut **conn)
    .await
    .map_err(|e| TripError::query("list tables", e))
}

/// Remediation hints for a failed check
pub fn troubleshooting_hints(err: &TripError) -> Vec<&'static str> {
    let mut hints = Vec::new();
    match err {
        TripError::Connect { .. } | TripError::NotReady { .. } => {
            hints.push("Is the PostgreSQL server running and reachable from this host?");
            hints.push("Check DB_HOST, DB_PORT, DB_USER, DB_PASSWORD and DB_NAME (or DATABASE_URL).");
            hints.push("Make sure the database and user have been created on the server.");
        }
        TripError::Query { source, .. } => {
            if let sqlx::Error::Database(db) = source {
                // undefined_table
                if db.code().as_deref() == Some("42P01") {
                    hints.push("A tripdb table is missing: apply the schema with `tripdb init`.");
                }
            }
            hints.push("Check that the user can read the tripdb tables.");
        }
        _ => {}
    }
    hints.push("Run with --debug (or RUST_LOG=debug) for connection details.");
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn counts_the_three_core_tables() {
        assert_eq!(COUNTED_TABLES, ["geo_locations", "flights", "attractions"]);
    }

    #[test]
    fn report_row_lookup() {
        let report = DiagnosticReport {
            target: "t".to_string(),
            server_time: Utc::now(),
            tables: vec![],
            row_counts: vec![
                TableCount { table: "flights", rows: 7 },
                TableCount { table: "attractions", rows: 0 },
            ],
        };
        assert_eq!(report.rows("flights"), Some(7));
        assert_eq!(report.rows("attractions"), Some(0));
        assert_eq!(report.rows("geo_locations"), None);
    }

    #[test]
    fn connect_failures_point_at_env_vars() {
        let err = TripError::NotReady {
            target: "x".to_string(),
            waited: Duration::from_secs(1),
            attempts: 1,
        };
        let hints = troubleshooting_hints(&err);
        assert!(hints.iter().any(|h| h.contains("DB_HOST")));
        assert!(hints.last().unwrap().contains("--debug"));
    }

    #[test]
    fn query_failures_skip_connection_hints() {
        let err = TripError::query("flights", sqlx::Error::RowNotFound);
        let hints = troubleshooting_hints(&err);
        assert!(!hints.iter().any(|h| h.contains("DB_HOST")));
    }
}
