//! `tripdb init` - wait for the server, then apply the schema
//!
//! Destructive: the bundled schema drops and recreates every tripdb object.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tripdb_core::db::create_pool_with_options;
use tripdb_core::schema::{self, EXPECTED};
use tripdb_core::TripdbConfig;

use super::wait::{wait_for_server, PollArgs};
use super::ConnectionArgs;
use crate::ui;

#[derive(Parser, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub poll: PollArgs,

    /// Apply this SQL file instead of the bundled schema
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Skip the readiness wait and connect immediately
    #[arg(long)]
    pub skip_wait: bool,
}

pub async fn run_init(args: InitArgs) -> Result<()> {
    let config = TripdbConfig::load();
    let settings = args.connection.settings(&config);
    let pool_config = args.connection.pool_config(&config);

    let sql = schema::load_schema(args.schema.as_deref()).with_context(|| match &args.schema {
        Some(path) => format!("failed to read schema file {}", path.display()),
        None => "failed to load bundled schema".to_string(),
    })?;
    let declared = schema::declared_objects(&sql);
    info!(
        tables = declared.tables,
        views = declared.views,
        functions = declared.functions,
        indexes = declared.indexes,
        triggers = declared.triggers,
        "schema loaded"
    );

    if !args.skip_wait {
        wait_for_server(&settings, &args.poll.wait_options(&config)).await?;
    }

    let pool = create_pool_with_options(&settings, 1, &pool_config)
        .await
        .context("failed to connect for schema application")?;

    let applied = ui::with_spinner_async(
        format!("Applying schema to {}", settings.target()),
        "Schema applied",
        schema::apply_schema(&pool, &sql),
    )
    .await;

    let result = match applied {
        Ok(()) => schema::inventory(&pool).await.map_err(anyhow::Error::from),
        Err(e) => Err(anyhow::Error::from(e)),
    };
    pool.close().await;

    let inventory = result.context("schema initialization failed")?;
    let counts = inventory.counts();
    println!(
        "Schema applied to {}: {} tables, {} views, {} functions, {} indexes, {} triggers",
        settings.target(),
        counts.tables,
        counts.views,
        counts.functions,
        counts.indexes,
        counts.triggers
    );

    // A custom schema file is allowed to differ from the bundled layout
    if args.schema.is_none() && !inventory.is_complete() {
        warn!(
            expected = ?EXPECTED,
            found = ?counts,
            "catalog does not match the bundled schema"
        );
    }

    Ok(())
}
