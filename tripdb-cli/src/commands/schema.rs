//! `tripdb schema` - print the bundled DDL or inventory a live database

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tripdb_core::db::create_pool_with_options;
use tripdb_core::schema::{self, SchemaInventory, EXPECTED, SCHEMA_SQL};
use tripdb_core::TripdbConfig;

use super::{print_json, ConnectionArgs};

#[derive(Parser, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommands,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Print the bundled schema SQL
    Print,
    /// List the tables, views, functions, indexes and triggers present
    Inventory(InventoryArgs),
}

#[derive(Parser, Debug)]
pub struct InventoryArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_schema(args: SchemaArgs) -> Result<()> {
    match args.command {
        SchemaCommands::Print => {
            print!("{}", SCHEMA_SQL);
            Ok(())
        }
        SchemaCommands::Inventory(args) => run_inventory(args).await,
    }
}

async fn run_inventory(args: InventoryArgs) -> Result<()> {
    let config = TripdbConfig::load();
    let settings = args.connection.settings(&config);
    let pool = create_pool_with_options(&settings, 1, &args.connection.pool_config(&config))
        .await
        .context("failed to connect")?;

    let inventory = schema::inventory(&pool).await;
    pool.close().await;
    let inventory = inventory.context("failed to read catalog")?;

    if args.json {
        return print_json(&inventory);
    }
    print!("{}", render_inventory(&inventory));
    Ok(())
}

fn render_inventory(inventory: &SchemaInventory) -> String {
    let counts = inventory.counts();
    let sections = [
        ("Tables", &inventory.tables, counts.tables, EXPECTED.tables),
        ("Views", &inventory.views, counts.views, EXPECTED.views),
        ("Functions", &inventory.functions, counts.functions, EXPECTED.functions),
        ("Indexes", &inventory.indexes, counts.indexes, EXPECTED.indexes),
        ("Triggers", &inventory.triggers, counts.triggers, EXPECTED.triggers),
    ];

    let mut out = String::new();
    for (label, names, found, expected) in sections {
        let mark = if found == expected { "✓" } else { "✗" };
        out.push_str(&format!("{} {} ({}/{})\n", mark, label, found, expected));
        for name in names {
            out.push_str(&format!("    {}\n", name));
        }
    }
    out
}
