//! tripdb CLI - travel data schema tooling
//!
//! - `init`: wait for the server, then (re)create the schema
//! - `wait`: block until the server accepts connections
//! - `check`: connectivity and row-count diagnostics
//! - `attractions`, `flights`, `locations`, `stats`: read the views and query functions
//! - `schema`: print the bundled DDL or inventory a live database

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

mod commands;
mod tracing_setup;
mod ui;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "tripdb",
    author,
    version,
    about = "Create, wait for and inspect the tripdb travel database",
    long_about = "Provision the PostgreSQL schema for travel data (locations, flights, \
                  attractions), wait for the server to come up, and run read-only diagnostics."
)]
struct Cli {
    /// Suppress progress spinners (for script consumption)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wait for the server, then drop and recreate every schema object
    Init(commands::init::InitArgs),
    /// Block until the database server accepts connections
    Wait(commands::wait::WaitArgs),
    /// Connect, list tables and count rows
    Check(commands::check::CheckArgs),
    /// List attractions in a city, best rated first
    Attractions(commands::browse::AttractionsArgs),
    /// List flights on a route, cheapest first
    Flights(commands::browse::FlightsArgs),
    /// List destinations
    Locations(commands::browse::LocationsArgs),
    /// Show aggregate statistics
    Stats(commands::browse::StatsArgs),
    /// Print the bundled schema or inventory a live database
    Schema(commands::schema::SchemaArgs),
    /// Show effective configuration and config file paths
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads DB_* / DATABASE_URL
    let env_files = tripdb_core::config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();
    for path in &env_files {
        debug!("Loaded .env from {}", path.display());
    }

    ui::init_quiet_mode(cli.quiet);

    let result = match cli.command {
        Commands::Init(args) => commands::run_init(args).await,
        Commands::Wait(args) => commands::run_wait(args).await,
        Commands::Check(args) => commands::run_check(args).await,
        Commands::Attractions(args) => commands::run_attractions(args).await,
        Commands::Flights(args) => commands::run_flights(args).await,
        Commands::Locations(args) => commands::run_locations(args).await,
        Commands::Stats(args) => commands::run_stats(args).await,
        Commands::Schema(args) => commands::run_schema(args).await,
        Commands::Config(args) => commands::run_config(args),
        Commands::Completions(args) => run_completions(args),
    };

    tracing_setup::shutdown_otel();
    result
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());
    Ok(())
}
