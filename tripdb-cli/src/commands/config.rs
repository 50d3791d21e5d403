use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tripdb_core::config::{global_config_path, LOCAL_CONFIG_FILE};
use tripdb_core::TripdbConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (file values over built-in defaults)
    Show,
    /// Show config file paths
    Path,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => run_show(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show() -> Result<()> {
    let config = TripdbConfig::load();
    let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config to TOML")?;
    println!("{}", toml_str);
    Ok(())
}

fn run_path() -> Result<()> {
    match global_config_path() {
        Some(path) => println!("global: {}{}", path.display(), presence(path.exists())),
        None => println!("global: (no home directory)"),
    }

    let local = std::env::current_dir()
        .context("Could not determine working directory")?
        .join(LOCAL_CONFIG_FILE);
    println!("local:  {}{}", local.display(), presence(local.exists()));
    Ok(())
}

fn presence(exists: bool) -> &'static str {
    if exists {
        ""
    } else {
        " (not found)"
    }
}
