//! `tripdb wait` - block until the database server accepts connections

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser};
use tripdb_core::readiness::{wait_until_ready, PgProbe, WaitOptions, WaitOutcome};
use tripdb_core::{ConnectionSettings, TripdbConfig};

use super::ConnectionArgs;
use crate::ui;

/// Per-probe connect timeout; a probe that takes longer counts as no response
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Polling flags shared by `wait` and `init`
#[derive(Args, Debug, Clone, Default)]
pub struct PollArgs {
    /// Milliseconds between readiness probes
    #[arg(long = "interval-ms", value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Give up after this many seconds (default: wait forever)
    #[arg(long = "timeout-secs", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl PollArgs {
    pub fn wait_options(&self, config: &TripdbConfig) -> WaitOptions {
        let mut options = WaitOptions::from(&config.readiness);
        if let Some(ms) = self.interval_ms {
            options.interval = Duration::from_millis(ms);
        }
        if let Some(secs) = self.timeout_secs {
            options.max_wait = Some(Duration::from_secs(secs));
        }
        options
    }
}

#[derive(Parser, Debug)]
pub struct WaitArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub poll: PollArgs,
}

pub async fn run_wait(args: WaitArgs) -> Result<()> {
    let config = TripdbConfig::load();
    let settings = args.connection.settings(&config);
    let options = args.poll.wait_options(&config);

    let outcome = wait_for_server(&settings, &options).await?;
    println!(
        "Database server at {} is ready ({} probe(s), {:.1}s)",
        settings.target(),
        outcome.attempts,
        outcome.waited.as_secs_f64()
    );
    Ok(())
}

/// Poll with a spinner until the server accepts connections. Ctrl-C ends
/// the wait with an error instead of killing the process mid-spinner.
pub async fn wait_for_server(
    settings: &ConnectionSettings,
    options: &WaitOptions,
) -> Result<WaitOutcome> {
    let probe = PgProbe::new(settings.clone(), PROBE_TIMEOUT);
    let waiting = ui::with_spinner_async(
        format!("Waiting for database server at {}", settings.target()),
        "Database server is accepting connections",
        wait_until_ready(&probe, options),
    );

    tokio::select! {
        outcome = waiting => outcome.context("database server did not become ready"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            Err(anyhow!("interrupted while waiting for {}", settings.target()))
        }
    }
}
