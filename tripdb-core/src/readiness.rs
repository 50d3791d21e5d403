//! Readiness wait: poll the database server until it accepts connections
//!
//! Probe outcomes follow `pg_isready`. A server that answers with an
//! authentication or "database does not exist" error is still up, so it
//! counts as accepting; the caller's next step reports the real problem.
//! Only SQLSTATE 57P03 ("the database system is starting up") counts as
//! rejecting.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::Connection;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::{ConnectionSettings, ReadinessConfig};
use crate::db::connect_once;
use crate::error::{Result, TripError};

/// SQLSTATE `cannot_connect_now`
const CANNOT_CONNECT_NOW: &str = "57P03";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// Server answered; connections are possible
    Accepting,
    /// Server answered but refuses connections for now (starting up, recovery)
    Rejecting,
    /// Nothing answered within the probe timeout
    NoResponse,
}

#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn probe(&self) -> ProbeStatus;

    /// Password-free description of what is being probed, for logs
    fn target(&self) -> String;
}

/// Probes by opening (and immediately closing) a real connection
pub struct PgProbe {
    settings: ConnectionSettings,
    timeout: Duration,
}

impl PgProbe {
    pub fn new(settings: ConnectionSettings, timeout: Duration) -> Self {
        Self { settings, timeout }
    }
}

#[async_trait]
impl ReadinessProbe for PgProbe {
    async fn probe(&self) -> ProbeStatus {
        match tokio::time::timeout(self.timeout, connect_once(&self.settings)).await {
            Ok(Ok(conn)) => {
                if let Err(e) = conn.close().await {
                    debug!(error = %e, "error closing probe connection");
                }
                ProbeStatus::Accepting
            }
            Ok(Err(e)) => {
                debug!(error = %e, "probe connection failed");
                classify(&e)
            }
            Err(_) => ProbeStatus::NoResponse,
        }
    }

    fn target(&self) -> String {
        self.settings.target()
    }
}

/// Map a connection error to what it says about server liveness
pub fn classify(err: &sqlx::Error) -> ProbeStatus {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(CANNOT_CONNECT_NOW) => {
            ProbeStatus::Rejecting
        }
        sqlx::Error::Database(_) => ProbeStatus::Accepting,
        _ => ProbeStatus::NoResponse,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub interval: Duration,
    /// `None` waits forever
    pub max_wait: Option<Duration>,
}

impl From<&ReadinessConfig> for WaitOptions {
    fn from(config: &ReadinessConfig) -> Self {
        Self {
            interval: config.interval(),
            max_wait: config.max_wait(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    pub attempts: u32,
    pub waited: Duration,
}

/// Probe until the server accepts connections.
///
/// Sleeps `interval` between probes. With `max_wait` set, fails with
/// [`TripError::NotReady`] once that much time has passed without an
/// accepting probe; the last sleep is shortened so the bound is not overrun.
pub async fn wait_until_ready<P>(probe: &P, options: &WaitOptions) -> Result<WaitOutcome>
where
    P: ReadinessProbe + ?Sized,
{
    let started = Instant::now();
    let mut attempts = 0u32;
    let mut last_status = None;

    loop {
        attempts += 1;
        let status = probe.probe().await;
        debug!(attempt = attempts, ?status, "readiness probe");

        if status == ProbeStatus::Accepting {
            let waited = started.elapsed();
            info!(
                target_db = %probe.target(),
                attempts,
                waited_ms = waited.as_millis() as u64,
                "database server is accepting connections"
            );
            return Ok(WaitOutcome { attempts, waited });
        }

        if last_status != Some(status) {
            info!(target_db = %probe.target(), ?status, "database server not ready, waiting");
            last_status = Some(status);
        }

        let pause = match options.max_wait {
            Some(max_wait) => {
                let elapsed = started.elapsed();
                if elapsed >= max_wait {
                    return Err(TripError::NotReady {
                        target: probe.target(),
                        waited: elapsed,
                        attempts,
                    });
                }
                options.interval.min(max_wait - elapsed)
            }
            None => options.interval,
        };
        tokio::time::sleep(pause).await;
    }
}
