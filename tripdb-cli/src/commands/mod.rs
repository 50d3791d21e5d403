//! Command implementations for the tripdb CLI

pub mod browse;
pub mod check;
pub mod config;
pub mod init;
pub mod schema;
pub mod wait;

pub use browse::{run_attractions, run_flights, run_locations, run_stats};
pub use check::run_check;
pub use config::run_config;
pub use init::run_init;
pub use schema::run_schema;
pub use wait::run_wait;

use clap::Args;
use tripdb_core::config::PoolConfig;
use tripdb_core::{ConnectionOverrides, ConnectionSettings, TripdbConfig};

/// Connection flags shared by every command that talks to the server.
///
/// Each flag falls back to its environment variable, then to the config
/// file, then to the built-in default.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Database server host
    #[arg(long = "db-host", env = "DB_HOST")]
    pub host: Option<String>,

    /// Database server port
    #[arg(long = "db-port", env = "DB_PORT")]
    pub port: Option<u16>,

    /// Database user
    #[arg(long = "db-user", env = "DB_USER")]
    pub user: Option<String>,

    /// Database password
    #[arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name
    #[arg(long = "db-name", env = "DB_NAME")]
    pub database: Option<String>,

    /// Full connection URL; overrides the individual DB_* settings
    #[arg(long = "database-url", env = "DATABASE_URL", hide_env_values = true)]
    pub url: Option<String>,

    /// Seconds to wait for a pooled connection before giving up
    #[arg(long = "connect-timeout-secs", value_name = "SECS")]
    pub connect_timeout_secs: Option<u64>,
}

impl ConnectionArgs {
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            url: self.url.clone(),
        }
    }

    pub fn settings(&self, config: &TripdbConfig) -> ConnectionSettings {
        config.connection(&self.overrides())
    }

    pub fn pool_config(&self, config: &TripdbConfig) -> PoolConfig {
        let mut pool = config.pool.clone();
        if let Some(secs) = self.connect_timeout_secs {
            pool.acquire_timeout_secs = secs;
        }
        pool
    }
}

/// Print rows as pretty JSON on stdout
pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render an optional value, or `-` when missing
pub(crate) fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_timeout_overrides_pool_default() {
        let args = ConnectionArgs {
            connect_timeout_secs: Some(2),
            ..Default::default()
        };
        let pool = args.pool_config(&TripdbConfig::default());
        assert_eq!(pool.acquire_timeout_secs, 2);
        assert_eq!(pool.max_connections, 5);
    }

    #[test]
    fn or_dash_formats_missing_values() {
        assert_eq!(or_dash(Some(4.5)), "4.5");
        assert_eq!(or_dash::<i32>(None), "-");
    }
}
