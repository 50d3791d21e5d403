use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use tracing::{debug, warn};

use crate::error::{Result, TripError};

/// Load environment variables from .env files in multiple locations
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.tripdb/.env
///
/// dotenvy never overwrites a variable that is already set, so the order
/// the files are read in is the order of precedence. Returns the files
/// that were loaded; this runs before logging is set up, so callers log it.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path);
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
            loaded_from.push(env_file);
        }
    }

    loaded_from
}

/// Get the tripdb config directory path (~/.tripdb)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tripdb"))
}

/// Path of the user-level config file (~/.tripdb/config.toml)
pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Name of the project-local config file, looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "tripdb.toml";

// ============================================================================
// TOML Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TripdbConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub pool: PoolConfig,
}

/// Connection defaults. The password is deliberately absent: it only comes
/// from `DB_PASSWORD`, `--db-password` or a `DATABASE_URL`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_database")]
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            name: default_database(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadinessConfig {
    /// Delay between probes
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Give up after this long. Absent means wait forever.
    #[serde(default)]
    pub max_wait_secs: Option<u64>,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_wait_secs: None,
        }
    }
}

impl ReadinessConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Upper bound on acquiring a connection, including the initial connect
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

// Default value functions for serde
fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_database() -> String {
    "tripdb".to_string()
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

impl TripdbConfig {
    /// Load config from TOML files
    ///
    /// Priority order (highest to lowest):
    /// 1. ./tripdb.toml (project-specific)
    /// 2. ~/.tripdb/config.toml (user defaults)
    /// 3. Built-in defaults
    ///
    /// Files are merged key by key, so a local file only overrides the keys
    /// it sets. Unreadable or malformed files are logged and skipped.
    pub fn load() -> Self {
        let mut paths = Vec::new();
        if let Some(global_path) = global_config_path() {
            paths.push(global_path);
        }
        paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
        Self::load_layered(&paths)
    }

    /// Merge the given files in order (later files win), skipping missing ones
    pub fn load_layered(paths: &[PathBuf]) -> Self {
        let mut merged = toml::Table::new();

        for path in paths.iter().filter(|path| path.exists()) {
            match read_table(path) {
                Ok(table) => {
                    debug!("Loaded config from {}", path.display());
                    merge_tables(&mut merged, table);
                }
                Err(e) => warn!("{}", e),
            }
        }

        match toml::Value::Table(merged).try_into() {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config files, merged values are invalid: {}", e);
                TripdbConfig::default()
            }
        }
    }

    /// Parse a single config file
    pub fn load_from(path: &Path) -> Result<Self> {
        toml::Value::Table(read_table(path)?)
            .try_into()
            .map_err(|e: toml::de::Error| TripError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Apply command-line / environment overrides to the file defaults
    pub fn connection(&self, overrides: &ConnectionOverrides) -> ConnectionSettings {
        ConnectionSettings {
            host: overrides
                .host
                .clone()
                .unwrap_or_else(|| self.database.host.clone()),
            port: overrides.port.unwrap_or(self.database.port),
            user: overrides
                .user
                .clone()
                .unwrap_or_else(|| self.database.user.clone()),
            password: overrides.password.clone(),
            database: overrides
                .database
                .clone()
                .unwrap_or_else(|| self.database.name.clone()),
            url: overrides.url.clone(),
        }
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let contents = std::fs::read_to_string(path).map_err(|e| TripError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    contents.parse::<toml::Table>().map_err(|e| TripError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Overlay `overlay` onto `base`; nested tables merge, other values replace
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

// ============================================================================
// Resolved connection settings
// ============================================================================

/// Values supplied on the command line or through `DB_*` / `DATABASE_URL`.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub url: Option<String>,
}

/// Fully resolved connection target. When `url` is set it wins over the
/// individual fields.
#[derive(Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub url: Option<String>,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("target", &self.target())
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from_url", &self.url.is_some())
            .finish()
    }
}

impl ConnectionSettings {
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url
                .parse::<PgConnectOptions>()
                .map_err(|e| TripError::connect("DATABASE_URL", e));
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }

    /// `user@host:port/database`, never including the password
    pub fn target(&self) -> String {
        if let Some(url) = &self.url {
            return match url.parse::<PgConnectOptions>() {
                Ok(opts) => format!(
                    "{}@{}:{}/{}",
                    opts.get_username(),
                    opts.get_host(),
                    opts.get_port(),
                    opts.get_database().unwrap_or_else(|| opts.get_username())
                ),
                Err(_) => "DATABASE_URL".to_string(),
            };
        }
        format!(
            "{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_dir_returns_path() {
        if let Some(path) = config_dir() {
            assert!(path.ends_with(".tripdb"));
        }
    }

    #[test]
    fn test_load_dotenv_doesnt_panic() {
        // Should never panic, even if no .env exists
        let _ = load_dotenv();
    }

    #[test]
    fn test_tripdb_config_defaults() {
        let config = TripdbConfig::default();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.user, "postgres");
        assert_eq!(config.database.name, "tripdb");
        assert_eq!(config.readiness.interval(), Duration::from_secs(1));
        assert_eq!(config.readiness.max_wait(), None);
        assert_eq!(config.pool.max_connections, 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TripdbConfig = toml::from_str(
            r#"
            [database]
            host = "db"

            [readiness]
            max_wait_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.database.host, "db");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.readiness.interval_ms, 1000);
        assert_eq!(config.readiness.max_wait(), Some(Duration::from_secs(30)));
        assert_eq!(config.pool, PoolConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pool]\nmax_connections = 2\nacquire_timeout_secs = 3").unwrap();

        let config = TripdbConfig::load_from(file.path()).unwrap();
        assert_eq!(config.pool.max_connections, 2);
        assert_eq!(config.pool.acquire_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_from_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database\nhost = ").unwrap();

        let err = TripdbConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, TripError::Config { .. }));
    }

    #[test]
    fn test_local_file_overrides_only_its_keys() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        let local = dir.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(
            &global,
            "[database]\nuser = \"app\"\nhost = \"global-db\"\n\n[readiness]\nmax_wait_secs = 60\n",
        )
        .unwrap();
        std::fs::write(&local, "[database]\nhost = \"db\"\n").unwrap();

        let config = TripdbConfig::load_layered(&[global, local]);
        assert_eq!(config.database.host, "db");
        assert_eq!(config.database.user, "app");
        assert_eq!(config.database.name, "tripdb");
        assert_eq!(config.readiness.max_wait(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_malformed_layer_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        let local = dir.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&global, "[pool]\nmax_connections = 2\n").unwrap();
        std::fs::write(&local, "[database\nhost = ").unwrap();

        let config = TripdbConfig::load_layered(&[global, local, dir.path().join("missing.toml")]);
        assert_eq!(config.pool.max_connections, 2);
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let config = TripdbConfig::default();
        let overrides = ConnectionOverrides {
            host: Some("db.internal".to_string()),
            port: Some(6543),
            password: Some("secret".to_string()),
            ..Default::default()
        };

        let settings = config.connection(&overrides);
        assert_eq!(settings.host, "db.internal");
        assert_eq!(settings.port, 6543);
        assert_eq!(settings.user, "postgres");
        assert_eq!(settings.target(), "postgres@db.internal:6543/tripdb");
    }

    #[test]
    fn test_debug_hides_password() {
        let settings = TripdbConfig::default().connection(&ConnectionOverrides {
            password: Some("hunter2".to_string()),
            ..Default::default()
        });
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_url_target_redacts_password() {
        let settings = TripdbConfig::default().connection(&ConnectionOverrides {
            url: Some("postgres://app:pw@db:5433/travel".to_string()),
            ..Default::default()
        });
        assert_eq!(settings.target(), "app@db:5433/travel");
        assert!(settings.connect_options().is_ok());
    }
}
