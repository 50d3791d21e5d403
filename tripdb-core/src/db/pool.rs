//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits and an acquire timeout,
//! so a dead server surfaces as an error instead of a hang.

use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use tracing::debug;

use crate::config::{ConnectionSettings, PoolConfig};
use crate::error::{Result, TripError};

/// Create a PostgreSQL connection pool using the configured limits.
///
/// The pool connects eagerly, so an unreachable server or bad credentials
/// fail here as [`TripError::Connect`].
pub async fn create_pool(settings: &ConnectionSettings, pool: &PoolConfig) -> Result<PgPool> {
    create_pool_with_options(settings, pool.max_connections, pool).await
}

/// Create a PostgreSQL connection pool with a custom connection cap.
///
/// # Arguments
///
/// * `settings` - resolved connection target
/// * `max_connections` - maximum number of connections in the pool
/// * `pool` - acquire timeout and other pool defaults
pub async fn create_pool_with_options(
    settings: &ConnectionSettings,
    max_connections: u32,
    pool: &PoolConfig,
) -> Result<PgPool> {
    let options = settings.connect_options()?;
    debug!(target_db = %settings.target(), max_connections, "opening connection pool");

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(pool.acquire_timeout())
        .connect_with(options)
        .await
        .map_err(|e| TripError::connect(settings.target(), e))
}

/// Open a single unpooled connection.
pub async fn connect_once(settings: &ConnectionSettings) -> std::result::Result<PgConnection, sqlx::Error> {
    let options = settings
        .connect_options()
        .map_err(|e| sqlx::Error::Configuration(e.to_string().into()))?;
    options.connect().await
}
