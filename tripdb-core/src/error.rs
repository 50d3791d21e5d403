//! Structured error types for tripdb-core.
//!
//! The binary wraps these in `anyhow` for context; library callers get the
//! taxonomy below so they can tell a server that never came up apart from a
//! schema that failed to apply or a diagnostic query that failed.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for tripdb-core operations
#[derive(Error, Debug)]
pub enum TripError {
    /// Could not open a connection (refused, auth, unknown database, TLS, pool timeout)
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    /// A query failed after the connection was established
    #[error("query failed ({context}): {source}")]
    Query {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The schema batch was rejected by the server
    #[error("failed to apply schema: {source}")]
    Schema {
        #[source]
        source: sqlx::Error,
    },

    /// The readiness wait gave up after its configured bound
    #[error("database server at {target} not ready after {waited:?} ({attempts} attempts)")]
    NotReady {
        target: String,
        waited: Duration,
        attempts: u32,
    },

    /// A JSON column did not have the expected shape
    #[error("unexpected JSON in column '{column}': {source}")]
    Decode {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file could not be read or parsed
    #[error("configuration error in {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tripdb-core operations
pub type Result<T> = std::result::Result<T, TripError>;

impl TripError {
    /// Wrap a query failure with a short label of what was being queried
    pub fn query(context: &'static str, source: sqlx::Error) -> Self {
        Self::Query { context, source }
    }

    /// Wrap a connection failure with the (password-free) target description
    pub fn connect(target: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Connect {
            target: target.into(),
            source,
        }
    }

    /// Whether this error came from establishing the connection rather than
    /// from a query on an established one.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::NotReady { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_display() {
        let err = TripError::NotReady {
            target: "localhost:5432/tripdb".to_string(),
            waited: Duration::from_secs(3),
            attempts: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("localhost:5432/tripdb"));
        assert!(msg.contains("4 attempts"));
        assert!(err.is_connect());
    }

    #[test]
    fn test_query_error_is_not_connect() {
        let err = TripError::query("count flights", sqlx::Error::RowNotFound);
        assert!(!err.is_connect());
        assert!(err.to_string().contains("count flights"));
    }

    #[test]
    fn test_config_error_display() {
        let err = TripError::Config {
            path: PathBuf::from("tripdb.toml"),
            reason: "expected a table".to_string(),
        };
        assert!(err.to_string().contains("tripdb.toml"));
    }
}
