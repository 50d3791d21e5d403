//! tripdb-core: travel data schema plus the tooling around it
//!
//! - [`schema`]: apply the bundled DDL and inventory the catalog
//! - [`readiness`]: wait for the server to accept connections
//! - [`diagnostics`]: fixed read-only health queries
//! - [`db`]: connection pool and read repositories over the views/functions

pub mod config;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod readiness;
pub mod schema;

pub use config::{ConnectionOverrides, ConnectionSettings, TripdbConfig};
pub use error::{Result, TripError};
