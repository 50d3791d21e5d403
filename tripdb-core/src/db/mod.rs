//! Database layer - connection pool and read repositories
//!
//! Repositories only read. Rows are written by the external ingestion job;
//! the only in-database mutation is the `updated_at` trigger.

pub mod pool;
pub mod repos;

pub use pool::{connect_once, create_pool, create_pool_with_options};
pub use repos::*;
