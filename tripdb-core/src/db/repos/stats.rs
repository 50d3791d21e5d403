//! Aggregate counts from `v_database_stats`

use sqlx::PgPool;

use crate::error::{Result, TripError};
use crate::models::DatabaseStats;

pub struct StatsRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn load(&self) -> Result<DatabaseStats> {
        sqlx::query_as::<_, DatabaseStats>(
            r#"
            SELECT total_locations,
                   total_flights,
                   direct_flights,
                   avg_fare::float8 AS avg_fare,
                   total_attractions,
                   rated_attractions,
                   avg_rating::float8 AS avg_rating,
                   total_images,
                   total_inclusions
            FROM v_database_stats
            "#,
        )
        .fetch_one(self.pool)
        .await
        .map_err(|e| TripError::query("v_database_stats", e))
    }
}
