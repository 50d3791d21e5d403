//! Location repository

use sqlx::PgPool;

use crate::error::{Result, TripError};
use crate::models::GeoLocation;

const SELECT_LOCATION: &str = r#"
    SELECT id, name, country,
           latitude::float8 AS latitude,
           longitude::float8 AS longitude,
           dest_id, timezone, created_at, updated_at
    FROM geo_locations
"#;

pub struct LocationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LocationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All locations, alphabetically
    pub async fn list(&self, limit: i64) -> Result<Vec<GeoLocation>> {
        sqlx::query_as::<_, GeoLocation>(&format!("{SELECT_LOCATION} ORDER BY name, id LIMIT $1"))
            .bind(limit)
            .fetch_all(self.pool)
            .await
            .map_err(|e| TripError::query("list locations", e))
    }

    pub async fn get(&self, id: i32) -> Result<Option<GeoLocation>> {
        sqlx::query_as::<_, GeoLocation>(&format!("{SELECT_LOCATION} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| TripError::query("get location", e))
    }
}
