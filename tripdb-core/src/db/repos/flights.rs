//! Flight repository - `get_flights_by_route` and `v_flights_with_location`

use sqlx::PgPool;

use crate::error::{Result, TripError};
use crate::models::{FlightWithLocation, RouteFlight};

pub struct FlightRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> FlightRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Flights from `departure` to `arrival`, cheapest first, unpriced last.
    ///
    /// Codes are compared exactly; callers normalise to upper case.
    pub async fn by_route(&self, departure: &str, arrival: &str) -> Result<Vec<RouteFlight>> {
        sqlx::query_as::<_, RouteFlight>(
            r#"
            SELECT id, token,
                   departure_airport_code, departure_airport_name,
                   arrival_airport_code, arrival_airport_name,
                   departure_time, arrival_time, stops,
                   fare::float8 AS fare,
                   currency, airline, location_name
            FROM get_flights_by_route($1, $2)
            ORDER BY fare ASC NULLS LAST, id
            "#,
        )
        .bind(departure)
        .bind(arrival)
        .fetch_all(self.pool)
        .await
        .map_err(|e| TripError::query("get_flights_by_route", e))
    }

    /// Flights joined with their owning location, newest departures first
    pub async fn with_location(&self, limit: i64) -> Result<Vec<FlightWithLocation>> {
        sqlx::query_as::<_, FlightWithLocation>(
            r#"
            SELECT id, token,
                   departure_airport_code, departure_airport_name,
                   arrival_airport_code, arrival_airport_name,
                   departure_time, arrival_time, duration_minutes, stops,
                   fare::float8 AS fare,
                   currency, airline,
                   location_id, location_name, location_country, dest_id
            FROM v_flights_with_location
            ORDER BY departure_time DESC NULLS LAST, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| TripError::query("v_flights_with_location", e))
    }
}
