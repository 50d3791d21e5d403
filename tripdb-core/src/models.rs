//! Row types for the travel tables and views.
//!
//! Money and rating columns are `NUMERIC` in the database; queries cast them
//! to `float8` so they decode as `f64` here.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A destination that flights and attractions hang off
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeoLocation {
    pub id: i32,
    pub name: String,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Identifier of this destination at the upstream travel data provider
    pub dest_id: String,
    pub timezone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Flight {
    pub id: i32,
    pub geo_location_id: i32,
    pub token: String,
    pub departure_airport_code: String,
    pub departure_airport_name: Option<String>,
    pub arrival_airport_code: String,
    pub arrival_airport_name: Option<String>,
    pub departure_time: Option<NaiveDateTime>,
    pub arrival_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i32>,
    pub stops: Option<i32>,
    pub fare: Option<f64>,
    pub currency: Option<String>,
    pub airline: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attraction {
    pub id: i32,
    pub geo_location_id: i32,
    pub product_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub duration: Option<String>,
    pub booking_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttractionImage {
    pub id: i32,
    pub attraction_id: i32,
    pub image_url: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttractionInclusion {
    pub id: i32,
    pub attraction_id: i32,
    pub inclusion_text: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// View and function rows
// ============================================================================

/// Row of `v_flights_with_location`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FlightWithLocation {
    pub id: i32,
    pub token: String,
    pub departure_airport_code: String,
    pub departure_airport_name: Option<String>,
    pub arrival_airport_code: String,
    pub arrival_airport_name: Option<String>,
    pub departure_time: Option<NaiveDateTime>,
    pub arrival_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i32>,
    pub stops: Option<i32>,
    pub fare: Option<f64>,
    pub currency: Option<String>,
    pub airline: Option<String>,
    pub location_id: i32,
    pub location_name: String,
    pub location_country: Option<String>,
    pub dest_id: String,
}

/// Image entry inside the `images` JSON array of `v_attractions_full`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub display_order: i32,
}

/// Row of `v_attractions_full`, with the JSON arrays decoded
#[derive(Debug, Clone, Serialize)]
pub struct AttractionFull {
    pub id: i32,
    pub product_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub duration: Option<String>,
    pub booking_url: Option<String>,
    pub location_id: i32,
    pub location_name: String,
    pub dest_id: String,
    pub images: Vec<ImageRef>,
    pub inclusions: Vec<String>,
}

/// Row returned by `get_attractions_by_city`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CityAttraction {
    pub id: i32,
    pub name: String,
    pub short_description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub location_name: String,
}

/// Row returned by `get_flights_by_route`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RouteFlight {
    pub id: i32,
    pub token: String,
    pub departure_airport_code: String,
    pub departure_airport_name: Option<String>,
    pub arrival_airport_code: String,
    pub arrival_airport_name: Option<String>,
    pub departure_time: Option<NaiveDateTime>,
    pub arrival_time: Option<NaiveDateTime>,
    pub stops: Option<i32>,
    pub fare: Option<f64>,
    pub currency: Option<String>,
    pub airline: Option<String>,
    pub location_name: String,
}

/// The single row of `v_database_stats`
#[derive(Debug, Clone, Default, FromRow, Serialize, PartialEq)]
pub struct DatabaseStats {
    pub total_locations: i64,
    pub total_flights: i64,
    pub direct_flights: i64,
    pub avg_fare: Option<f64>,
    pub total_attractions: i64,
    pub rated_attractions: i64,
    pub avg_rating: Option<f64>,
    pub total_images: i64,
    pub total_inclusions: i64,
}
