//! Attraction repository - `get_attractions_by_city` and `v_attractions_full`

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::{Result, TripError};
use crate::models::{AttractionFull, CityAttraction, ImageRef};

pub struct AttractionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AttractionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Attractions in `city` (case-insensitive), best rated first, then most
    /// reviewed; unrated and unreviewed rows sort last.
    pub async fn by_city(&self, city: &str) -> Result<Vec<CityAttraction>> {
        sqlx::query_as::<_, CityAttraction>(
            r#"
            SELECT id, name, short_description,
                   price::float8 AS price,
                   currency,
                   rating::float8 AS rating,
                   review_count, city, country, location_name
            FROM get_attractions_by_city($1)
            ORDER BY rating DESC NULLS LAST, review_count DESC NULLS LAST, id
            "#,
        )
        .bind(city)
        .fetch_all(self.pool)
        .await
        .map_err(|e| TripError::query("get_attractions_by_city", e))
    }

    /// Attractions with location, images and inclusions in one query
    pub async fn full(&self, limit: i64) -> Result<Vec<AttractionFull>> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, name, description, short_description,
                   price::float8 AS price,
                   currency,
                   rating::float8 AS rating,
                   review_count, city, country, duration, booking_url,
                   location_id, location_name, dest_id,
                   images, inclusions
            FROM v_attractions_full
            ORDER BY rating DESC NULLS LAST, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| TripError::query("v_attractions_full", e))?;

        rows.iter().map(decode_full).collect()
    }
}

fn decode_full(row: &PgRow) -> Result<AttractionFull> {
    let get_err = |e| TripError::query("decode v_attractions_full", e);

    let images: serde_json::Value = row.try_get("images").map_err(get_err)?;
    let inclusions: serde_json::Value = row.try_get("inclusions").map_err(get_err)?;

    Ok(AttractionFull {
        id: row.try_get("id").map_err(get_err)?,
        product_id: row.try_get("product_id").map_err(get_err)?,
        name: row.try_get("name").map_err(get_err)?,
        description: row.try_get("description").map_err(get_err)?,
        short_description: row.try_get("short_description").map_err(get_err)?,
        price: row.try_get("price").map_err(get_err)?,
        currency: row.try_get("currency").map_err(get_err)?,
        rating: row.try_get("rating").map_err(get_err)?,
        review_count: row.try_get("review_count").map_err(get_err)?,
        city: row.try_get("city").map_err(get_err)?,
        country: row.try_get("country").map_err(get_err)?,
        duration: row.try_get("duration").map_err(get_err)?,
        booking_url: row.try_get("booking_url").map_err(get_err)?,
        location_id: row.try_get("location_id").map_err(get_err)?,
        location_name: row.try_get("location_name").map_err(get_err)?,
        dest_id: row.try_get("dest_id").map_err(get_err)?,
        images: decode_images(images)?,
        inclusions: decode_inclusions(inclusions)?,
    })
}

fn decode_images(value: serde_json::Value) -> Result<Vec<ImageRef>> {
    serde_json::from_value(value).map_err(|source| TripError::Decode {
        column: "images",
        source,
    })
}

fn decode_inclusions(value: serde_json::Value) -> Result<Vec<String>> {
    serde_json::from_value(value).map_err(|source| TripError::Decode {
        column: "inclusions",
        source,
    })
}
