//! Read commands over the views and query functions:
//! `attractions`, `flights`, `locations`, `stats`

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::PgPool;
use tripdb_core::db::{create_pool, AttractionRepo, FlightRepo, LocationRepo, StatsRepo};
use tripdb_core::models::{CityAttraction, DatabaseStats, RouteFlight};
use tripdb_core::TripdbConfig;

use super::{or_dash, print_json, ConnectionArgs};

#[derive(Parser, Debug)]
pub struct AttractionsArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// City to list attractions for (case-insensitive). Without it, full
    /// records with images and inclusions are listed.
    #[arg(long)]
    pub city: Option<String>,

    /// Maximum rows when no city is given
    #[arg(long, default_value = "20")]
    pub limit: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct FlightsArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Departure airport code (e.g. JFK)
    #[arg(long = "from", value_name = "CODE", requires = "to")]
    pub from: Option<String>,

    /// Arrival airport code (e.g. DXB)
    #[arg(long = "to", value_name = "CODE", requires = "from")]
    pub to: Option<String>,

    /// Maximum rows when listing all flights
    #[arg(long, default_value = "20")]
    pub limit: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct LocationsArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(long, default_value = "50")]
    pub limit: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

async fn open_pool(connection: &ConnectionArgs) -> Result<PgPool> {
    let config = TripdbConfig::load();
    let settings = connection.settings(&config);
    create_pool(&settings, &connection.pool_config(&config))
        .await
        .context("failed to connect")
}

pub async fn run_attractions(args: AttractionsArgs) -> Result<()> {
    let pool = open_pool(&args.connection).await?;
    let result = list_attractions(&pool, &args).await;
    pool.close().await;
    result
}

async fn list_attractions(pool: &PgPool, args: &AttractionsArgs) -> Result<()> {
    let repo = AttractionRepo::new(pool);

    if let Some(city) = &args.city {
        let rows = repo.by_city(city.trim()).await?;
        if args.json {
            return print_json(&rows);
        }
        print!("{}", render_city_attractions(city, &rows));
        return Ok(());
    }

    let rows = repo.full(args.limit).await?;
    if args.json {
        return print_json(&rows);
    }
    for row in &rows {
        println!(
            "[{}] {} ({}) rating={} reviews={} images={} inclusions={}",
            row.id,
            row.name,
            row.location_name,
            or_dash(row.rating),
            or_dash(row.review_count),
            row.images.len(),
            row.inclusions.len()
        );
    }
    Ok(())
}

pub async fn run_flights(args: FlightsArgs) -> Result<()> {
    let pool = open_pool(&args.connection).await?;
    let result = list_flights(&pool, &args).await;
    pool.close().await;
    result
}

async fn list_flights(pool: &PgPool, args: &FlightsArgs) -> Result<()> {
    let repo = FlightRepo::new(pool);

    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let (from, to) = (normalize_code(from), normalize_code(to));
        let rows = repo.by_route(&from, &to).await?;
        if args.json {
            return print_json(&rows);
        }
        print!("{}", render_route(&from, &to, &rows));
        return Ok(());
    }

    let rows = repo.with_location(args.limit).await?;
    if args.json {
        return print_json(&rows);
    }
    for row in &rows {
        println!(
            "{} -> {}  fare={} {}  stops={}  [{}]",
            row.departure_airport_code,
            row.arrival_airport_code,
            or_dash(row.fare.map(|f| format!("{:.2}", f))),
            row.currency.as_deref().unwrap_or(""),
            or_dash(row.stops),
            row.location_name
        );
    }
    Ok(())
}

pub async fn run_locations(args: LocationsArgs) -> Result<()> {
    let pool = open_pool(&args.connection).await?;
    let rows = LocationRepo::new(&pool).list(args.limit).await;
    pool.close().await;
    let rows = rows?;

    if args.json {
        return print_json(&rows);
    }
    for row in &rows {
        println!(
            "[{}] {}, {} (dest_id={}, tz={})",
            row.id,
            row.name,
            row.country.as_deref().unwrap_or("-"),
            row.dest_id,
            row.timezone.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn run_stats(args: StatsArgs) -> Result<()> {
    let pool = open_pool(&args.connection).await?;
    let stats = StatsRepo::new(&pool).load().await;
    pool.close().await;
    let stats = stats?;

    if args.json {
        print_json(&stats)
    } else {
        print!("{}", render_stats(&stats));
        Ok(())
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn render_city_attractions(city: &str, rows: &[CityAttraction]) -> String {
    if rows.is_empty() {
        return format!("No attractions found in {}\n", city);
    }
    let mut out = format!("{} attraction(s) in {}:\n", rows.len(), city);
    for (rank, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {}  rating={} reviews={} price={} {}\n",
            rank + 1,
            row.name,
            or_dash(row.rating),
            or_dash(row.review_count),
            or_dash(row.price.map(|p| format!("{:.2}", p))),
            row.currency.as_deref().unwrap_or("")
        ));
    }
    out
}

fn render_route(from: &str, to: &str, rows: &[RouteFlight]) -> String {
    if rows.is_empty() {
        return format!("No flights found for {} -> {}\n", from, to);
    }
    let mut out = format!("{} flight(s) {} -> {}:\n", rows.len(), from, to);
    for row in rows {
        out.push_str(&format!(
            "  {:>10} {:<3}  stops={}  departs={}  {}\n",
            or_dash(row.fare.map(|f| format!("{:.2}", f))),
            row.currency.as_deref().unwrap_or(""),
            or_dash(row.stops),
            or_dash(row.departure_time),
            row.airline.as_deref().unwrap_or("")
        ));
    }
    out
}

fn render_stats(stats: &DatabaseStats) -> String {
    format!(
        "Locations:    {}\n\
         Flights:      {} ({} direct, avg fare {})\n\
         Attractions:  {} ({} rated, avg rating {})\n\
         Images:       {}\n\
         Inclusions:   {}\n",
        stats.total_locations,
        stats.total_flights,
        stats.direct_flights,
        or_dash(stats.avg_fare.map(|f| format!("{:.2}", f))),
        stats.total_attractions,
        stats.rated_attractions,
        or_dash(stats.avg_rating.map(|r| format!("{:.2}", r))),
        stats.total_images,
        stats.total_inclusions
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airport_codes_are_normalized() {
        assert_eq!(normalize_code(" jfk "), "JFK");
        assert_eq!(normalize_code("DXB"), "DXB");
    }

    #[test]
    fn empty_results_render_message() {
        assert_eq!(
            render_city_attractions("Dubai", &[]),
            "No attractions found in Dubai\n"
        );
        assert_eq!(
            render_route("JFK", "DXB", &[]),
            "No flights found for JFK -> DXB\n"
        );
    }

    #[test]
    fn city_listing_is_ranked() {
        let rows = vec![CityAttraction {
            id: 1,
            name: "Burj Khalifa".to_string(),
            short_description: None,
            price: Some(45.0),
            currency: Some("USD".to_string()),
            rating: Some(4.7),
            review_count: None,
            city: Some("Dubai".to_string()),
            country: None,
            location_name: "Dubai".to_string(),
        }];
        let text = render_city_attractions("dubai", &rows);
        assert!(text.starts_with("1 attraction(s) in dubai"));
        assert!(text.contains("  1. Burj Khalifa  rating=4.7 reviews=- price=45.00 USD"));
    }

    #[test]
    fn stats_render_missing_averages() {
        let text = render_stats(&DatabaseStats::default());
        assert!(text.contains("Flights:      0 (0 direct, avg fare -)"));
        assert!(text.contains("avg rating -"));
    }
}
