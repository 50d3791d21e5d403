//! Read repositories over the tripdb tables, views and query functions

pub mod attractions;
pub mod flights;
pub mod locations;
pub mod stats;

pub use attractions::AttractionRepo;
pub use flights::FlightRepo;
pub use locations::LocationRepo;
pub use stats::StatsRepo;
