//! Hackathon listing scraper and MongoDB ingester
//!
//! Scrapes the Devpost hackathon listing with a headless browser, refines
//! each entry from its detail page, derives a lifecycle status, and upserts
//! the result into a MongoDB collection keyed by URL slug.

pub mod browser;
pub mod extract;
pub mod ingest;
pub mod normalize;
pub mod status;
pub mod store;
pub mod types;

pub use types::*;
