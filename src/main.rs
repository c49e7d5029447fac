//! Bulk ingestion entry point: scrape the Devpost listing and upsert every
//! extracted hackathon into MongoDB.

use anyhow::Result;
use clap::Parser;

use scrape_hackathons::ingest::{self, IngestOptions, DEFAULT_LISTING_URL};
use scrape_hackathons::store::MongoStore;

#[derive(Parser)]
#[command(
    name = "scrape_hackathons",
    about = "Bulk scrape a hackathon listing and upsert records to MongoDB"
)]
struct Cli {
    /// Listing URL to scrape
    #[arg(long, default_value = DEFAULT_LISTING_URL)]
    listing_url: String,

    /// Max items to process (0 = no limit)
    #[arg(long, default_value_t = 0)]
    limit: usize,

    /// Politeness delay between requests (seconds)
    #[arg(long, default_value_t = ingest::DEFAULT_REQUEST_DELAY_SECS)]
    delay: f64,

    /// Run the MongoDB connection diagnostic and exit
    #[arg(long)]
    diagnose_db: bool,

    /// Override MONGO_URI before any store operation
    #[arg(long)]
    mongo_uri: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut store = MongoStore::from_env();
    if let Some(uri) = &cli.mongo_uri {
        store.set_uri(uri);
        println!("MONGO_URI overridden at runtime.");
    }

    if cli.diagnose_db {
        store.diagnose().await;
        return Ok(());
    }

    let limit_label = if cli.limit == 0 {
        "no limit".to_string()
    } else {
        cli.limit.to_string()
    };
    println!(
        "Starting scrape of listing: {} (limit={})",
        cli.listing_url, limit_label
    );

    let options = IngestOptions {
        listing_url: cli.listing_url,
        limit: cli.limit,
        delay_secs: cli.delay,
    };
    match ingest::run_ingest(&options, &mut store).await {
        Ok(results) => {
            println!("Done. Processed {} items.", results.len());
            Ok(())
        }
        Err(e) => {
            println!("Error running scraper: {:#}", e);
            Err(e)
        }
    }
}
