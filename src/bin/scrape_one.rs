//! Single-URL scrape entry point
//!
//! Fetches one page over HTTP, extracts hackathon records using
//! caller-supplied CSS selectors, and upserts each record into MongoDB.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use scrape_hackathons::browser::USER_AGENT;
use scrape_hackathons::extract::{extract_with_selectors, SelectorConfig};
use scrape_hackathons::store::MongoStore;

const FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Parser)]
#[command(
    name = "scrape_one",
    about = "Scrape hackathons from one page and save them to MongoDB"
)]
struct Cli {
    /// Target URL (falls back to DEFAULT_TARGET_URL from the environment)
    #[arg(long)]
    url: Option<String>,

    /// CSS selector for the item container
    #[arg(long)]
    list_selector: Option<String>,

    /// CSS selector for the name inside an item
    #[arg(long)]
    name_selector: Option<String>,

    /// CSS selector for the start date
    #[arg(long)]
    start_selector: Option<String>,

    /// CSS selector for the end date
    #[arg(long)]
    end_selector: Option<String>,

    /// CSS selector for tags
    #[arg(long)]
    tag_selector: Option<String>,

    /// Mark the scraped records as test hackathons
    #[arg(long)]
    test_hack: bool,

    /// Override MONGO_URI before any store operation
    #[arg(long)]
    mongo_uri: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let url = match cli.url.or_else(|| std::env::var("DEFAULT_TARGET_URL").ok()) {
        Some(url) => url,
        None => bail!("No target URL provided. Use --url or set DEFAULT_TARGET_URL in .env"),
    };

    let mut config = SelectorConfig::default();
    if let Some(selector) = cli.list_selector {
        config.list_selector = selector;
    }
    if let Some(selector) = cli.name_selector {
        config.name_selector = selector;
    }
    if cli.start_selector.is_some() {
        config.start_selector = cli.start_selector;
    }
    if cli.end_selector.is_some() {
        config.end_selector = cli.end_selector;
    }
    if cli.tag_selector.is_some() {
        config.tag_selector = cli.tag_selector;
    }

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .context("Failed to create HTTP client")?;
    let html = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?
        .text()
        .await
        .context("Failed to read response body")?;

    let records = extract_with_selectors(&html, &url, &config, cli.test_hack);
    println!("Extracted {} records from {}", records.len(), url);

    let mut store = MongoStore::from_env();
    if let Some(uri) = &cli.mongo_uri {
        store.set_uri(uri);
    }

    let mut upserted = 0;
    for record in &records {
        let item = mongodb::bson::to_document(record)
            .with_context(|| format!("Failed to serialize record {}", record.id))?;
        match store.upsert(&item).await {
            Ok(_) => upserted += 1,
            Err(e) => println!("Warning: upsert failed for {}: {}", record.id, e),
        }
    }
    println!("Upserted {} of {} items into MongoDB", upserted, records.len());

    Ok(())
}
