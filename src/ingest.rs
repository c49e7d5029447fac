//! Bulk Ingestion Orchestrator
//!
//! Drives the end-to-end flow: open a headless browser session, load the
//! listing, extract candidate entries, enrich each from its detail page,
//! derive status, upsert into MongoDB, and sleep politely between entries.
//! Per-entry failures are logged and skipped; one bad card or write must not
//! abort the batch.

use std::time::Duration;

use anyhow::Result;
use mongodb::bson;

use crate::browser::{BrowserSession, HEADING_WAIT_MS};
use crate::extract::{self, DetailOverrides, ListingEntry};
use crate::normalize::slug_from_url;
use crate::status::derive_status;
use crate::store::MongoStore;
use crate::types::IngestedDocument;

pub const DEFAULT_LISTING_URL: &str = "https://devpost.com/hackathons";
pub const DEFAULT_REQUEST_DELAY_SECS: f64 = 1.0;

pub struct IngestOptions {
    pub listing_url: String,
    /// Max entries to process; 0 means no limit.
    pub limit: usize,
    /// Politeness delay between entries, in seconds.
    pub delay_secs: f64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            limit: 0,
            delay_secs: DEFAULT_REQUEST_DELAY_SECS,
        }
    }
}

/// Merge detail-page overrides into a listing entry and build the document
/// that gets persisted. Overrides only apply when present; an absent detail
/// value never erases a listing-derived one.
pub fn assemble_document(entry: ListingEntry, overrides: DetailOverrides) -> IngestedDocument {
    let name = overrides
        .title
        .filter(|title| !title.is_empty())
        .unwrap_or(entry.title);
    let begins_iso = overrides.begins_iso.or(entry.begins_iso);
    let ends_iso = overrides.ends_iso.or(entry.ends_iso);

    // Prefer the listing's human-readable range, fall back to the raw ISO pair
    let submission_period = entry.submission_period.or_else(|| {
        let parts: Vec<&str> = [begins_iso.as_deref(), ends_iso.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" — "))
        }
    });

    let status = derive_status(begins_iso.as_deref(), ends_iso.as_deref());
    let id = if entry.url.is_empty() {
        name.clone()
    } else {
        slug_from_url(&entry.url)
    };

    IngestedDocument {
        id,
        name,
        submission_period,
        status,
    }
}

/// Scrape the listing page, enrich and upsert every entry, and return all
/// assembled documents (including any that failed to persist).
pub async fn run_ingest(
    options: &IngestOptions,
    store: &mut MongoStore,
) -> Result<Vec<IngestedDocument>> {
    let session = BrowserSession::launch().await?;
    let outcome = ingest_with_session(&session, options, store).await;
    session.quit().await;
    outcome
}

async fn ingest_with_session(
    session: &BrowserSession,
    options: &IngestOptions,
    store: &mut MongoStore,
) -> Result<Vec<IngestedDocument>> {
    session.goto(&options.listing_url).await?;
    if !session
        .wait_for(
            extract::LISTING_HEADING_SELECTOR,
            Duration::from_millis(HEADING_WAIT_MS),
        )
        .await
    {
        println!("Timed out waiting for listing headings; extracting what is present.");
    }

    let page_url = session
        .current_url()
        .await
        .unwrap_or_else(|| options.listing_url.clone());
    let html = session.source().await?;
    let mut entries = extract::extract_listing_entries(&html, &page_url);
    if options.limit > 0 {
        entries.truncate(options.limit);
    }
    println!("Found {} items on listing page.", entries.len());

    let total = entries.len();
    let delay = Duration::from_secs_f64(options.delay_secs.max(0.0));
    let mut results = Vec::with_capacity(total);
    for (index, entry) in entries.into_iter().enumerate() {
        println!("[{}/{}] {}", index + 1, total, entry.title);

        let overrides = match session.fetch_detail(&entry.url).await {
            Some(detail_html) => extract::extract_detail_overrides(&detail_html),
            None => DetailOverrides::default(),
        };

        let document = assemble_document(entry, overrides);
        println!(
            "Upserting doc id={} to {}.{}",
            document.id,
            store.db_name(),
            store.collection_name()
        );
        match bson::to_document(&document) {
            Ok(item) => {
                if let Err(e) = store.upsert(&item).await {
                    println!("Warning: upsert failed for {}: {}", document.id, e);
                }
            }
            Err(e) => println!("Warning: could not serialize {}: {}", document.id, e),
        }
        results.push(document);

        tokio::time::sleep(delay).await;
    }

    Ok(results)
}
