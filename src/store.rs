//! MongoDB Storage Module
//!
//! Owns one lazily-established connection to the document store for the
//! process lifetime and exposes an idempotent upsert keyed on the `id` field.
//! The connection is verified with a ping before first use; a failed ping
//! resets the state so the next call reconnects cleanly.

use std::time::Duration;

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::results::UpdateResult;
use mongodb::{Client, Collection};
use thiserror::Error;

pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DB_NAME: &str = "hackathons";
pub const DEFAULT_COLLECTION: &str = "hack-info";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller handed us a document without a usable upsert key.
    #[error("item must contain a non-empty 'id' field for upsert")]
    MissingId,

    /// Connection establishment or the liveness ping failed.
    #[error("failed to connect to MongoDB at '{uri}'")]
    Connection {
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("MongoDB operation failed")]
    Operation(#[from] mongodb::error::Error),
}

/// Shared handle to the configured database/collection.
///
/// Constructed once by the orchestrator and passed by reference; there is no
/// pooling or retry beyond what the driver itself provides.
pub struct MongoStore {
    uri: String,
    db_name: String,
    collection_name: String,
    client: Option<Client>,
}

impl MongoStore {
    /// Build from `MONGO_URI` / `MONGO_DB` / `MONGO_COLLECTION`, with the
    /// usual localhost defaults. No connection is opened yet.
    pub fn from_env() -> Self {
        Self {
            uri: std::env::var("MONGO_URI").unwrap_or_else(|_| DEFAULT_MONGO_URI.to_string()),
            db_name: std::env::var("MONGO_DB").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            collection_name: std::env::var("MONGO_COLLECTION")
                .unwrap_or_else(|_| DEFAULT_COLLECTION.to_string()),
            client: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Replace the connection string and discard any live connection so the
    /// next operation reconnects against the new target. Empty URI is a no-op.
    pub fn set_uri(&mut self, uri: &str) {
        if uri.is_empty() {
            return;
        }
        self.uri = uri.to_string();
        self.client = None;
    }

    /// Connect on first use and verify liveness with a ping. On failure the
    /// partial client is discarded and the state stays absent, so a later
    /// call retries from scratch instead of reusing a dead handle.
    async fn ensure_connected(&mut self) -> Result<Client, StoreError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = connect(&self.uri)
            .await
            .map_err(|source| StoreError::Connection {
                uri: self.uri.clone(),
                source,
            })?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Handle to the configured collection, optionally overridden per call.
    pub async fn collection(
        &mut self,
        name: Option<&str>,
    ) -> Result<Collection<Document>, StoreError> {
        let client = self.ensure_connected().await?;
        let collection_name = name.unwrap_or(&self.collection_name);
        Ok(client.database(&self.db_name).collection(collection_name))
    }

    /// Match on `id`, replace fields, insert if absent. The `id` field must
    /// be a non-empty string; that is checked before any store call.
    pub async fn upsert(&mut self, item: &Document) -> Result<UpdateResult, StoreError> {
        let id = match item.get_str("id") {
            Ok(value) if !value.is_empty() => value.to_string(),
            _ => return Err(StoreError::MissingId),
        };
        let collection = self.collection(None).await?;
        let result = collection
            .update_one(doc! { "id": &id }, doc! { "$set": item.clone() })
            .upsert(true)
            .await?;
        Ok(result)
    }

    /// Print the configured target, attempt a connection and liveness check,
    /// and report a document count plus up to 3 sample documents. Each stage
    /// reports its own failure; nothing is returned or raised.
    pub async fn diagnose(&self) {
        println!("DB diagnostic:");
        println!("  MONGO_URI: {}", self.uri);
        println!("  MONGO_DB: {}", self.db_name);
        println!("  MONGO_COLLECTION: {}", self.collection_name);

        let client = match connect(&self.uri).await {
            Ok(client) => client,
            Err(e) => {
                println!("  -> Failed to connect/ping MongoDB: {}", e);
                return;
            }
        };

        let collection: Collection<Document> = client
            .database(&self.db_name)
            .collection(&self.collection_name);
        let count = match collection.count_documents(doc! {}).await {
            Ok(count) => count,
            Err(e) => {
                println!("  -> Error reading collection: {}", e);
                return;
            }
        };
        println!(
            "  -> Connected. Collection '{}' has {} documents.",
            self.collection_name, count
        );

        let sample = collection
            .find(doc! {})
            .projection(doc! { "id": 1, "name": 1, "submission_period": 1, "status": 1 })
            .limit(3)
            .await;
        match sample {
            Ok(mut cursor) => {
                println!("  -> Sample documents (up to 3):");
                loop {
                    match cursor.try_next().await {
                        Ok(Some(document)) => println!("     {}", document),
                        Ok(None) => break,
                        Err(e) => {
                            println!("  -> Error reading collection: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => println!("  -> Error reading collection: {}", e),
        }
    }
}

async fn connect(uri: &str) -> mongodb::error::Result<Client> {
    let mut options = ClientOptions::parse(uri).await?;
    options.server_selection_timeout = Some(CONNECT_TIMEOUT);
    options.connect_timeout = Some(CONNECT_TIMEOUT);
    let client = Client::with_options(options)?;
    // Fail fast: surface a dead server here rather than mid-batch
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;
    Ok(client)
}
