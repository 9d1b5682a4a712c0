//! Durable storage for analysis documents.
//!
//! Documents are kept the way a browser keeps local storage: one key holding
//! the whole collection as a JSON array. [`KeyValueStore`] is the durable
//! backend (SQLite in practice), and [`DocumentStore`] layers the collection
//! format and its recovery rules on top.

mod sqlite;

pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::StorageResult;
use crate::model::Analysis;

/// Key the document collection is stored under.
pub const ANALYSES_KEY: &str = "requirementAnalyses";

/// String key-value storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Loads and saves the analysis collection.
pub struct DocumentStore<S> {
    backend: S,
}

impl<S: KeyValueStore> DocumentStore<S> {
    /// Wrap a key-value backend.
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Get the underlying backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read the saved collection.
    ///
    /// Never fails: missing, unreadable or corrupt data yields a single blank
    /// document.
    pub async fn load(&self) -> Vec<Analysis> {
        match self.backend.get(ANALYSES_KEY).await {
            Ok(Some(raw)) => parse_documents(&raw),
            Ok(None) => {
                info!("No saved analyses, starting with a blank document");
                vec![Analysis::blank(None)]
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved analyses, starting fresh");
                vec![Analysis::blank(None)]
            }
        }
    }

    /// Write the full collection.
    pub async fn save(&self, analyses: &[Analysis]) -> StorageResult<()> {
        let raw = serde_json::to_string(analyses)?;
        self.backend.set(ANALYSES_KEY, &raw).await?;
        debug!(count = analyses.len(), bytes = raw.len(), "Analyses saved");
        Ok(())
    }
}

/// Parse a stored collection, normalizing each document.
///
/// Entries that are not documents at all are dropped. The result is never
/// empty.
pub fn parse_documents(raw: &str) -> Vec<Analysis> {
    let entries = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(entries)) => entries,
        Ok(_) => {
            warn!("Saved analyses are not a list, discarding");
            return vec![Analysis::blank(None)];
        }
        Err(e) => {
            warn!(error = %e, "Saved analyses are corrupt, discarding");
            return vec![Analysis::blank(None)];
        }
    };

    let total = entries.len();
    let mut analyses: Vec<Analysis> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match Analysis::from_json_value(entry) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!(index, error = %e, "Dropping unreadable saved analysis");
                None
            }
        })
        .collect();

    if analyses.is_empty() {
        analyses.push(Analysis::blank(None));
    }
    info!(loaded = analyses.len(), stored = total, "Analyses loaded");
    analyses
}
