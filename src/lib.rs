//! # Requirement Analysis
//!
//! A structured editor for requirement-analysis documents: the feature
//! overview, the problem and its context, assumptions, an edge-case
//! checklist, phased scope items, open questions and a closing summary.
//!
//! ## Features
//!
//! - **Document model**: every field is a plain string; enumerated values are
//!   kept as their labels so unrecognized ones survive a load and save
//! - **Completion**: per-section and overall progress
//! - **Scope views**: phase filters and grouping by version
//! - **Export**: Markdown report, JSON file and base64 share links
//! - **Persistence**: the whole collection saved as one JSON value under the
//!   `requirementAnalyses` key, backed by SQLite
//!
//! ## Architecture
//!
//! ```text
//! CLI → Workspace (AppState + DocumentStore) → KeyValueStore → SQLite
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use requirement_analysis::{Config, Workspace};
//! use requirement_analysis::model::FieldPath;
//! use requirement_analysis::storage::SqliteStorage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let storage = SqliteStorage::new(&config.database).await?;
//!     let mut workspace = Workspace::open(storage).await;
//!     workspace
//!         .edit_active(|a| a.set_field(FieldPath::FeatureName, "Saved searches"))
//!         .await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line interface.
pub mod cli;
/// Section and overall completion scoring.
pub mod completion;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Markdown, JSON and share-link export.
pub mod export;
/// The analysis document and its mutations.
pub mod model;
/// Scope item filtering and grouping by phase.
pub mod scope;
/// Editor state and the persisted workspace.
pub mod state;
/// Key-value persistence backed by SQLite.
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use model::Analysis;
pub use state::{AppState, Workspace};
