use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Rejected document edit.
    #[error("Document error: {0}")]
    Model(#[from] ModelError),

    /// Unreadable share link or token.
    #[error("Share link error: {0}")]
    Share(#[from] ShareError),

    /// File export failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be serialized.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Opening the database failed.
    #[error("Database connection failed: {message}")]
    Connection {
        /// Underlying error text.
        message: String,
    },

    /// A statement failed.
    #[error("Query failed: {message}")]
    Query {
        /// Underlying error text.
        message: String,
    },

    /// Applying migrations failed.
    #[error("Migration failed: {message}")]
    Migration {
        /// Underlying error text.
        message: String,
    },

    /// Documents could not be serialized for saving.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other driver error.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Document model errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// No field has this path.
    #[error("Unknown field: {path}")]
    UnknownField {
        /// Path as given.
        path: String,
    },

    /// Value is not one of the field's options.
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Field path.
        field: String,
        /// Rejected value.
        value: String,
    },

    /// No list item has this id.
    #[error("{kind} not found: {id}")]
    ItemNotFound {
        /// Kind of list item.
        kind: &'static str,
        /// Requested id.
        id: String,
    },

    /// No document has this id.
    #[error("Analysis not found: {id}")]
    AnalysisNotFound {
        /// Requested id.
        id: String,
    },
}

/// Share-link decoding errors
#[derive(Debug, Error)]
pub enum ShareError {
    /// Nothing to decode.
    #[error("Share token is empty")]
    EmptyToken,

    /// Token is not base64 in either alphabet.
    #[error("Share token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not a document.
    #[error("Share token does not contain an analysis: {0}")]
    Json(#[from] serde_json::Error),

    /// Link carries no token.
    #[error("Share URL has no `data` parameter")]
    MissingData,
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for document mutations
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type alias for share-link decoding
pub type ShareResult<T> = Result<T, ShareError>;
