use std::env;
use std::path::PathBuf;

use url::Url;

use crate::error::AppError;

/// Default share-link base used when `ANALYSIS_SHARE_BASE_URL` is unset.
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:5173/";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Document database settings.
    pub database: DatabaseConfig,
    /// Log level and format.
    pub logging: LoggingConfig,
    /// Share-link settings.
    pub share: ShareConfig,
    /// File export settings.
    pub export: ExportConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: PathBuf,
    /// Connection pool size.
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Share-link configuration
#[derive(Debug, Clone)]
pub struct ShareConfig {
    /// Origin and path that share links are appended to.
    pub base_url: Url,
}

/// Report export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory exported files are written to when no explicit path is given.
    pub dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("ANALYSIS_DATABASE_PATH")
                    .unwrap_or_else(|_| "./data/analyses.db".to_string()),
            ),
            max_connections: env::var("ANALYSIS_DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let raw_base = env::var("ANALYSIS_SHARE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_SHARE_BASE_URL.to_string());
        let share = ShareConfig {
            base_url: Url::parse(&raw_base).map_err(|e| AppError::Config {
                message: format!("ANALYSIS_SHARE_BASE_URL is not a valid URL: {}", e),
            })?,
        };

        let export = ExportConfig {
            dir: PathBuf::from(env::var("ANALYSIS_EXPORT_DIR").unwrap_or_else(|_| ".".to_string())),
        };

        Ok(Config {
            database,
            logging,
            share,
            export,
        })
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/analyses.db"),
            max_connections: 1,
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_SHARE_BASE_URL).expect("default share URL is valid"),
        }
    }
}
