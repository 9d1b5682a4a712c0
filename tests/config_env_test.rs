//! Config environment variable tests
//!
//! Config::from_env() also loads a .env file via dotenvy, so these tests set
//! every variable they assert on and restore it afterwards.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use requirement_analysis::config::{Config, LogFormat, DEFAULT_SHARE_BASE_URL};
use requirement_analysis::AppError;
use serial_test::serial;
use std::env;

#[test]
#[serial]
fn test_config_from_env_defaults() {
    env::remove_var("ANALYSIS_SHARE_BASE_URL");
    env::remove_var("ANALYSIS_DATABASE_MAX_CONNECTIONS");

    let config = Config::from_env().unwrap();
    assert_eq!(config.share.base_url.as_str(), DEFAULT_SHARE_BASE_URL);
    assert_eq!(config.database.max_connections, 1);
}

#[test]
#[serial]
fn test_config_from_env_custom_database() {
    env::set_var("ANALYSIS_DATABASE_PATH", "/custom/analyses.db");
    env::set_var("ANALYSIS_DATABASE_MAX_CONNECTIONS", "4");

    let config = Config::from_env().unwrap();
    assert_eq!(
        config.database.path.to_str().unwrap(),
        "/custom/analyses.db"
    );
    assert_eq!(config.database.max_connections, 4);

    env::remove_var("ANALYSIS_DATABASE_PATH");
    env::remove_var("ANALYSIS_DATABASE_MAX_CONNECTIONS");
}

#[test]
#[serial]
fn test_config_from_env_bad_max_connections_falls_back() {
    env::set_var("ANALYSIS_DATABASE_MAX_CONNECTIONS", "many");

    let config = Config::from_env().unwrap();
    assert_eq!(config.database.max_connections, 1);

    env::remove_var("ANALYSIS_DATABASE_MAX_CONNECTIONS");
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    env::set_var("LOG_FORMAT", "JSON");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::set_var("LOG_FORMAT", "pretty");
    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Pretty);

    env::remove_var("LOG_FORMAT");
}

#[test]
#[serial]
fn test_config_from_env_custom_share_base() {
    env::set_var("ANALYSIS_SHARE_BASE_URL", "https://analysis.example.com/app/");

    let config = Config::from_env().unwrap();
    assert_eq!(
        config.share.base_url.as_str(),
        "https://analysis.example.com/app/"
    );

    env::remove_var("ANALYSIS_SHARE_BASE_URL");
}

#[test]
#[serial]
fn test_config_from_env_invalid_share_base() {
    env::set_var("ANALYSIS_SHARE_BASE_URL", "not a url");

    let result = Config::from_env();
    assert!(matches!(result, Err(AppError::Config { .. })));

    env::remove_var("ANALYSIS_SHARE_BASE_URL");
}

#[test]
#[serial]
fn test_config_from_env_export_dir() {
    env::set_var("ANALYSIS_EXPORT_DIR", "/tmp/reports");

    let config = Config::from_env().unwrap();
    assert_eq!(config.export.dir.to_str().unwrap(), "/tmp/reports");

    env::remove_var("ANALYSIS_EXPORT_DIR");
}
