use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use requirement_analysis::{
    cli::{execute_command, Cli},
    config::{Config, LogFormat},
    state::Workspace,
    storage::SqliteStorage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(path) = cli.database.clone() {
        config.database.path = path;
    }

    // Initialize logging
    init_logging(&config);

    debug!(version = env!("CARGO_PKG_VERSION"), "req-analysis starting");

    // Initialize storage
    let storage = match SqliteStorage::new(&config.database).await {
        Ok(s) => {
            info!(path = %config.database.path.display(), "Database initialized");
            s
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            return Err(e.into());
        }
    };

    let mut workspace = Workspace::open(storage).await;
    workspace.restore_active().await;

    let result = execute_command(cli.command, &mut workspace, &config).await;
    if result.exit_code == 0 {
        print!("{}", with_newline(&result.message));
    } else {
        eprint!("{}", with_newline(&result.message));
    }

    std::process::exit(result.exit_code);
}

fn with_newline(message: &str) -> String {
    if message.is_empty() || message.ends_with('\n') {
        message.to_string()
    } else {
        format!("{}\n", message)
    }
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
