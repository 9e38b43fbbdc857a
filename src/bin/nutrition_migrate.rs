//! # Nutrition Migration CLI
//!
//! Runs one provider-migration batch against the configured SQLite record
//! store and exits non-zero when the batch did not succeed.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

use nutrition_migrator::config::ConfigManager;
use nutrition_migrator::logging::init_structured_logging;
use nutrition_migrator::orchestration::MigrationBootstrap;

#[derive(Parser)]
#[command(name = "nutrition-migrate")]
#[command(about = "Re-derive legacy-provider nutrition facts from the new provider")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment section to apply (development, test, production)
    #[arg(short, long)]
    environment: Option<String>,

    /// Directory containing migrator-config.yaml (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Override the record store database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Override the maximum number of concurrent workers
    #[arg(long)]
    workers: Option<usize>,

    /// Print the batch outcome as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_structured_logging();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!(error = %e, "❌ Migration could not start");
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let manager = match cli.environment.as_deref() {
        Some(environment) => {
            ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)
        }
        None => ConfigManager::load_from_directory(cli.config_dir.clone()),
    }
    .context("failed to load migrator configuration")?;

    let mut config = manager.config().clone();
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(workers) = cli.workers {
        config.migration.max_concurrent_workers = workers;
    }
    let manager = ConfigManager::from_config(config).context("invalid configuration override")?;

    let bootstrap = MigrationBootstrap::from_config_manager(manager)
        .await
        .context("failed to bootstrap migration")?;

    let outcome = bootstrap
        .coordinator
        .reconcile_with_callback(|succeeded, message| {
            info!(succeeded = succeeded, "🏁 {message}");
        })
        .await;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("failed to encode outcome")?
        );
    } else {
        println!("{}", outcome.message);
        println!(
            "found: {}  migrated: {}  skipped: {}  not found: {}",
            outcome.candidates_found,
            outcome.migrated_count,
            outcome.skipped_count,
            outcome.not_found_count
        );
    }

    bootstrap.record_store.pool().close().await;
    Ok(outcome.succeeded)
}
