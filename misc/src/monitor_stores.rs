//! # Storage Monitoring Service
//!
//! This utility performs periodic health checks on the document store and
//! the cache store used by the files_manager services. Connection settings
//! come from the environment (with a `.env` file honored when present);
//! results go to the console and a dated log file.

use anyhow::{Context, Result};
use clap::Parser;
use lib_storage::{CacheClient, CacheConfig, DbClient, DbConfig};
use log::{error, info};
use std::time::Duration;
use tokio::time::sleep;

/// Command-line arguments for the storage monitor.
#[derive(Parser, Debug)]
#[command(author, version, about = "Monitors the files_manager document and cache stores", long_about = None)]
pub struct Args {
    /// Testing frequency in minutes.
    #[arg(short, long, default_value_t = 1)]
    pub frequency: u64,
}

/// Initializes the logging system using `fern`.
pub fn setup_logging() -> Result<()> {
    let log_filename = format!("monitor_stores_{}.log", chrono::Local::now().format("%Y-%m-%d"));

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .chain(fern::log_file(log_filename)?)
        .apply()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let interval_duration = Duration::from_secs(args.frequency * 60);

    info!("Starting storage monitor. Frequency: {} minute(s)", args.frequency);

    loop {
        check_document_store().await;
        check_cache_store().await;
        sleep(interval_duration).await;
    }
}

/// Verifies connectivity to the document store and reports collection sizes.
async fn check_document_store() {
    let config = match DbConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error for document store: {}", e);
            return;
        }
    };

    match DbClient::connect(&config).await {
        Ok(client) if client.is_alive() => {
            info!("SUCCESS: Document store at '{}' is reachable.", config.uri());
            match (client.count_users().await, client.count_files().await) {
                (Ok(users), Ok(files)) => {
                    info!("Collections: {} user(s), {} file(s)", users, files)
                }
                (users, files) => {
                    if let Err(e) = users {
                        error!("FAILURE: Counting users failed: {}", e);
                    }
                    if let Err(e) = files {
                        error!("FAILURE: Counting files failed: {}", e);
                    }
                }
            }
        }
        Ok(_) => error!("FAILURE: Document store at '{}' is unreachable.", config.uri()),
        Err(e) => error!("FAILURE: Document store at '{}': {}", config.uri(), e),
    }
}

/// Verifies connectivity to the cache store.
async fn check_cache_store() {
    let config = CacheConfig::default();
    // A failed connect is already logged by the client itself.
    let client = CacheClient::connect(&config.url).await;
    if client.is_alive() {
        info!("SUCCESS: Cache store at '{}' is reachable.", config.url);
    }
}
