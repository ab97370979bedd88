//! CarExtractor - asset catalog browser and exporter
//!
//! Main entry point for the command line application.

mod cli;
mod commands;
mod folder_source;

use anyhow::Result;
use app_core::{AppConfig, AppState};
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging and panic hook first
    let _log_guard = app_log::init()?;

    tracing::info!("CarExtractor starting...");

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });

    // Clean up old logs
    if let Err(e) = app_log::cleanup_old_logs(config.general.log_retention_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    let state = AppState::new(config);
    commands::run(&state, cli.command, &config_path).await
}
