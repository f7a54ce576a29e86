//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod routes;
pub mod server;

use crate::state::{AppState, RelayHandle};
use anyhow::{Context, Result};
use shotrelay_core::Config;
use shotrelay_infra::{ScreenshotFetcher, TelegramSink};
use std::sync::Arc;

/// Initialize the entire application
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    shotrelay_infra::telemetry::init_telemetry("shotrelay=debug,tower_http=debug")
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated");

    let fetcher = ScreenshotFetcher::new(&config).context("Failed to build fetch client")?;

    let relay = match (&config.telegram_bot_token, &config.telegram_chat_id) {
        (Some(token), Some(chat_id)) => Some(RelayHandle {
            sink: Arc::new(TelegramSink::new(token)?),
            chat_id: chat_id.clone(),
        }),
        _ => {
            tracing::warn!("Telegram relay not configured, only dry-run requests will succeed");
            None
        }
    };

    let state = Arc::new(AppState {
        config,
        fetcher,
        relay,
    });
    let router = routes::build_router(state.clone());

    Ok((state, router))
}
