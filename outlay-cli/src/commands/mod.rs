//! CLI command implementations

pub mod auth;
pub mod budget;
pub mod document;
pub mod expense;
pub mod plan;
pub mod report;
pub mod settings;
pub mod team;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use outlay_core::ports::KeyValueStore;
use outlay_core::OutlayContext;

use crate::notify::TerminalNotifier;

/// Get the outlay data directory from environment or default
pub fn get_outlay_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("OUTLAY_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".outlay")
    }
}

/// Get or create the outlay context
pub fn get_context() -> Result<OutlayContext> {
    let outlay_dir = get_outlay_dir();

    std::fs::create_dir_all(&outlay_dir)
        .with_context(|| format!("Failed to create outlay directory: {:?}", outlay_dir))?;

    OutlayContext::new(&outlay_dir, Arc::new(TerminalNotifier))
        .context("Failed to initialize outlay context")
}

/// The preferred display currency, defaulting to USD
pub fn display_currency(ctx: &OutlayContext) -> String {
    ctx.store
        .get(outlay_core::ports::keys::DEFAULT_CURRENCY)
        .ok()
        .flatten()
        .unwrap_or_else(|| "USD".to_string())
}
