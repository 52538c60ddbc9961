pub mod auth;
pub mod booking;
pub mod config;
pub mod events;
pub mod room;
pub mod sync;

use std::sync::Arc;

use roombook_core::error::Result;
use roombook_core::{Backend, CalendarIntegration, Config};

pub type CmdResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Open the configured backend.
pub fn backend() -> Result<Arc<dyn Backend>> {
    let config = Config::load()?;
    tracing::debug!(path = %Config::path()?.display(), "configuration loaded");
    Ok(config.backend.open()?)
}

/// Build the integration from configuration.
pub fn integration() -> Result<CalendarIntegration> {
    let config = Config::load()?;
    CalendarIntegration::from_config(&config)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
