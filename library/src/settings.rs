//! Config loading for the frontend

use std::path::Path;

use anyhow::{Context, Result};
use romhub_core::config::{self, Config};

/// Load the config from `path`, or from the platform config dir when `None`.
///
/// An explicit path must exist and parse; the default location silently
/// falls back to defaults. Validation warnings are logged either way.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => config::load(),
    };

    for warning in config::validate(&config) {
        tracing::warn!("Config: {}", warning);
    }

    Ok(config)
}
