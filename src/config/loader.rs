//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{ConfigSnapshot, RawConfig};

/// Error type for configuration loading.
///
/// Both kinds are fatal at open time; at reload time the previous snapshot
/// stays active and the error is only logged.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration source missing or inaccessible.
    #[error("config file unreadable: {0}")]
    Unreadable(#[source] std::io::Error),

    /// Configuration source present but not valid JSON.
    #[error("config file malformed: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Load a configuration snapshot from a JSON file.
///
/// Pure function of the path contents: either a fully-populated snapshot or
/// an error, with no partial state.
pub fn load_snapshot(path: &Path) -> Result<ConfigSnapshot, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Unreadable)?;
    let raw: RawConfig = serde_json::from_str(&content).map_err(ConfigError::Malformed)?;
    Ok(ConfigSnapshot::from_raw(raw))
}
