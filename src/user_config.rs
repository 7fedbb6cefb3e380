//! User-level client configuration loaded from `~/.gridbase/config.toml`.
//!
//! This file is optional; if it does not exist all fields fall back to their
//! `Default` values. The schema is intentionally minimal — it holds the
//! client-side tuning knobs (currently the fetch ceiling used when a view
//! falls back to application-side sorting).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Rows fetched in one page when a sort has to run client-side.
pub const DEFAULT_FETCH_PAGE_SIZE: usize = 1000;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("Failed to read user config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse user config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

fn default_fetch_page_size() -> usize {
    DEFAULT_FETCH_PAGE_SIZE
}

/// Client-scoped settings (`[client]` table in the TOML file).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// How many rows to pull when sorting falls back to the client. Larger
    /// values sort more of the table correctly at the cost of bigger
    /// fetches.
    #[serde(default = "default_fetch_page_size")]
    pub fetch_page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            fetch_page_size: DEFAULT_FETCH_PAGE_SIZE,
        }
    }
}

/// Top-level user configuration, deserialized from
/// `~/.gridbase/config.toml`.
///
/// All fields are optional at the TOML level; missing fields resolve to
/// their `Default` values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserConfig {
    /// Client-level settings (`[client]` section).
    #[serde(default)]
    pub client: ClientConfig,
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Resolve the canonical path for the user config file
/// (`~/.gridbase/config.toml`).
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".gridbase").join("config.toml"))
}

/// Load the user configuration from `~/.gridbase/config.toml`.
///
/// Returns `Ok(UserConfig::default())` if the file does not exist so callers
/// never need to handle the "absent file" case specially.
///
/// # Errors
///
/// Returns [`UserConfigError`] if the file exists but cannot be read or
/// parsed.
pub fn load_user_config() -> Result<UserConfig, UserConfigError> {
    let path = match user_config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine user config directory; using defaults");
            return Ok(UserConfig::default());
        }
    };

    if !path.exists() {
        debug!(
            "User config not found at {}; using defaults",
            path.display()
        );
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: UserConfig = toml::from_str(&content)?;
    debug!("Loaded user config from {}", path.display());
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "user_config_tests.rs"]
mod tests;
