//! CLI command implementations.

pub mod clear;
pub mod dump;
pub mod migrate;

use lavka_store::{AppStores, ConfigError, StoreConfig};

/// Open both stores against the configured data directory.
pub fn open_stores() -> Result<AppStores, ConfigError> {
    let config = StoreConfig::from_env()?;
    Ok(AppStores::open(&config))
}
