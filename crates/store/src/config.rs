//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LAVKA_DATA_DIR` - Directory for persisted store records
//!   (default: `./data`)
//!
//! Identity-key derivation precedence is deliberately not configurable
//! here; it is pinned in one place, `lavka_core::IdentityKey::for_user`.

use std::path::PathBuf;

use thiserror::Error;

const DATA_DIR_VAR: &str = "LAVKA_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "./data";

/// Errors loading the store configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable is set but unusable.
    #[error("invalid {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Configuration for the client-state stores.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory persisted records are written into.
    pub data_dir: PathBuf,
}

impl StoreConfig {
    /// Load configuration from the environment, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value
    /// (currently: an empty data directory).
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = match std::env::var(DATA_DIR_VAR) {
            Ok(dir) if dir.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar(
                    DATA_DIR_VAR.to_owned(),
                    "must not be empty".to_owned(),
                ));
            }
            Ok(dir) => PathBuf::from(dir),
            Err(_) => PathBuf::from(DEFAULT_DATA_DIR),
        };
        Ok(Self { data_dir })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}
