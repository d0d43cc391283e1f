//! Clear command: delete persisted store records.
//!
//! Deletes whole records, every partition included. This is a device
//! reset, not the in-app "empty my cart" operation.

use lavka_store::persist::record_key;
use lavka_store::{FileStorage, Storage, StoreConfig};
use thiserror::Error;

/// Errors from the clear command.
#[derive(Debug, Error)]
pub enum ClearError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] lavka_store::ConfigError),

    /// The record could not be deleted.
    #[error(transparent)]
    Storage(#[from] lavka_store::StorageError),
}

/// Delete the selected records from the configured data directory.
#[allow(clippy::print_stdout)]
pub fn records(cart: bool, favorites: bool) -> Result<(), ClearError> {
    let config = StoreConfig::from_env()?;
    let storage = FileStorage::new(&config.data_dir);

    let mut targets = Vec::new();
    if cart {
        targets.push(record_key("cart"));
    }
    if favorites {
        targets.push(record_key("favorites"));
    }

    for key in targets {
        if storage.remove(&key)? {
            println!("deleted {key}");
        } else {
            println!("{key}: nothing to delete");
        }
    }
    Ok(())
}
