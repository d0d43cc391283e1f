//! Migrate command: upgrade persisted records to the current schema.
//!
//! Reads each store's record, runs it through the versioned upgrade
//! (flat lists and partial envelopes become full partition maps), writes
//! it back at the current schema version, and sweeps files left behind
//! by superseded record keys.

use lavka_store::persist::{record_key, sweep_legacy_records, upgrade};
use lavka_store::{CartLine, FavoriteEntry, FileStorage, Storage, StoreConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from the migrate command.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] lavka_store::ConfigError),

    /// A record could not be read or rewritten.
    #[error(transparent)]
    Storage(#[from] lavka_store::StorageError),

    /// An upgraded record failed to serialize.
    #[error("failed to serialize upgraded record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Upgrade both records in the configured data directory.
#[allow(clippy::print_stdout)]
pub fn records() -> Result<(), MigrateError> {
    let config = StoreConfig::from_env()?;
    let storage = FileStorage::new(&config.data_dir);

    rewrite::<CartLine>(&storage, "cart")?;
    rewrite::<FavoriteEntry>(&storage, "favorites")?;

    let removed = sweep_legacy_records(&storage);
    if removed.is_empty() {
        println!("no legacy records to sweep");
    } else {
        for key in removed {
            println!("swept legacy record {key}");
        }
    }
    Ok(())
}

/// Load, upgrade, and rewrite one store's record.
#[allow(clippy::print_stdout)]
fn rewrite<T>(storage: &FileStorage, store: &str) -> Result<(), MigrateError>
where
    T: Serialize + DeserializeOwned,
{
    let key = record_key(store);
    let Some(raw) = storage.load(&key)? else {
        println!("{key}: no record, nothing to migrate");
        return Ok(());
    };

    let state = upgrade::<T>(store, &raw);
    let blob = serde_json::to_string(&state)?;
    storage.save(&key, &blob)?;
    println!(
        "{key}: rewritten at schema v{} ({} partition(s))",
        state.schema_version,
        state.partitions.len()
    );
    Ok(())
}
