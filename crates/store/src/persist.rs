//! Durable persistence for the identity-scoped stores.
//!
//! Each store instance persists one JSON record under its own namespaced
//! key. Records are versioned: older on-device shapes (a flat item list,
//! or a partition map without an active identity) are upgraded on load,
//! and anything unparseable falls back to an empty default rather than
//! failing initialization.
//!
//! Persistence is fire-and-forget: a failed save is logged and skipped,
//! never surfaced to the caller. A crash between mutation and save loses
//! at most the last mutation.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use lavka_core::IdentityKey;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Current persisted-record schema version.
///
/// v1-v3 shipped flat lists and partial partition maps; v4 is the full
/// `{ schema_version, active_identity, partitions }` shape.
pub const SCHEMA_VERSION: u32 = 4;

/// Record keys superseded by the current schema. Swept on startup and by
/// `lavka-cli migrate` so stale files do not accumulate on devices.
pub const LEGACY_RECORD_KEYS: &[&str] = &[
    "cart-storage",
    "cart-storage-v2",
    "cart-storage-v3",
    "simple-cart-storage",
    "Cart",
    "cart",
    "favorites-storage",
    "favorites-storage-v2",
    "favorites-storage-v3",
];

/// The namespaced record key for a store at the current schema version.
#[must_use]
pub fn record_key(store: &str) -> String {
    format!("{store}-storage-v{SCHEMA_VERSION}")
}

/// Errors from a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Scoped get/set of serialized blobs by key.
///
/// The stores treat this as an external collaborator: loads happen once
/// at construction, saves after each mutation. Backends may be durable
/// ([`FileStorage`]) or ephemeral ([`MemoryStorage`]).
pub trait Storage: Send + Sync {
    /// Load the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `blob` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError>;

    /// Delete the record under `key`. Returns whether a record existed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

/// File-backed storage: one JSON file per record under a data directory.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `root`. The directory is created
    /// lazily on first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this storage writes into.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root)?;
        // Write through a temp file so a crash mid-write cannot truncate
        // the only copy of the record.
        let path = self.path_for(key);
        let tmp = self.root.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, blob)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, for tests that start from existing on-device data.
    pub fn seed(&self, key: &str, blob: &str) {
        self.lock().insert(key.to_owned(), blob.to_owned());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_owned(), blob.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.lock().remove(key).is_some())
    }
}

/// The persisted shape of one store instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState<T> {
    /// Schema version this record was written at.
    pub schema_version: u32,
    /// Identity that was active when the record was written.
    pub active_identity: IdentityKey,
    /// All partitions, including emptied ones.
    pub partitions: HashMap<IdentityKey, Vec<T>>,
}

impl<T> Default for PersistedState<T> {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            active_identity: IdentityKey::guest(),
            partitions: HashMap::new(),
        }
    }
}

/// Upgrade a raw persisted blob to the current schema.
///
/// Pure and total over every shape we have ever shipped:
///
/// - a flat JSON array becomes the guest partition of a fresh structure;
/// - an object with an `items` or `favorites` list likewise;
/// - a partition map without `active_identity` defaults it to guest;
/// - anything else (including unparseable input) becomes the empty
///   default.
///
/// Migration never errors; malformed data is logged and replaced.
#[must_use]
pub fn upgrade<T: DeserializeOwned>(store: &str, raw: &str) -> PersistedState<T> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(store, error = %e, "persisted record is not JSON, starting empty");
            return PersistedState::default();
        }
    };
    upgrade_value(store, value)
}

fn upgrade_value<T: DeserializeOwned>(store: &str, value: Value) -> PersistedState<T> {
    match value {
        // Oldest shape: the list itself, no envelope.
        Value::Array(_) => guest_only(store, value),
        Value::Object(ref map) => {
            if let Some(partitions) = map.get("partitions") {
                let Ok(partitions) = serde_json::from_value::<HashMap<IdentityKey, Vec<T>>>(
                    partitions.clone(),
                ) else {
                    warn!(store, "persisted partitions do not match schema, starting empty");
                    return PersistedState::default();
                };
                let active_identity = map
                    .get("active_identity")
                    .and_then(Value::as_str)
                    .map_or_else(IdentityKey::guest, IdentityKey::new);
                PersistedState {
                    schema_version: SCHEMA_VERSION,
                    active_identity,
                    partitions,
                }
            } else if let Some(items) = map.get("items").or_else(|| map.get("favorites")) {
                // Pre-partition envelope: a single anonymous list.
                guest_only(store, items.clone())
            } else {
                warn!(store, "persisted record has unknown shape, starting empty");
                PersistedState::default()
            }
        }
        _ => {
            warn!(store, "persisted record has unknown shape, starting empty");
            PersistedState::default()
        }
    }
}

/// Treat `value` as the guest partition of a fresh structure.
fn guest_only<T: DeserializeOwned>(store: &str, value: Value) -> PersistedState<T> {
    match serde_json::from_value::<Vec<T>>(value) {
        Ok(items) => {
            debug!(store, count = items.len(), "upgraded flat list to guest partition");
            let mut partitions = HashMap::new();
            partitions.insert(IdentityKey::guest(), items);
            PersistedState {
                schema_version: SCHEMA_VERSION,
                active_identity: IdentityKey::guest(),
                partitions,
            }
        }
        Err(e) => {
            warn!(store, error = %e, "legacy items do not match schema, starting empty");
            PersistedState::default()
        }
    }
}

/// Delete records written under superseded keys.
///
/// Returns the keys that were actually removed.
pub fn sweep_legacy_records(storage: &dyn Storage) -> Vec<&'static str> {
    let mut removed = Vec::new();
    for key in LEGACY_RECORD_KEYS {
        match storage.remove(key) {
            Ok(true) => {
                debug!(key, "removed legacy record");
                removed.push(*key);
            }
            Ok(false) => {}
            Err(e) => warn!(key, error = %e, "failed to remove legacy record"),
        }
    }
    removed
}
