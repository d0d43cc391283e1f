//! The favorites store.
//!
//! Favorites are a set of product IDs per identity: no quantities, no
//! duplicates. Merge-on-login is a set union that keeps the account's
//! existing entries first, then appends guest-only entries in guest order.

use std::sync::Arc;

use lavka_core::{IdentityKey, ProductId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::persist::{self, PersistedState, Storage, record_key, upgrade};
use crate::scoped::{IdentityScopedStore, PartitionItem, StoreSnapshot};

const STORE_NAME: &str = "favorites";

/// A favorited product. Persisted as the bare product ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteEntry(pub ProductId);

impl PartitionItem for FavoriteEntry {
    fn key(&self) -> &ProductId {
        &self.0
    }

    // Set semantics: a second insert of the same product is dropped.
    fn absorb(&mut self, _incoming: Self) {}
}

/// The identity-scoped favorites list, bound to a storage backend.
pub struct FavoritesStore {
    inner: IdentityScopedStore<FavoriteEntry>,
    storage: Arc<dyn Storage>,
    record_key: String,
}

impl FavoritesStore {
    /// Load favorites from storage, upgrading older record shapes.
    /// Never fails; malformed records fall back to empty.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let record_key = record_key(STORE_NAME);
        let state = match storage.load(&record_key) {
            Ok(Some(raw)) => upgrade(STORE_NAME, &raw),
            Ok(None) => PersistedState::default(),
            Err(e) => {
                warn!(error = %e, "favorites record unavailable, starting empty");
                PersistedState::default()
            }
        };
        Self {
            inner: IdentityScopedStore::from_parts(state.active_identity, state.partitions),
            storage,
            record_key,
        }
    }

    /// The active identity's favorites, in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &ProductId> {
        self.inner.items().iter().map(|entry| &entry.0)
    }

    /// A specific identity's favorites.
    pub fn partition(&self, key: &IdentityKey) -> impl Iterator<Item = &ProductId> {
        self.inner.partition(key).iter().map(|entry| &entry.0)
    }

    /// Number of favorites under the active identity.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items().len()
    }

    /// Whether the active identity has no favorites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items().is_empty()
    }

    /// The currently active identity.
    #[must_use]
    pub const fn active_identity(&self) -> &IdentityKey {
        self.inner.active()
    }

    /// Whether the product is favorited under the active identity.
    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        self.inner.get(product).is_some()
    }

    /// Flip membership for a product and return the resulting state:
    /// `true` if the product is now favorited.
    #[instrument(skip(self, product), fields(product = %product))]
    pub fn toggle(&mut self, product: ProductId) -> bool {
        let now_member = if self.inner.remove(&product) {
            false
        } else {
            self.inner.insert(FavoriteEntry(product));
            true
        };
        self.persist();
        now_member
    }

    /// Remove a product from the active favorites. Absence is a no-op.
    pub fn remove(&mut self, product: &ProductId) {
        if self.inner.remove(product) {
            self.persist();
        }
    }

    /// Empty the active identity's favorites only.
    pub fn clear(&mut self) {
        self.inner.clear_active();
        self.persist();
    }

    /// Switch the active identity without moving any data.
    pub fn set_active_identity(&mut self, key: IdentityKey) {
        self.inner.set_active(key);
        self.persist();
    }

    /// Union the guest favorites into `target`'s and activate `target`.
    #[instrument(skip(self, target), fields(identity = %target))]
    pub fn merge_on_login(&mut self, target: &IdentityKey) {
        info!(
            guest_entries = self.inner.partition(&IdentityKey::guest()).len(),
            existing_entries = self.inner.partition(target).len(),
            "merging guest favorites on login"
        );
        self.inner.merge_on_login(target.clone());
        self.persist();
    }

    /// Return to the guest identity. No partition is cleared.
    pub fn reset_on_logout(&mut self) {
        self.inner.reset_on_logout();
        self.persist();
    }

    /// Snapshot every partition, for diagnostics.
    #[must_use]
    pub fn dump(&self) -> StoreSnapshot<FavoriteEntry> {
        self.inner.snapshot()
    }

    fn persist(&self) {
        let state = PersistedState {
            schema_version: persist::SCHEMA_VERSION,
            active_identity: self.inner.active().clone(),
            partitions: self.inner.partitions().clone(),
        };
        match serde_json::to_string(&state) {
            Ok(blob) => {
                if let Err(e) = self.storage.save(&self.record_key, &blob) {
                    warn!(error = %e, "favorites persistence skipped this cycle");
                }
            }
            Err(e) => warn!(error = %e, "favorites state failed to serialize"),
        }
    }
}
