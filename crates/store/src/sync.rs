//! Coordinated identity transitions across both stores.
//!
//! Cart and favorites are independent stores, but they must change
//! identity together: a product must never be favorited under one
//! identity while cart-bound under another. [`AppStores`] owns both
//! instances and transitions them as a unit; [`AuthSync`] consumes auth
//! notifications and deduplicates repeated events.
//!
//! Both stores are constructed once at application start and passed by
//! reference to whatever needs them. There is no ambient global state.

use std::sync::Arc;

use lavka_core::{AuthUser, IdentityKey};
use tracing::{debug, info};

use crate::cart::CartStore;
use crate::config::StoreConfig;
use crate::favorites::FavoritesStore;
use crate::persist::{FileStorage, Storage, sweep_legacy_records};

/// Both client-state stores, opened against one storage backend.
pub struct AppStores {
    cart: CartStore,
    favorites: FavoritesStore,
}

impl AppStores {
    /// Open the stores against file storage under the configured data
    /// directory, sweeping superseded record keys first.
    #[must_use]
    pub fn open(config: &StoreConfig) -> Self {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.data_dir));
        let removed = sweep_legacy_records(storage.as_ref());
        if !removed.is_empty() {
            info!(?removed, "swept legacy store records");
        }
        Self::with_storage(storage)
    }

    /// Open the stores against an explicit storage backend.
    #[must_use]
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            cart: CartStore::load(Arc::clone(&storage)),
            favorites: FavoritesStore::load(storage),
        }
    }

    /// The cart store.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// The cart store, mutably.
    pub const fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    /// The favorites store.
    #[must_use]
    pub const fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// The favorites store, mutably.
    pub const fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    /// Merge guest state into `identity` in both stores and activate it.
    ///
    /// Merging already sets the active identity; no second pass is
    /// needed, and the per-store merge is a no-op when the guest
    /// partition is empty.
    pub fn sync_login(&mut self, identity: &IdentityKey) {
        self.cart.merge_on_login(identity);
        self.favorites.merge_on_login(identity);
    }

    /// Return both stores to the guest identity. Nothing is cleared.
    pub fn sync_logout(&mut self) {
        self.cart.reset_on_logout();
        self.favorites.reset_on_logout();
    }
}

/// Tracks auth-state notifications and applies each transition once.
///
/// The auth backend may fire duplicate events for the same state; this
/// guard skips a notification whose derived identity matches the last
/// applied one, so a login is merged exactly once.
///
/// The first notification is always applied: the stores may have
/// restored a non-guest active identity from a previous session, and
/// the backend's initial report is what decides whether that session is
/// still authenticated.
#[derive(Debug)]
pub struct AuthSync {
    last_applied: Option<IdentityKey>,
}

impl AuthSync {
    /// Start with no transition applied yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_applied: None }
    }

    /// The identity of the last applied transition, if any was applied.
    #[must_use]
    pub const fn last_applied(&self) -> Option<&IdentityKey> {
        self.last_applied.as_ref()
    }

    /// React to an auth-state notification.
    ///
    /// `Some(user)` means the user is authenticated; `None` means signed
    /// out. Redundant notifications are skipped.
    pub fn on_auth_change(&mut self, stores: &mut AppStores, user: Option<&AuthUser>) {
        let target = user.map_or_else(IdentityKey::guest, IdentityKey::for_user);

        if self.last_applied.as_ref() == Some(&target) {
            debug!(identity = %target, "auth state unchanged, skipping transition");
            return;
        }

        if target.is_guest() {
            info!("user signed out, returning stores to guest");
            stores.sync_logout();
        } else {
            info!(identity = %target, "user signed in, merging guest state");
            stores.sync_login(&target);
        }
        self.last_applied = Some(target);
    }
}

impl Default for AuthSync {
    fn default() -> Self {
        Self::new()
    }
}
