//! The shopping cart store.
//!
//! One [`CartLine`] per product per partition: adding a product that is
//! already in the cart increments its quantity instead of duplicating the
//! line. Every mutation is persisted best-effort through the configured
//! storage backend.

use std::sync::Arc;

use lavka_core::{IdentityKey, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::persist::{self, PersistedState, Storage, record_key, upgrade};
use crate::scoped::{IdentityScopedStore, PartitionItem, StoreSnapshot};

/// Store name used to build the persisted record key.
const STORE_NAME: &str = "cart";

/// One product in a cart: identity, display data, and quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product this line refers to; unique within a partition.
    pub product: ProductId,
    /// Display title, denormalized at add time.
    pub title: String,
    /// Unit price at add time.
    pub unit_price: Price,
    /// Number of units, always at least 1.
    pub quantity: u32,
    /// Primary image reference, if the product has one.
    pub image: Option<String>,
}

impl CartLine {
    /// Create a cart line. A zero quantity is clamped to 1; a line that
    /// exists holds at least one unit.
    #[must_use]
    pub fn new(
        product: ProductId,
        title: impl Into<String>,
        unit_price: Price,
        quantity: u32,
    ) -> Self {
        Self {
            product,
            title: title.into(),
            unit_price,
            quantity: quantity.max(1),
            image: None,
        }
    }

    /// Attach an image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.amount() * Decimal::from(self.quantity)
    }
}

impl PartitionItem for CartLine {
    fn key(&self) -> &ProductId {
        &self.product
    }

    fn absorb(&mut self, incoming: Self) {
        self.quantity = self.quantity.saturating_add(incoming.quantity);
    }
}

/// The identity-scoped cart, bound to a storage backend.
pub struct CartStore {
    inner: IdentityScopedStore<CartLine>,
    storage: Arc<dyn Storage>,
    record_key: String,
}

impl CartStore {
    /// Load the cart from storage, upgrading older record shapes.
    ///
    /// Unreadable or malformed records fall back to an empty cart; this
    /// constructor never fails.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let record_key = record_key(STORE_NAME);
        let state = match storage.load(&record_key) {
            Ok(Some(raw)) => upgrade(STORE_NAME, &raw),
            Ok(None) => PersistedState::default(),
            Err(e) => {
                warn!(error = %e, "cart record unavailable, starting empty");
                PersistedState::default()
            }
        };
        Self {
            inner: IdentityScopedStore::from_parts(state.active_identity, state.partitions),
            storage,
            record_key,
        }
    }

    /// The active partition's lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLine] {
        self.inner.items()
    }

    /// A specific identity's lines, regardless of which is active.
    #[must_use]
    pub fn partition(&self, key: &IdentityKey) -> &[CartLine] {
        self.inner.partition(key)
    }

    /// The currently active identity.
    #[must_use]
    pub const fn active_identity(&self) -> &IdentityKey {
        self.inner.active()
    }

    /// Sum of `price * quantity` over the active partition.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items().iter().map(CartLine::line_total).sum()
    }

    /// Total unit count over the active partition.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items().iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Add a line to the active cart.
    ///
    /// If the product is already in the cart its quantity grows by the
    /// incoming quantity; otherwise the line is appended.
    #[instrument(skip(self, line), fields(product = %line.product))]
    pub fn add(&mut self, line: CartLine) {
        self.inner.insert(line);
        self.persist();
    }

    /// Remove a product's line from the active cart. Absence is a no-op.
    pub fn remove(&mut self, product: &ProductId) {
        if self.inner.remove(product) {
            self.persist();
        }
    }

    /// Replace the quantity of a product's line.
    ///
    /// A quantity of 0 removes the line: an empty line has no meaning in
    /// the cart, and `u32` keeps negatives unrepresentable. Unknown
    /// products are a no-op.
    pub fn set_quantity(&mut self, product: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product);
            return;
        }
        if let Some(line) = self.inner.get_mut(product) {
            line.quantity = quantity;
            self.persist();
        }
    }

    /// Empty the active cart only.
    pub fn clear(&mut self) {
        self.inner.clear_active();
        self.persist();
    }

    /// Switch the active identity without moving any data.
    pub fn set_active_identity(&mut self, key: IdentityKey) {
        self.inner.set_active(key);
        self.persist();
    }

    /// Fold the guest cart into `target`'s cart and activate `target`.
    /// See [`IdentityScopedStore::merge_on_login`] for the exact rules.
    #[instrument(skip(self, target), fields(identity = %target))]
    pub fn merge_on_login(&mut self, target: &IdentityKey) {
        info!(
            guest_lines = self.inner.partition(&IdentityKey::guest()).len(),
            existing_lines = self.inner.partition(target).len(),
            "merging guest cart on login"
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
    pub fn dump(&self) -> StoreSnapshot<CartLine> {
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
                    warn!(error = %e, "cart persistence skipped this cycle");
                }
            }
            Err(e) => warn!(error = %e, "cart state failed to serialize"),
        }
    }
}
