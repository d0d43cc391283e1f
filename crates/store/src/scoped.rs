//! The generic identity-scoped store.
//!
//! A store holds one logical list (cart lines, favorite products)
//! partitioned by [`IdentityKey`]. All reads and writes target the active
//! partition; the only operation that crosses partitions is
//! [`IdentityScopedStore::merge_on_login`], which folds the guest
//! partition into an account's partition exactly once per login.

use std::collections::HashMap;

use lavka_core::{IdentityKey, ProductId};
use serde::Serialize;

/// An item that can live in a partition.
///
/// Items are keyed by product ID; at most one item per key exists in a
/// partition. When a second item with the same key arrives (a repeated
/// add, or a merge collision), the existing item absorbs it.
pub trait PartitionItem: Clone {
    /// The product this item refers to.
    fn key(&self) -> &ProductId;

    /// Fold a same-keyed incoming item into this one.
    ///
    /// Cart lines sum quantities; favorites drop the duplicate.
    fn absorb(&mut self, incoming: Self);
}

/// A keyed-list store partitioned by user identity.
///
/// Partitions are created lazily on first write and never deleted, only
/// emptied. The active identity defaults to guest.
#[derive(Debug, Clone)]
pub struct IdentityScopedStore<T> {
    partitions: HashMap<IdentityKey, Vec<T>>,
    active: IdentityKey,
}

impl<T> Default for IdentityScopedStore<T> {
    fn default() -> Self {
        Self {
            partitions: HashMap::new(),
            active: IdentityKey::guest(),
        }
    }
}

impl<T: PartitionItem> IdentityScopedStore<T> {
    /// Create an empty store with the guest identity active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously persisted parts.
    #[must_use]
    pub fn from_parts(active: IdentityKey, partitions: HashMap<IdentityKey, Vec<T>>) -> Self {
        Self { partitions, active }
    }

    /// The currently active identity.
    #[must_use]
    pub const fn active(&self) -> &IdentityKey {
        &self.active
    }

    /// Switch the active identity.
    ///
    /// Pure state change: no data moves between partitions. Subsequent
    /// reads and writes target the new partition.
    pub fn set_active(&mut self, key: IdentityKey) {
        self.active = key;
    }

    /// The active partition's items, in insertion order.
    ///
    /// An identity that has never been written reads as empty.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.partition(&self.active)
    }

    /// A specific partition's items, in insertion order.
    #[must_use]
    pub fn partition(&self, key: &IdentityKey) -> &[T] {
        self.partitions.get(key).map_or(&[], Vec::as_slice)
    }

    /// Look up the active partition's item for a product, if present.
    #[must_use]
    pub fn get(&self, key: &ProductId) -> Option<&T> {
        self.items().iter().find(|item| item.key() == key)
    }

    /// Mutable access to the active partition's item for a product.
    pub fn get_mut(&mut self, key: &ProductId) -> Option<&mut T> {
        self.partitions
            .get_mut(&self.active)?
            .iter_mut()
            .find(|item| item.key() == key)
    }

    /// Insert an item into the active partition.
    ///
    /// If an item with the same product ID already exists it absorbs the
    /// incoming one; otherwise the item is appended. The partition never
    /// holds two items with the same key.
    pub fn insert(&mut self, item: T) {
        let partition = self.partitions.entry(self.active.clone()).or_default();
        match partition.iter_mut().find(|i| i.key() == item.key()) {
            Some(existing) => existing.absorb(item),
            None => partition.push(item),
        }
    }

    /// Remove the item with the given product ID from the active
    /// partition. Returns whether an item was removed; absence is a
    /// no-op, not an error.
    pub fn remove(&mut self, key: &ProductId) -> bool {
        let Some(partition) = self.partitions.get_mut(&self.active) else {
            return false;
        };
        let before = partition.len();
        partition.retain(|item| item.key() != key);
        partition.len() != before
    }

    /// Empty the active partition. Other partitions are untouched.
    pub fn clear_active(&mut self) {
        if let Some(partition) = self.partitions.get_mut(&self.active) {
            partition.clear();
        }
    }

    /// Fold the guest partition into `target`'s partition and make
    /// `target` active.
    ///
    /// Guest items are absorbed into same-keyed items already in the
    /// target partition; the rest are appended in their guest order after
    /// all pre-existing items. The guest partition is left empty (not
    /// deleted). Calling this again right away finds an empty guest
    /// partition and only switches the active identity, so duplicate
    /// login notifications cannot double-count.
    pub fn merge_on_login(&mut self, target: IdentityKey) {
        // Take the guest items and leave an empty partition behind.
        let guest = self
            .partitions
            .insert(IdentityKey::guest(), Vec::new())
            .unwrap_or_default();

        let merged = self.partitions.entry(target.clone()).or_default();
        for item in guest {
            match merged.iter_mut().find(|i| i.key() == item.key()) {
                Some(existing) => existing.absorb(item),
                None => merged.push(item),
            }
        }
        self.active = target;
    }

    /// Return to the guest identity.
    ///
    /// No partition is cleared: a later login with the same identity must
    /// see its previously persisted items untouched.
    pub fn reset_on_logout(&mut self) {
        self.active = IdentityKey::guest();
    }

    /// Consume the store into its parts, for persistence.
    #[must_use]
    pub fn into_parts(self) -> (IdentityKey, HashMap<IdentityKey, Vec<T>>) {
        (self.active, self.partitions)
    }

    /// Borrow the partition map, for persistence.
    #[must_use]
    pub const fn partitions(&self) -> &HashMap<IdentityKey, Vec<T>> {
        &self.partitions
    }

    /// A snapshot of every partition, for diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot<T> {
        let mut partitions: Vec<_> = self
            .partitions
            .iter()
            .map(|(key, items)| (key.clone(), items.clone()))
            .collect();
        partitions.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        StoreSnapshot {
            active_identity: self.active.clone(),
            partitions,
        }
    }
}

/// Point-in-time view of a whole store, every partition included.
///
/// This is the explicit replacement for ad-hoc debug hooks: the CLI
/// renders it, tests assert on it.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot<T> {
    /// The identity reads and writes currently target.
    pub active_identity: IdentityKey,
    /// All partitions, sorted by identity key.
    pub partitions: Vec<(IdentityKey, Vec<T>)>,
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    /// Minimal counted item for exercising the generic store.
    #[derive(Debug, Clone, PartialEq)]
    struct Counted {
        product: ProductId,
        count: u32,
    }

    impl Counted {
        fn new(id: &str, count: u32) -> Self {
            Self {
                product: ProductId::new(id),
                count,
            }
        }
    }

    impl PartitionItem for Counted {
        fn key(&self) -> &ProductId {
            &self.product
        }

        fn absorb(&mut self, incoming: Self) {
            self.count += incoming.count;
        }
    }

    #[test]
    fn test_unknown_identity_reads_empty() {
        let mut store = IdentityScopedStore::<Counted>::new();
        store.set_active(IdentityKey::new("nobody"));
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_insert_absorbs_same_key() {
        let mut store = IdentityScopedStore::new();
        store.insert(Counted::new("p1", 1));
        store.insert(Counted::new("p1", 2));
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].count, 3);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = IdentityScopedStore::<Counted>::new();
        assert!(!store.remove(&ProductId::new("p1")));
    }

    #[test]
    fn test_writes_stay_in_active_partition() {
        let mut store = IdentityScopedStore::new();
        store.insert(Counted::new("p1", 1));
        store.set_active(IdentityKey::new("alice"));
        store.insert(Counted::new("p2", 1));

        assert_eq!(store.partition(&IdentityKey::guest()).len(), 1);
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].product.as_str(), "p2");
    }

    #[test]
    fn test_merge_appends_guest_items_after_existing() {
        let mut store = IdentityScopedStore::new();
        store.set_active(IdentityKey::new("alice"));
        store.insert(Counted::new("a", 1));
        store.set_active(IdentityKey::guest());
        store.insert(Counted::new("b", 1));
        store.insert(Counted::new("c", 1));

        store.merge_on_login(IdentityKey::new("alice"));

        let ids: Vec<_> = store.items().iter().map(|i| i.product.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_merge_sums_collisions() {
        let mut store = IdentityScopedStore::new();
        store.set_active(IdentityKey::new("alice"));
        store.insert(Counted::new("p1", 3));
        store.set_active(IdentityKey::guest());
        store.insert(Counted::new("p1", 1));

        store.merge_on_login(IdentityKey::new("alice"));

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].count, 4);
    }

    #[test]
    fn test_merge_empties_guest_and_switches_active() {
        let mut store = IdentityScopedStore::new();
        store.insert(Counted::new("p1", 1));
        store.merge_on_login(IdentityKey::new("alice"));

        assert_eq!(store.active().as_str(), "alice");
        assert!(store.partition(&IdentityKey::guest()).is_empty());
    }

    #[test]
    fn test_merge_twice_equals_merge_once() {
        let mut store = IdentityScopedStore::new();
        store.insert(Counted::new("p1", 2));
        store.merge_on_login(IdentityKey::new("alice"));
        let once = store.items().to_vec();

        store.merge_on_login(IdentityKey::new("alice"));
        assert_eq!(store.items(), once);
    }

    #[test]
    fn test_logout_clears_nothing() {
        let mut store = IdentityScopedStore::new();
        store.insert(Counted::new("p1", 2));
        store.merge_on_login(IdentityKey::new("alice"));
        store.reset_on_logout();

        assert!(store.active().is_guest());
        assert!(store.items().is_empty());
        assert_eq!(store.partition(&IdentityKey::new("alice")).len(), 1);
    }

    #[test]
    fn test_snapshot_sorts_partitions() {
        let mut store = IdentityScopedStore::new();
        store.set_active(IdentityKey::new("zoe"));
        store.insert(Counted::new("p1", 1));
        store.set_active(IdentityKey::new("alice"));
        store.insert(Counted::new("p2", 1));

        let snapshot = store.snapshot();
        let keys: Vec<_> = snapshot
            .partitions
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["alice", "zoe"]);
        assert_eq!(snapshot.active_identity.as_str(), "alice");
    }
}
