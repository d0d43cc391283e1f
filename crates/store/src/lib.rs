//! Lavka Store - identity-scoped client state.
//!
//! The storefront keeps two pieces of state on the device: the shopping
//! cart and the favorites list. Both are partitioned per user identity so
//! that a guest can fill a cart, sign in, and keep everything - and so
//! that two accounts on the same device never see each other's items.
//!
//! # Modules
//!
//! - [`scoped`] - The generic partitioned store and its merge-on-login rules
//! - [`cart`] - Cart lines and the [`cart::CartStore`] instance
//! - [`favorites`] - Favorite products and the [`favorites::FavoritesStore`] instance
//! - [`sync`] - [`sync::AppStores`] and the auth-transition coordinator
//! - [`persist`] - Durable storage backends and versioned schema migration
//! - [`catalog`] - In-memory product filtering and sorting
//! - [`config`] - Environment-driven configuration
//!
//! # Identity transitions
//!
//! On login the guest partition is merged into the account's partition
//! exactly once (quantities summed for the cart, set union for favorites)
//! and then emptied. On logout the active identity simply flips back to
//! guest; nothing is cleared, so a later login finds the account's state
//! untouched.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod persist;
pub mod scoped;
pub mod sync;

pub use cart::{CartLine, CartStore};
pub use catalog::{Product, ProductFilter, SortKey, SortOrder};
pub use config::{ConfigError, StoreConfig};
pub use favorites::{FavoriteEntry, FavoritesStore};
pub use persist::{FileStorage, MemoryStorage, PersistedState, Storage, StorageError};
pub use scoped::{IdentityScopedStore, PartitionItem, StoreSnapshot};
pub use sync::{AppStores, AuthSync};
