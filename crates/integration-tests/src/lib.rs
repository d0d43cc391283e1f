//! Integration tests for Lavka.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lavka-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `merge_scenarios` - Merge-on-login behavior across identities
//! - `persistence` - Record round trips, schema upgrades, corrupt data
//! - `auth_sync` - Coordinated transitions of both stores

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use lavka_core::{CurrencyCode, Price, ProductId};
use lavka_store::persist::MemoryStorage;
use lavka_store::{AppStores, CartLine};
use rust_decimal::Decimal;

/// Open both stores against a fresh in-memory backend.
#[must_use]
pub fn fresh_stores() -> AppStores {
    AppStores::with_storage(Arc::new(MemoryStorage::new()))
}

/// Build a cart line with a whole-ruble price.
///
/// # Panics
///
/// Panics if `amount` is negative.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn cart_line(id: &str, quantity: u32, amount: i64) -> CartLine {
    CartLine::new(
        ProductId::new(id),
        format!("Product {id}"),
        Price::new(Decimal::from(amount), CurrencyCode::RUB).unwrap(),
        quantity,
    )
}
