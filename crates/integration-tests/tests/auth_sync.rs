//! Coordinated auth transitions across both stores.
//!
//! The coordinator must apply each auth-state change exactly once, drive
//! cart and favorites together, and derive partition keys through the
//! single pinned precedence.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use lavka_core::{AuthUser, IdentityKey, ProductId};
use lavka_integration_tests::{cart_line, fresh_stores};
use lavka_store::{AppStores, AuthSync, MemoryStorage, Storage};

fn user(uid: Option<&str>, email: Option<&str>) -> AuthUser {
    AuthUser::new(uid.map(str::to_owned), email.map(str::to_owned))
}

/// Login drives both stores to the same identity in one call.
#[test]
fn test_login_transitions_both_stores() {
    let mut stores = fresh_stores();
    stores.cart_mut().add(cart_line("p1", 1, 100));
    stores.favorites_mut().toggle(ProductId::new("p2"));

    let mut sync = AuthSync::new();
    sync.on_auth_change(&mut stores, Some(&user(None, Some("alice@example.com"))));

    assert_eq!(stores.cart().active_identity().as_str(), "alice@example.com");
    assert_eq!(
        stores.favorites().active_identity().as_str(),
        "alice@example.com"
    );
    assert_eq!(stores.cart().items().len(), 1);
    assert!(stores.favorites().contains(&ProductId::new("p2")));
}

/// Duplicate login notifications for the same identity are skipped; the
/// merge runs once and nothing double-counts.
#[test]
fn test_duplicate_notifications_do_not_remerge() {
    let mut stores = fresh_stores();
    stores.cart_mut().add(cart_line("p1", 2, 100));

    let mut sync = AuthSync::new();
    let alice = user(None, Some("alice@example.com"));
    sync.on_auth_change(&mut stores, Some(&alice));
    sync.on_auth_change(&mut stores, Some(&alice));
    sync.on_auth_change(&mut stores, Some(&alice));

    assert_eq!(stores.cart().total_items(), 2);
    assert_eq!(
        sync.last_applied().map(IdentityKey::as_str),
        Some("alice@example.com")
    );
}

/// Even without the coordinator's guard, a second merge is harmless
/// because it finds an empty guest partition.
#[test]
fn test_raw_double_merge_is_harmless() {
    let mut stores = fresh_stores();
    stores.cart_mut().add(cart_line("p1", 2, 100));

    let alice = IdentityKey::new("alice");
    stores.sync_login(&alice);
    stores.sync_login(&alice);

    assert_eq!(stores.cart().total_items(), 2);
}

/// Repeated signed-out notifications are also deduplicated.
#[test]
fn test_duplicate_logout_notifications() {
    let mut stores = fresh_stores();
    let mut sync = AuthSync::new();

    sync.on_auth_change(&mut stores, Some(&user(Some("uid-7"), None)));
    sync.on_auth_change(&mut stores, None);
    sync.on_auth_change(&mut stores, None);

    assert!(stores.cart().active_identity().is_guest());
    assert!(sync.last_applied().is_some_and(IdentityKey::is_guest));
}

/// Identity derivation: email wins, uid is the fallback, then the fixed
/// sentinel.
#[test]
fn test_identity_precedence() {
    let mut stores = fresh_stores();
    let mut sync = AuthSync::new();

    sync.on_auth_change(
        &mut stores,
        Some(&user(Some("uid-1"), Some("a@example.com"))),
    );
    assert_eq!(stores.cart().active_identity().as_str(), "a@example.com");

    sync.on_auth_change(&mut stores, None);
    sync.on_auth_change(&mut stores, Some(&user(Some("uid-1"), None)));
    assert_eq!(stores.cart().active_identity().as_str(), "uid-1");

    sync.on_auth_change(&mut stores, None);
    sync.on_auth_change(&mut stores, Some(&user(None, None)));
    assert_eq!(stores.cart().active_identity().as_str(), "user");
}

/// Account switching on a shared device: each account keeps its own
/// partition, and guest state only ever merges into the account that was
/// logged into while it existed.
#[test]
fn test_two_accounts_on_one_device() {
    let mut stores = fresh_stores();
    let mut sync = AuthSync::new();

    stores.cart_mut().add(cart_line("shared", 1, 100));
    sync.on_auth_change(&mut stores, Some(&user(None, Some("alice@example.com"))));
    stores.cart_mut().add(cart_line("alice-only", 1, 100));

    sync.on_auth_change(&mut stores, None);
    sync.on_auth_change(&mut stores, Some(&user(None, Some("bob@example.com"))));

    // Bob sees none of Alice's items; the shared guest line went to Alice.
    assert!(stores.cart().items().is_empty());

    sync.on_auth_change(&mut stores, None);
    sync.on_auth_change(&mut stores, Some(&user(None, Some("alice@example.com"))));
    assert_eq!(stores.cart().items().len(), 2);
}

/// A session that restores a signed-in identity from disk must still
/// honour an initial signed-out notification: the stores return to
/// guest instead of keeping the stale account active.
#[test]
fn test_signed_out_after_restart_returns_to_guest() {
    let storage = Arc::new(MemoryStorage::new());
    {
        let mut stores = AppStores::with_storage(Arc::clone(&storage) as Arc<dyn Storage>);
        let mut sync = AuthSync::new();
        sync.on_auth_change(&mut stores, Some(&user(None, Some("alice@example.com"))));
        stores.cart_mut().add(cart_line("alice-item", 1, 100));
    }

    let mut stores = AppStores::with_storage(storage);
    let mut sync = AuthSync::new();
    sync.on_auth_change(&mut stores, None);

    assert!(stores.cart().active_identity().is_guest());
    assert!(stores.favorites().active_identity().is_guest());

    // New guest activity lands in the guest partition, not Alice's.
    stores.cart_mut().add(cart_line("guest-item", 1, 100));
    assert_eq!(stores.cart().items().len(), 1);
    let alice = IdentityKey::new("alice@example.com");
    assert_eq!(stores.cart().partition(&alice).len(), 1);
}

/// A provider may report an authenticated user with an empty email
/// string. That user must merge under their uid, never be routed to the
/// guest/logout path.
#[test]
fn test_empty_email_signin_merges_under_uid() {
    let mut stores = fresh_stores();
    stores.cart_mut().add(cart_line("p1", 2, 100));

    let mut sync = AuthSync::new();
    sync.on_auth_change(&mut stores, Some(&user(Some("uid-1"), Some(""))));

    assert_eq!(stores.cart().active_identity().as_str(), "uid-1");
    assert!(!stores.cart().active_identity().is_guest());
    assert_eq!(stores.cart().total_items(), 2);
}
