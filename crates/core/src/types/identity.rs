//! Identity keys for partitioned client state.
//!
//! Cart and favorites state is partitioned per user. The partition
//! discriminator is an [`IdentityKey`]: the reserved `"guest"` key for
//! anonymous visitors, or a key derived from the authenticated account.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The reserved partition key for anonymous visitors.
const GUEST_KEY: &str = "guest";

/// Fallback key for authenticated accounts that expose neither an email
/// nor a stable account ID. Should not occur in practice, but the auth
/// backend does not guarantee either field.
const ANONYMOUS_USER_KEY: &str = "user";

/// String discriminator for per-user state partitions.
///
/// Exactly one identity is active per store at a time; `"guest"` is the
/// reserved default. Keys are compared verbatim - two spellings of the
/// same account are distinct partitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// The guest identity.
    #[must_use]
    pub fn guest() -> Self {
        Self(GUEST_KEY.to_owned())
    }

    /// Create an identity key from a raw string.
    ///
    /// An empty string maps to the guest identity, matching the behavior
    /// of activating "no user".
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        if key.is_empty() {
            Self::guest()
        } else {
            Self(key)
        }
    }

    /// Derive the partition key for an authenticated account.
    ///
    /// Precedence is a product decision pinned here, in one place:
    /// prefer the account email, fall back to the backend UID, and as a
    /// last resort use the fixed `"user"` sentinel. An empty string is
    /// treated as absent - an authenticated account must never derive
    /// the guest key.
    #[must_use]
    pub fn for_user(user: &AuthUser) -> Self {
        user.email
            .as_deref()
            .filter(|email| !email.is_empty())
            .or_else(|| user.uid.as_deref().filter(|uid| !uid.is_empty()))
            .map_or_else(|| Self(ANONYMOUS_USER_KEY.to_owned()), Self::new)
    }

    /// Whether this is the guest identity.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.0 == GUEST_KEY
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IdentityKey {
    fn default() -> Self {
        Self::guest()
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for IdentityKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// The slice of an authenticated account the state layer consumes.
///
/// The auth backend is an external collaborator; this type carries only
/// what identity derivation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable backend account ID.
    pub uid: Option<String>,
    /// Account email, if the provider supplied one.
    pub email: Option<String>,
}

impl AuthUser {
    /// Create an auth user from its raw identity fields.
    #[must_use]
    pub fn new(uid: Option<String>, email: Option<String>) -> Self {
        Self { uid, email }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_maps_to_guest() {
        assert!(IdentityKey::new("").is_guest());
        assert_eq!(IdentityKey::new(""), IdentityKey::guest());
    }

    #[test]
    fn test_default_is_guest() {
        assert!(IdentityKey::default().is_guest());
    }

    #[test]
    fn test_for_user_prefers_email() {
        let user = AuthUser::new(
            Some("uid-1".to_owned()),
            Some("alice@example.com".to_owned()),
        );
        assert_eq!(IdentityKey::for_user(&user).as_str(), "alice@example.com");
    }

    #[test]
    fn test_for_user_falls_back_to_uid() {
        let user = AuthUser::new(Some("uid-1".to_owned()), None);
        assert_eq!(IdentityKey::for_user(&user).as_str(), "uid-1");
    }

    #[test]
    fn test_for_user_sentinel() {
        let user = AuthUser::new(None, None);
        assert_eq!(IdentityKey::for_user(&user).as_str(), "user");
        assert!(!IdentityKey::for_user(&user).is_guest());
    }

    #[test]
    fn test_for_user_empty_email_falls_back_to_uid() {
        let user = AuthUser::new(Some("uid-1".into()), Some(String::new()));
        assert_eq!(IdentityKey::for_user(&user).as_str(), "uid-1");
    }

    #[test]
    fn test_for_user_empty_fields_never_derive_guest() {
        let user = AuthUser::new(Some(String::new()), Some(String::new()));
        let key = IdentityKey::for_user(&user);
        assert_eq!(key.as_str(), "user");
        assert!(!key.is_guest());
    }
}
