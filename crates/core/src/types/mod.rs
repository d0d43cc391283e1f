//! Core types for Lavka.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod identity;
pub mod price;

pub use id::*;
pub use identity::{AuthUser, IdentityKey};
pub use price::{CurrencyCode, Price, PriceError};
