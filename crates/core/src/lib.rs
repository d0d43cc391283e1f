//! Lavka Core - Shared types library.
//!
//! This crate provides common types used across all Lavka components:
//! - `store` - Identity-scoped client state (cart, favorites, catalog)
//! - `cli` - Command-line tools for inspecting and migrating persisted state
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! clients for the hosted backend. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, identity keys, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
