//! BuyLink Core - Shared types and reconciliation logic.
//!
//! This crate provides the pieces common to the admin and storefront sides:
//! - [`links`] - The external-link record model and its normalization rules
//! - [`id`] - Newtype wrapper for owner identifiers (product / app GIDs)
//! - [`stored`] - Persisted metafield shapes, including the legacy fallback
//! - [`reconcile`] - Diffing a desired configuration against remote state
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Everything here can be exercised without a Shopify store, which
//! is where the bulk of the test coverage lives.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod id;
pub mod links;
pub mod reconcile;
pub mod stored;

pub use id::OwnerId;
pub use links::{ExternalLink, ProductLinkConfig, normalize};
pub use reconcile::{ConfigEntry, ReconcilePlan, ValueType, reconcile};
pub use stored::{StoredConfigError, StoredForm, parse_links, resolve_config, serialize_links};
