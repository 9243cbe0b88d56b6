//! BuyLink admin services - persistence against the Shopify Admin API.
//!
//! # Architecture
//!
//! - [`shopify`] - GraphQL client with hand-written documents and explicit
//!   result types per operation (no generated code; the remote JSON is
//!   parsed defensively and any unexpected shape is a transport error)
//! - [`store`] - the metafield-backed configuration store adapter
//! - [`links`] - load/save/clear orchestration for per-product link config
//! - [`theme`] - the one-shot theme auto-install heuristic
//!
//! The remote store is the single source of truth: there is no local
//! database and no cache, every load re-reads from Shopify.
//!
//! # Example
//!
//! ```rust,ignore
//! use buylink_admin::{config::AppConfig, links::LinkService, shopify::AdminClient, store::ConfigStore};
//! use buylink_core::OwnerId;
//!
//! let config = AppConfig::from_env()?;
//! let client = AdminClient::new(&config.shopify);
//! let service = LinkService::new(ConfigStore::new(client));
//!
//! let existing = service.load(&OwnerId::new("gid://shopify/Product/123")).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod links;
pub mod shopify;
pub mod store;
pub mod theme;
