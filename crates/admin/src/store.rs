//! The configuration store adapter.
//!
//! A thin, uniform read/write/delete surface over the remote namespaced
//! key-value store. Services depend on the [`MetafieldStore`] trait so the
//! remote store can be replaced with an in-memory one in tests.

use buylink_core::{ConfigEntry, OwnerId};

use crate::shopify::{AdminClient, ShopifyError};

/// Owner-scoped access to the remote metafield store.
///
/// Failures propagate unmodified; the adapter never retries.
#[allow(async_fn_in_trait)]
pub trait MetafieldStore {
    /// All entries under `namespace` for `owner_id`; empty when none exist.
    async fn read_all(
        &self,
        owner_id: &OwnerId,
        namespace: &str,
    ) -> Result<Vec<ConfigEntry>, ShopifyError>;

    /// Create or update entries, batched into one remote call per owner.
    ///
    /// Entries carrying a remote `id` update that record; entries without
    /// one create a new record. Returns the stored entries.
    async fn upsert(&self, entries: &[ConfigEntry]) -> Result<Vec<ConfigEntry>, ShopifyError>;

    /// Delete entries by key.
    ///
    /// Must be a no-op success for an empty key set - the remote API
    /// rejects a call with zero identifiers.
    async fn delete_by_keys(
        &self,
        owner_id: &OwnerId,
        namespace: &str,
        keys: &[String],
    ) -> Result<(), ShopifyError>;
}

/// The real adapter over the Admin API.
#[derive(Clone)]
pub struct ConfigStore {
    client: AdminClient,
}

impl ConfigStore {
    /// Wrap an [`AdminClient`].
    #[must_use]
    pub const fn new(client: AdminClient) -> Self {
        Self { client }
    }
}

impl MetafieldStore for ConfigStore {
    async fn read_all(
        &self,
        owner_id: &OwnerId,
        namespace: &str,
    ) -> Result<Vec<ConfigEntry>, ShopifyError> {
        self.client.metafields(owner_id, namespace).await
    }

    async fn upsert(&self, entries: &[ConfigEntry]) -> Result<Vec<ConfigEntry>, ShopifyError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        self.client.set_metafields(entries).await
    }

    async fn delete_by_keys(
        &self,
        owner_id: &OwnerId,
        namespace: &str,
        keys: &[String],
    ) -> Result<(), ShopifyError> {
        if keys.is_empty() {
            return Ok(());
        }
        self.client.delete_metafields(owner_id, namespace, keys).await
    }
}
