//! Load/save/clear orchestration for per-product link configuration.
//!
//! Every operation is one sequential pass: read current state, compute the
//! plan, apply it. Deletes always complete before upserts so a format
//! switch never collides on `(owner, namespace, key)` uniqueness. There is
//! no optimistic-concurrency token: concurrent saves are last-write-wins,
//! an accepted limitation.

use thiserror::Error;
use tracing::{debug, instrument};

use buylink_core::stored::{self, NAMESPACE};
use buylink_core::{OwnerId, ProductLinkConfig, reconcile};

use crate::shopify::ShopifyError;
use crate::store::MetafieldStore;

/// Errors surfaced by the link service.
///
/// Each variant renders to a single human-readable message; the UI shows it
/// verbatim and the user retries manually. No partial-state rollback is
/// attempted - the remote store may be left partially updated on failure.
#[derive(Debug, Error)]
pub enum LinkServiceError {
    /// Rejected locally before any remote call.
    #[error("Missing product identifier")]
    MissingOwner,

    /// Remote transport, auth, or validation failure, propagated verbatim.
    #[error(transparent)]
    Store(#[from] ShopifyError),

    /// A stored value failed to parse on load.
    #[error(transparent)]
    Stored(#[from] stored::StoredConfigError),

    /// The desired configuration failed to serialize.
    #[error("Could not encode link configuration: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Service over a [`MetafieldStore`] implementation.
#[derive(Clone)]
pub struct LinkService<S> {
    store: S,
}

impl<S: MetafieldStore> LinkService<S> {
    /// Wrap a store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the persisted configuration for a product.
    ///
    /// Returns `None` when the product carries no configuration at all;
    /// a configuration with zero links is a distinct, valid state. The
    /// deprecated single-link shape is resolved transparently.
    ///
    /// # Errors
    ///
    /// Returns [`LinkServiceError`] on remote failure or a corrupt stored
    /// value.
    #[instrument(skip(self), fields(owner = %owner_id))]
    pub async fn load(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<ProductLinkConfig>, LinkServiceError> {
        if owner_id.is_blank() {
            return Err(LinkServiceError::MissingOwner);
        }

        let entries = self.store.read_all(owner_id, NAMESPACE).await?;
        Ok(stored::resolve_config(owner_id, &entries)?)
    }

    /// Persist a configuration, reconciling against current remote state.
    ///
    /// Stale keys (a turned-off `hide_atc`, the legacy single-link keys)
    /// are deleted first, then the target entries are written in one
    /// batched call. Any failure aborts the remaining steps and surfaces
    /// one message.
    ///
    /// # Errors
    ///
    /// Returns [`LinkServiceError`] on validation or remote failure.
    #[instrument(skip(self, desired), fields(owner = %desired.owner_id))]
    pub async fn save(&self, desired: &ProductLinkConfig) -> Result<(), LinkServiceError> {
        if desired.owner_id.is_blank() {
            return Err(LinkServiceError::MissingOwner);
        }

        let existing = self.store.read_all(&desired.owner_id, NAMESPACE).await?;
        let plan = reconcile(&existing, desired)?;
        debug!(
            deletes = plan.to_delete.len(),
            upserts = plan.to_upsert.len(),
            "applying reconcile plan"
        );

        // Deletes strictly before upserts.
        self.store
            .delete_by_keys(&desired.owner_id, NAMESPACE, &plan.to_delete)
            .await?;
        self.store.upsert(&plan.to_upsert).await?;

        Ok(())
    }

    /// Remove every entry for a product.
    ///
    /// A subsequent [`load`](Self::load) returns `None` ("not configured"),
    /// not an empty-array configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LinkServiceError`] on validation or remote failure.
    #[instrument(skip(self), fields(owner = %owner_id))]
    pub async fn clear(&self, owner_id: &OwnerId) -> Result<(), LinkServiceError> {
        if owner_id.is_blank() {
            return Err(LinkServiceError::MissingOwner);
        }

        let existing = self.store.read_all(owner_id, NAMESPACE).await?;
        let keys: Vec<String> = existing.into_iter().map(|e| e.key).collect();
        self.store.delete_by_keys(owner_id, NAMESPACE, &keys).await
            .map_err(LinkServiceError::from)
    }
}

/// Whether an edited configuration needs saving.
///
/// Compares normalized forms only: a blank placeholder row in the editor
/// never makes the configuration dirty on its own.
#[must_use]
pub fn is_dirty(saved: Option<&ProductLinkConfig>, edited: &ProductLinkConfig) -> bool {
    match saved {
        Some(saved) => !saved.is_same_as(edited),
        None => !edited.is_same_as(&ProductLinkConfig::new(edited.owner_id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buylink_core::ExternalLink;

    fn owner() -> OwnerId {
        OwnerId::new("gid://shopify/Product/1")
    }

    #[test]
    fn test_unsaved_blank_rows_are_not_dirty() {
        let edited = ProductLinkConfig {
            owner_id: owner(),
            links: vec![ExternalLink::default(), ExternalLink::default()],
            hide_add_to_cart: false,
        };
        assert!(!is_dirty(None, &edited));
    }

    #[test]
    fn test_unsaved_real_link_is_dirty() {
        let edited = ProductLinkConfig {
            owner_id: owner(),
            links: vec![ExternalLink::new("https://a.com", "A")],
            hide_add_to_cart: false,
        };
        assert!(is_dirty(None, &edited));
    }

    #[test]
    fn test_hide_flag_alone_is_dirty() {
        let edited = ProductLinkConfig {
            owner_id: owner(),
            links: Vec::new(),
            hide_add_to_cart: true,
        };
        assert!(is_dirty(None, &edited));
    }

    #[test]
    fn test_saved_config_with_added_blank_row_is_clean() {
        let saved = ProductLinkConfig {
            owner_id: owner(),
            links: vec![ExternalLink::new("https://a.com", "A")],
            hide_add_to_cart: true,
        };
        let mut edited = saved.clone();
        edited.links.push(ExternalLink::default());
        assert!(!is_dirty(Some(&saved), &edited));
    }
}
