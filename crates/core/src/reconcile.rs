//! Diffing a desired configuration against remote metafield state.
//!
//! [`reconcile`] computes the writes and deletes needed to move the store to
//! the desired state for one product. The caller must issue the deletes
//! before the upserts: switching persistence formats reuses keys, and the
//! store enforces `(owner, namespace, key)` uniqueness.

use serde::{Deserialize, Serialize};

use crate::id::OwnerId;
use crate::links::ProductLinkConfig;
use crate::stored::{
    HIDE_ATC_VALUE, KEY_EXTERNAL_LINKS, KEY_HIDE_ATC, NAMESPACE, serialize_links,
};

/// Metafield value types used by this app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// A JSON document.
    #[serde(rename = "json")]
    Json,
    /// A single line of text.
    #[serde(rename = "single_line_text_field")]
    SingleLineText,
}

impl ValueType {
    /// The wire name of the metafield type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::SingleLineText => "single_line_text_field",
        }
    }
}

/// One remote metafield, abstracted.
///
/// `id` is present only for entries that already exist remotely; an upsert
/// carrying it updates in place, one without it creates a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub owner_id: OwnerId,
    pub namespace: String,
    pub key: String,
    pub value: String,
    pub value_type: ValueType,
    pub id: Option<String>,
}

/// The remote operations needed to reach a desired configuration.
///
/// Deletes must complete (or fail) before any upsert is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Keys under the link namespace to delete, in existing-entry order.
    pub to_delete: Vec<String>,
    /// Entries to create or update, ids attached where the key already exists.
    pub to_upsert: Vec<ConfigEntry>,
}

impl ReconcilePlan {
    /// True when the plan requires no remote calls at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_upsert.is_empty()
    }
}

/// Compute the minimal plan moving `existing` to the state `desired` describes.
///
/// The target key set always includes `external_links` - an empty array is a
/// valid, meaningful state distinct from "no configuration", and presence of
/// any metafield is the signal that a product is managed by this app. The
/// `hide_atc` key is targeted only while the flag is on. Every existing key
/// outside the target set (a stale `hide_atc`, the legacy single-link keys)
/// is scheduled for deletion.
///
/// # Errors
///
/// Returns a serialization error if the link list cannot be encoded
/// (practically unreachable).
pub fn reconcile(
    existing: &[ConfigEntry],
    desired: &ProductLinkConfig,
) -> Result<ReconcilePlan, serde_json::Error> {
    let remote_id = |key: &str| {
        existing
            .iter()
            .find(|e| e.key == key)
            .and_then(|e| e.id.clone())
    };

    let mut to_upsert = vec![ConfigEntry {
        owner_id: desired.owner_id.clone(),
        namespace: NAMESPACE.to_string(),
        key: KEY_EXTERNAL_LINKS.to_string(),
        value: serialize_links(&desired.links)?,
        value_type: ValueType::Json,
        id: remote_id(KEY_EXTERNAL_LINKS),
    }];
    if desired.hide_add_to_cart {
        to_upsert.push(ConfigEntry {
            owner_id: desired.owner_id.clone(),
            namespace: NAMESPACE.to_string(),
            key: KEY_HIDE_ATC.to_string(),
            value: HIDE_ATC_VALUE.to_string(),
            value_type: ValueType::SingleLineText,
            id: remote_id(KEY_HIDE_ATC),
        });
    }

    let to_delete = existing
        .iter()
        .filter(|e| !to_upsert.iter().any(|t| t.key == e.key))
        .map(|e| e.key.clone())
        .collect();

    Ok(ReconcilePlan {
        to_delete,
        to_upsert,
    })
}
