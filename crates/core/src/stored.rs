//! Persisted metafield shapes.
//!
//! The canonical form stores the whole link list as one JSON array under the
//! `external_links` key. Older installs may still carry the deprecated
//! single-link shape (`external_url` / `button_text` / `is_enabled` as three
//! separate keys); that form is read as a fallback and never written.

use thiserror::Error;

use crate::id::OwnerId;
use crate::links::{ExternalLink, ProductLinkConfig, normalize};
use crate::reconcile::ConfigEntry;

/// Namespace holding all per-product link configuration.
pub const NAMESPACE: &str = "bl_custom_button";

/// Key for the canonical JSON array of links.
pub const KEY_EXTERNAL_LINKS: &str = "external_links";

/// Key for the hide-add-to-cart flag (present iff the flag is on).
pub const KEY_HIDE_ATC: &str = "hide_atc";

/// Value stored under [`KEY_HIDE_ATC`].
pub const HIDE_ATC_VALUE: &str = "true";

/// Deprecated single-link keys, read-only.
pub const LEGACY_KEY_URL: &str = "external_url";
pub const LEGACY_KEY_TEXT: &str = "button_text";
pub const LEGACY_KEY_ENABLED: &str = "is_enabled";

/// Namespace and key of the one-shot auto-install sentinel.
pub const SENTINEL_NAMESPACE: &str = "auto_install";
pub const SENTINEL_KEY: &str = "block_installed";

/// Errors reading a stored configuration back.
#[derive(Debug, Error)]
pub enum StoredConfigError {
    /// The JSON value under a key did not parse as the expected shape.
    #[error("invalid JSON in `{key}` metafield: {source}")]
    InvalidJson {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialize links to the canonical persisted JSON array.
///
/// Normalization is applied here so a blank editor row can never reach the
/// store: `parse_links(serialize_links(l)?)? == normalize(l)`.
///
/// # Errors
///
/// Returns a serialization error (practically unreachable for these types).
pub fn serialize_links(links: &[ExternalLink]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&normalize(links))
}

/// Parse the canonical persisted JSON array.
///
/// # Errors
///
/// Returns the underlying JSON error on malformed input.
pub fn parse_links(value: &str) -> Result<Vec<ExternalLink>, serde_json::Error> {
    serde_json::from_str(value)
}

/// Which historical persistence shape a set of entries carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredForm {
    /// The canonical `external_links` JSON array.
    Array(Vec<ExternalLink>),
    /// The deprecated three-key single-link shape.
    Legacy(ExternalLink),
}

impl StoredForm {
    /// Classify the entries under [`NAMESPACE`] for one owner.
    ///
    /// The array key wins when both forms are present. Returns `None` when
    /// neither form exists (the owner may still carry a bare `hide_atc`).
    ///
    /// # Errors
    ///
    /// Returns [`StoredConfigError::InvalidJson`] when the array value is
    /// not valid JSON.
    pub fn classify(entries: &[ConfigEntry]) -> Result<Option<Self>, StoredConfigError> {
        if let Some(entry) = entries.iter().find(|e| e.key == KEY_EXTERNAL_LINKS) {
            let links = parse_links(&entry.value).map_err(|source| {
                StoredConfigError::InvalidJson {
                    key: KEY_EXTERNAL_LINKS,
                    source,
                }
            })?;
            return Ok(Some(Self::Array(links)));
        }

        let find = |key: &str| entries.iter().find(|e| e.key == key).map(|e| e.value.as_str());
        if let Some(url) = find(LEGACY_KEY_URL) {
            return Ok(Some(Self::Legacy(ExternalLink {
                url: url.to_string(),
                text: find(LEGACY_KEY_TEXT).unwrap_or_default().to_string(),
                enabled: find(LEGACY_KEY_ENABLED) != Some("false"),
            })));
        }

        Ok(None)
    }

    /// Resolve either form into the canonical ordered link list.
    #[must_use]
    pub fn into_links(self) -> Vec<ExternalLink> {
        match self {
            Self::Array(links) => links,
            Self::Legacy(link) => vec![link],
        }
    }
}

/// Materialize a [`ProductLinkConfig`] from the entries stored for an owner.
///
/// Returns `None` when the owner carries no entries at all ("never
/// configured") - distinct from a configuration whose link list is empty.
///
/// # Errors
///
/// Returns [`StoredConfigError`] when a stored value fails to parse.
pub fn resolve_config(
    owner_id: &OwnerId,
    entries: &[ConfigEntry],
) -> Result<Option<ProductLinkConfig>, StoredConfigError> {
    if entries.is_empty() {
        return Ok(None);
    }

    let links = StoredForm::classify(entries)?
        .map(StoredForm::into_links)
        .unwrap_or_default();
    let hide_add_to_cart = entries
        .iter()
        .any(|e| e.key == KEY_HIDE_ATC && e.value == HIDE_ATC_VALUE);

    Ok(Some(ProductLinkConfig {
        owner_id: owner_id.clone(),
        links,
        hide_add_to_cart,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ValueType;

    fn owner() -> OwnerId {
        OwnerId::new("gid://shopify/Product/1")
    }

    fn entry(key: &str, value: &str) -> ConfigEntry {
        ConfigEntry {
            owner_id: owner(),
            namespace: NAMESPACE.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            value_type: ValueType::SingleLineText,
            id: Some(format!("gid://shopify/Metafield/{key}")),
        }
    }

    #[test]
    fn test_serialize_normalizes_before_writing() {
        let links = vec![
            ExternalLink::new("https://a.com", "A"),
            ExternalLink::default(),
        ];
        let json = serialize_links(&links).unwrap();
        let parsed = parse_links(&json).unwrap();
        assert_eq!(parsed, normalize(&links));
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_roundtrip_preserves_order_and_fields() {
        let links = vec![
            ExternalLink {
                url: "https://a.com".to_string(),
                text: "A".to_string(),
                enabled: true,
            },
            ExternalLink {
                url: "https://c.com".to_string(),
                text: "C".to_string(),
                enabled: false,
            },
        ];
        let parsed = parse_links(&serialize_links(&links).unwrap()).unwrap();
        assert_eq!(parsed, links);
    }

    #[test]
    fn test_classify_prefers_array_form() {
        let entries = vec![
            entry(KEY_EXTERNAL_LINKS, r#"[{"url":"https://a.com","text":"A","enabled":true}]"#),
            entry(LEGACY_KEY_URL, "https://legacy.example"),
        ];
        let form = StoredForm::classify(&entries).unwrap().unwrap();
        assert!(matches!(form, StoredForm::Array(ref l) if l.len() == 1));
    }

    #[test]
    fn test_legacy_fallback_reconstructs_single_link() {
        let entries = vec![
            entry(LEGACY_KEY_URL, "https://legacy.example"),
            entry(LEGACY_KEY_TEXT, "Buy elsewhere"),
            entry(LEGACY_KEY_ENABLED, "true"),
        ];
        let config = resolve_config(&owner(), &entries).unwrap().unwrap();
        assert_eq!(config.links.len(), 1);
        assert_eq!(config.links[0].url, "https://legacy.example");
        assert_eq!(config.links[0].text, "Buy elsewhere");
        assert!(config.links[0].enabled);
        assert!(!config.hide_add_to_cart);
    }

    #[test]
    fn test_legacy_enabled_defaults_true_when_key_missing() {
        let entries = vec![entry(LEGACY_KEY_URL, "https://legacy.example")];
        let config = resolve_config(&owner(), &entries).unwrap().unwrap();
        assert!(config.links[0].enabled);
        assert_eq!(config.links[0].text, "");
    }

    #[test]
    fn test_no_entries_means_not_configured() {
        assert!(resolve_config(&owner(), &[]).unwrap().is_none());
    }

    #[test]
    fn test_empty_array_is_configured_but_empty() {
        let entries = vec![entry(KEY_EXTERNAL_LINKS, "[]")];
        let config = resolve_config(&owner(), &entries).unwrap().unwrap();
        assert!(config.links.is_empty());
    }

    #[test]
    fn test_hide_flag_read_from_entries() {
        let entries = vec![
            entry(KEY_EXTERNAL_LINKS, "[]"),
            entry(KEY_HIDE_ATC, HIDE_ATC_VALUE),
        ];
        let config = resolve_config(&owner(), &entries).unwrap().unwrap();
        assert!(config.hide_add_to_cart);
    }

    #[test]
    fn test_corrupt_array_value_is_an_error() {
        let entries = vec![entry(KEY_EXTERNAL_LINKS, "{not json")];
        let err = resolve_config(&owner(), &entries).unwrap_err();
        assert!(err.to_string().contains(KEY_EXTERNAL_LINKS));
    }
}
