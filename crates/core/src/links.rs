//! The external-link record model.
//!
//! One [`ExternalLink`] describes one configurable storefront button. A
//! product carries an ordered list of them plus a flag that hides the native
//! add-to-cart control. A record with a blank `url` is an editor placeholder
//! row: it is never persisted and never rendered.

use serde::{Deserialize, Serialize};

use crate::id::OwnerId;

/// One configurable external button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    /// Destination URL. Blank means "incomplete", excluded from persistence.
    #[serde(default)]
    pub url: String,
    /// Button label. May be empty; the renderer falls back to a default.
    #[serde(default)]
    pub text: String,
    /// Whether the button is shown. Defaults to true when absent.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl ExternalLink {
    /// Create a new enabled link.
    #[must_use]
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            enabled: true,
        }
    }

    /// True iff the trimmed `url` is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.url.trim().is_empty()
    }
}

impl Default for ExternalLink {
    fn default() -> Self {
        Self {
            url: String::new(),
            text: String::new(),
            enabled: true,
        }
    }
}

/// Drop blank-url entries, preserving order and all other fields.
///
/// Applied before every persistence operation. Idempotent: normalizing an
/// already-normalized list is a no-op.
#[must_use]
pub fn normalize(links: &[ExternalLink]) -> Vec<ExternalLink> {
    links.iter().filter(|l| !l.is_blank()).cloned().collect()
}

/// The full editable configuration for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLinkConfig {
    /// The owning product.
    pub owner_id: OwnerId,
    /// Display-ordered link records (may include blank placeholder rows).
    pub links: Vec<ExternalLink>,
    /// Hide the native add-to-cart control on the product page.
    pub hide_add_to_cart: bool,
}

impl ProductLinkConfig {
    /// Create an empty configuration for a product.
    #[must_use]
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            links: Vec::new(),
            hide_add_to_cart: false,
        }
    }

    /// The configuration as it would be persisted: blank rows dropped.
    #[must_use]
    pub fn normalized_links(&self) -> Vec<ExternalLink> {
        normalize(&self.links)
    }

    /// Dirty-check equality.
    ///
    /// Two configurations are the same iff `hide_add_to_cart` matches and
    /// the *normalized* link sequences are pairwise equal in order and
    /// count. Blank placeholder rows are invisible to this check, so a lone
    /// empty editor row never prompts a save.
    #[must_use]
    pub fn is_same_as(&self, other: &Self) -> bool {
        self.hide_add_to_cart == other.hide_add_to_cart
            && self.normalized_links() == other.normalized_links()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str, text: &str, enabled: bool) -> ExternalLink {
        ExternalLink {
            url: url.to_string(),
            text: text.to_string(),
            enabled,
        }
    }

    #[test]
    fn test_blank_detection_trims_whitespace() {
        assert!(link("", "A", true).is_blank());
        assert!(link("  \t", "A", true).is_blank());
        assert!(!link("https://a.com", "", false).is_blank());
    }

    #[test]
    fn test_normalize_drops_blank_rows_only() {
        let links = vec![
            link("https://a.com", "A", true),
            link("", "B", true),
            link("https://c.com", "C", false),
        ];
        let normalized = normalize(&links);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].text, "A");
        assert_eq!(normalized[1].text, "C");
        assert!(!normalized[1].enabled, "other fields must not be touched");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let links = vec![
            link("https://a.com", "A", true),
            link(" ", "B", true),
            link("https://c.com", "", true),
        ];
        let once = normalize(&links);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_output_has_no_blank_urls() {
        let links = vec![link("", "", true), link("  ", "x", false)];
        assert!(normalize(&links).iter().all(|l| !l.is_blank()));
    }

    #[test]
    fn test_enabled_defaults_true_when_absent() {
        let parsed: ExternalLink =
            serde_json::from_str(r#"{"url":"https://a.com","text":"A"}"#).unwrap();
        assert!(parsed.enabled);
    }

    #[test]
    fn test_dirty_check_ignores_blank_placeholder_rows() {
        let owner = OwnerId::new("gid://shopify/Product/1");
        let saved = ProductLinkConfig {
            owner_id: owner.clone(),
            links: vec![link("https://a.com", "A", true)],
            hide_add_to_cart: false,
        };
        let edited = ProductLinkConfig {
            owner_id: owner,
            links: vec![link("https://a.com", "A", true), ExternalLink::default()],
            hide_add_to_cart: false,
        };
        assert!(saved.is_same_as(&edited));
    }

    #[test]
    fn test_dirty_check_sees_flag_and_field_changes() {
        let owner = OwnerId::new("gid://shopify/Product/1");
        let a = ProductLinkConfig {
            owner_id: owner.clone(),
            links: vec![link("https://a.com", "A", true)],
            hide_add_to_cart: false,
        };
        let mut flag_flipped = a.clone();
        flag_flipped.hide_add_to_cart = true;
        assert!(!a.is_same_as(&flag_flipped));

        let mut text_changed = a.clone();
        text_changed.links[0].text = "B".to_string();
        assert!(!a.is_same_as(&text_changed));

        let mut disabled = a.clone();
        disabled.links[0].enabled = false;
        assert!(!a.is_same_as(&disabled));
    }

    #[test]
    fn test_dirty_check_is_order_sensitive() {
        let owner = OwnerId::new("gid://shopify/Product/1");
        let a = ProductLinkConfig {
            owner_id: owner.clone(),
            links: vec![link("https://a.com", "A", true), link("https://b.com", "B", true)],
            hide_add_to_cart: false,
        };
        let reversed = ProductLinkConfig {
            owner_id: owner,
            links: vec![link("https://b.com", "B", true), link("https://a.com", "A", true)],
            hide_add_to_cart: false,
        };
        assert!(!a.is_same_as(&reversed));
    }
}
