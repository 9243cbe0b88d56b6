//! Newtype wrapper for owner identifiers.
//!
//! Metafields are scoped to an owner: a product, or the app installation
//! itself for the auto-install sentinel. Owners are addressed by opaque
//! Shopify GIDs (e.g. `gid://shopify/Product/123`), so the wrapper holds a
//! string rather than a numeric id.

use serde::{Deserialize, Serialize};

/// A type-safe owner identifier (product or app-installation GID).
///
/// # Example
///
/// ```rust
/// use buylink_core::OwnerId;
///
/// let owner = OwnerId::new("gid://shopify/Product/123");
/// assert_eq!(owner.as_str(), "gid://shopify/Product/123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create a new owner id from a GID string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying GID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the id is empty after trimming (rejected before any remote call).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl core::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}
