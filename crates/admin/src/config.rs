//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token (HIGH PRIVILEGE)
//! - `BUYLINK_EXTENSION_UUID` - theme app extension uuid (used in generated
//!   app-block types)
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2026-01";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Shopify Admin API configuration
    pub shopify: ShopifyConfig,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the HIGH PRIVILEGE access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2026-01)
    pub api_version: String,
    /// Admin API access token (HIGH PRIVILEGE - full metafield/theme access)
    pub access_token: SecretString,
    /// Theme app extension uuid, part of every generated app-block type
    pub extension_uuid: String,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("extension_uuid", &self.extension_uuid)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or fails
    /// validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            shopify: ShopifyConfig::from_env()?,
        })
    }
}

impl ShopifyConfig {
    /// Load the Shopify section from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or fails
    /// validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store = require("SHOPIFY_STORE")?;
        if !store.contains('.') {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_STORE".to_string(),
                "expected a store domain like your-store.myshopify.com".to_string(),
            ));
        }

        let access_token = require("SHOPIFY_ACCESS_TOKEN")?;
        let extension_uuid = require("BUYLINK_EXTENSION_UUID")?;
        let api_version = std::env::var("SHOPIFY_API_VERSION")
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        Ok(Self {
            store,
            api_version,
            access_token: SecretString::from(access_token),
            extension_uuid,
        })
    }

    /// The app-block type written into patched templates.
    ///
    /// Shopify resolves `shopify://apps/<handle>/blocks/<block>/<uuid>` to
    /// the theme app extension block.
    #[must_use]
    pub fn app_block_type(&self) -> String {
        format!(
            "shopify://apps/buylink/blocks/external-links/{}",
            self.extension_uuid
        )
    }

    /// Expose the access token for request headers.
    #[must_use]
    pub fn token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

fn require(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_access_token() {
        let config = ShopifyConfig {
            store: "test.myshopify.com".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: SecretString::from("shpat_super_secret"),
            extension_uuid: "0000-1111".to_string(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("shpat_super_secret"));
    }

    #[test]
    fn test_app_block_type_embeds_extension_uuid() {
        let config = ShopifyConfig {
            store: "test.myshopify.com".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: SecretString::from("shpat_x"),
            extension_uuid: "abc-123".to_string(),
        };
        assert_eq!(
            config.app_block_type(),
            "shopify://apps/buylink/blocks/external-links/abc-123"
        );
    }
}
