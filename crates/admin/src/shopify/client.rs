//! The Admin API HTTP client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;

use buylink_core::stored::{KEY_EXTERNAL_LINKS, NAMESPACE};
use buylink_core::{ConfigEntry, OwnerId};

use crate::config::ShopifyConfig;

use super::operations::{
    self, CurrentAppInstallationData, MainThemeData, MetafieldsDeleteData, MetafieldsSetData,
    OwnerMetafieldsData, ProductsWithLinksData, Theme, ThemeFile, ThemeFilesUpsertData,
    ThemeProductTemplatesData, ensure_no_user_errors,
};
use super::{GraphQLError, ShopifyError};

/// Metafields per namespace are a handful; one page always suffices.
const METAFIELD_PAGE_SIZE: i64 = 50;

/// Page size for the configured-products scan.
const PRODUCT_SCAN_PAGE_SIZE: i64 = 100;

/// Theme file pages (a theme rarely has more than a few product templates).
const THEME_FILE_PAGE_SIZE: i64 = 20;

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

/// GraphQL response envelope.
#[derive(Debug, serde::Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, serde::Deserialize)]
struct GraphQLErrorResponse {
    message: String,
}

impl AdminClient {
    /// Create a new Admin API client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        let endpoint = format!(
            "https://{}/admin/api/{}/graphql.json",
            config.store, config.api_version
        );

        Self {
            inner: Arc::new(AdminClientInner {
                client: reqwest::Client::new(),
                endpoint,
                access_token: config.token().to_string(),
            }),
        }
    }

    /// Execute one GraphQL operation.
    async fn execute<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Access-Token", &self.inner.access_token)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        // Read the body as text first for better error diagnostics.
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                text.chars().take(500).collect::<String>()
            ))]));
        }

        let envelope: GraphQLResponse<T> = serde_json::from_str(&text)?;

        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError { message: e.message })
                    .collect(),
            ));
        }

        envelope
            .data
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }

    // =========================================================================
    // Metafields
    // =========================================================================

    /// Read all metafields under a namespace for one owner.
    ///
    /// Returns an empty list when the owner has none (not an error).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self), fields(owner = %owner_id))]
    pub async fn metafields(
        &self,
        owner_id: &OwnerId,
        namespace: &str,
    ) -> Result<Vec<ConfigEntry>, ShopifyError> {
        let data: OwnerMetafieldsData = self
            .execute(
                operations::OWNER_METAFIELDS,
                json!({
                    "ownerId": owner_id.as_str(),
                    "namespace": namespace,
                    "first": METAFIELD_PAGE_SIZE,
                }),
            )
            .await?;

        Ok(data
            .node
            .and_then(|n| n.metafields)
            .map(|c| c.nodes)
            .unwrap_or_default()
            .into_iter()
            .map(|node| node.into_entry(owner_id.clone()))
            .collect())
    }

    /// Create or update a batch of metafields in one call.
    ///
    /// Returns the stored entries, remote ids attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn set_metafields(
        &self,
        entries: &[ConfigEntry],
    ) -> Result<Vec<ConfigEntry>, ShopifyError> {
        let inputs: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| {
                json!({
                    "ownerId": e.owner_id.as_str(),
                    "namespace": e.namespace,
                    "key": e.key,
                    "value": e.value,
                    "type": e.value_type.as_str(),
                })
            })
            .collect();

        let data: MetafieldsSetData = self
            .execute(operations::METAFIELDS_SET, json!({ "metafields": inputs }))
            .await?;

        let payload = data.metafields_set.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError::message("No metafieldsSet payload")])
        })?;
        ensure_no_user_errors(&payload.user_errors)?;

        let stored = payload.metafields.unwrap_or_default();
        Ok(stored
            .into_iter()
            .zip(entries.iter())
            .map(|(node, input)| node.into_entry(input.owner_id.clone()))
            .collect())
    }

    /// Delete metafields by key for one owner.
    ///
    /// The caller must never pass an empty key list; the API rejects an
    /// empty identifier array.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self, keys), fields(owner = %owner_id, count = keys.len()))]
    pub async fn delete_metafields(
        &self,
        owner_id: &OwnerId,
        namespace: &str,
        keys: &[String],
    ) -> Result<(), ShopifyError> {
        let identifiers: Vec<serde_json::Value> = keys
            .iter()
            .map(|key| {
                json!({
                    "ownerId": owner_id.as_str(),
                    "namespace": namespace,
                    "key": key,
                })
            })
            .collect();

        let data: MetafieldsDeleteData = self
            .execute(
                operations::METAFIELDS_DELETE,
                json!({ "metafields": identifiers }),
            )
            .await?;

        let payload = data.metafields_delete.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError::message("No metafieldsDelete payload")])
        })?;
        ensure_no_user_errors(&payload.user_errors)
    }

    // =========================================================================
    // App installation / products
    // =========================================================================

    /// Owner GID of the current app installation (sentinel scope).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self))]
    pub async fn current_app_installation(&self) -> Result<OwnerId, ShopifyError> {
        let data: CurrentAppInstallationData = self
            .execute(operations::CURRENT_APP_INSTALLATION, json!({}))
            .await?;
        Ok(OwnerId::new(data.current_app_installation.id))
    }

    /// Whether at least one product carries a link configuration.
    ///
    /// Pages through the catalog and stops at the first hit.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self))]
    pub async fn has_configured_products(&self) -> Result<bool, ShopifyError> {
        let mut after: Option<String> = None;

        loop {
            let data: ProductsWithLinksData = self
                .execute(
                    operations::PRODUCTS_WITH_LINKS,
                    json!({
                        "first": PRODUCT_SCAN_PAGE_SIZE,
                        "after": after,
                        "namespace": NAMESPACE,
                        "key": KEY_EXTERNAL_LINKS,
                    }),
                )
                .await?;

            if data.products.nodes.iter().any(|p| p.metafield.is_some()) {
                return Ok(true);
            }

            if !data.products.page_info.has_next_page {
                return Ok(false);
            }
            after = data.products.page_info.end_cursor;
        }
    }

    // =========================================================================
    // Themes
    // =========================================================================

    /// The published (MAIN role) theme, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self))]
    pub async fn main_theme(&self) -> Result<Option<Theme>, ShopifyError> {
        let data: MainThemeData = self.execute(operations::MAIN_THEME, json!({})).await?;
        Ok(data.themes.nodes.into_iter().next())
    }

    /// Product template files of a theme (JSON templates only).
    ///
    /// Uses a wildcard filename filter; files without a text body are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self), fields(theme = %theme_id))]
    pub async fn product_templates(&self, theme_id: &str) -> Result<Vec<ThemeFile>, ShopifyError> {
        let data: ThemeProductTemplatesData = self
            .execute(
                operations::THEME_PRODUCT_TEMPLATES,
                json!({
                    "themeId": theme_id,
                    "filenames": ["templates/*product*.json"],
                    "first": THEME_FILE_PAGE_SIZE,
                }),
            )
            .await?;

        Ok(data
            .theme
            .map(|t| t.files.nodes)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|node| {
                let content = node.body.and_then(|b| b.content)?;
                Some(ThemeFile {
                    filename: node.filename,
                    content,
                })
            })
            .collect())
    }

    /// Write one theme file back.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors
    /// (e.g., theme validation rejecting the new template).
    #[instrument(skip(self, content), fields(theme = %theme_id, filename = %filename))]
    pub async fn upsert_theme_file(
        &self,
        theme_id: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), ShopifyError> {
        let data: ThemeFilesUpsertData = self
            .execute(
                operations::THEME_FILES_UPSERT,
                json!({
                    "themeId": theme_id,
                    "files": [{
                        "filename": filename,
                        "body": { "type": "TEXT", "value": content },
                    }],
                }),
            )
            .await?;

        let payload = data.theme_files_upsert.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError::message("No themeFilesUpsert payload")])
        })?;
        ensure_no_user_errors(&payload.user_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_data_and_errors() {
        let envelope: GraphQLResponse<serde_json::Value> = serde_json::from_str(
            r#"{"data":{"x":1},"errors":[{"message":"boom","locations":[{"line":1,"column":2}]}]}"#,
        )
        .unwrap();
        assert!(envelope.data.is_some());
        assert_eq!(envelope.errors.unwrap()[0].message, "boom");
    }

    #[test]
    fn test_envelope_tolerates_missing_errors() {
        let envelope: GraphQLResponse<serde_json::Value> =
            serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(envelope.data.is_none());
        assert!(envelope.errors.is_none());
    }
}
