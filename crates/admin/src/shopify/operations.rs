//! GraphQL documents and their result types.
//!
//! One document per operation, one `Deserialize` struct per response shape.
//! Mutations expose `userErrors`; callers join them into a single message
//! via [`ensure_no_user_errors`] and abort the whole operation.

use serde::Deserialize;

use buylink_core::reconcile::ValueType;
use buylink_core::{ConfigEntry, OwnerId};

use super::ShopifyError;

// =============================================================================
// Documents
// =============================================================================

/// Read every metafield under one namespace for one owner.
pub const OWNER_METAFIELDS: &str = r"
query OwnerMetafields($ownerId: ID!, $namespace: String!, $first: Int!) {
  node(id: $ownerId) {
    ... on Product {
      metafields(namespace: $namespace, first: $first) {
        nodes { id namespace key value type }
      }
    }
    ... on AppInstallation {
      metafields(namespace: $namespace, first: $first) {
        nodes { id namespace key value type }
      }
    }
  }
}";

/// Batch create/update metafields; the store upserts by (owner, namespace, key).
pub const METAFIELDS_SET: &str = r"
mutation SetMetafields($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields { id namespace key value type }
    userErrors { field message }
  }
}";

/// Batch delete metafields by (owner, namespace, key).
pub const METAFIELDS_DELETE: &str = r"
mutation DeleteMetafields($metafields: [MetafieldIdentifierInput!]!) {
  metafieldsDelete(metafields: $metafields) {
    deletedMetafields { key }
    userErrors { field message }
  }
}";

/// Owner GID for app-installation-scoped metafields (the sentinel).
pub const CURRENT_APP_INSTALLATION: &str = r"
query CurrentAppInstallation {
  currentAppInstallation { id }
}";

/// Page through products, surfacing whether each carries the links metafield.
pub const PRODUCTS_WITH_LINKS: &str = r"
query ProductsWithLinks($first: Int!, $after: String, $namespace: String!, $key: String!) {
  products(first: $first, after: $after) {
    nodes {
      id
      metafield(namespace: $namespace, key: $key) { id }
    }
    pageInfo { hasNextPage endCursor }
  }
}";

/// The published theme.
pub const MAIN_THEME: &str = r"
query MainTheme {
  themes(first: 1, roles: [MAIN]) {
    nodes { id name }
  }
}";

/// Product template files of a theme (wildcard filename filter).
pub const THEME_PRODUCT_TEMPLATES: &str = r"
query ThemeProductTemplates($themeId: ID!, $filenames: [String!]!, $first: Int!) {
  theme(id: $themeId) {
    files(filenames: $filenames, first: $first) {
      nodes {
        filename
        body {
          ... on OnlineStoreThemeFileBodyText { content }
        }
      }
    }
  }
}";

/// Write one theme file back.
pub const THEME_FILES_UPSERT: &str = r"
mutation UpsertThemeFiles($themeId: ID!, $files: [OnlineStoreThemeFilesUpsertFileInput!]!) {
  themeFilesUpsert(themeId: $themeId, files: $files) {
    upsertedThemeFiles { filename }
    userErrors { field message }
  }
}";

// =============================================================================
// Shared response fragments
// =============================================================================

/// A metafield as returned by reads and `metafieldsSet`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetafieldNode {
    pub id: String,
    pub namespace: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

impl MetafieldNode {
    /// Convert to the store-agnostic entry shape.
    #[must_use]
    pub fn into_entry(self, owner_id: OwnerId) -> ConfigEntry {
        let value_type = if self.value_type == ValueType::Json.as_str() {
            ValueType::Json
        } else {
            ValueType::SingleLineText
        };
        ConfigEntry {
            owner_id,
            namespace: self.namespace,
            key: self.key,
            value: self.value,
            value_type,
            id: Some(self.id),
        }
    }
}

/// A per-field validation error from a mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Join mutation user errors into one message, or pass.
///
/// # Errors
///
/// Returns [`ShopifyError::UserError`] when the list is non-empty.
pub fn ensure_no_user_errors(errors: &[UserError]) -> Result<(), ShopifyError> {
    if errors.is_empty() {
        return Ok(());
    }
    let joined = errors
        .iter()
        .map(|e| {
            let field = e.field.as_ref().map_or_else(String::new, |f| f.join("."));
            format!("{}: {}", field, e.message)
        })
        .collect::<Vec<_>>()
        .join("; ");
    Err(ShopifyError::UserError(joined))
}

// =============================================================================
// Response types per operation
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OwnerMetafieldsData {
    pub node: Option<MetafieldOwnerNode>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldOwnerNode {
    #[serde(default)]
    pub metafields: Option<MetafieldConnection>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldConnection {
    pub nodes: Vec<MetafieldNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsSetData {
    pub metafields_set: Option<MetafieldsSetPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsSetPayload {
    #[serde(default)]
    pub metafields: Option<Vec<MetafieldNode>>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsDeleteData {
    pub metafields_delete: Option<MetafieldsDeletePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsDeletePayload {
    #[serde(default)]
    pub deleted_metafields: Option<Vec<DeletedMetafield>>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct DeletedMetafield {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAppInstallationData {
    pub current_app_installation: AppInstallationNode,
}

#[derive(Debug, Deserialize)]
pub struct AppInstallationNode {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductsWithLinksData {
    pub products: ProductConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnection {
    pub nodes: Vec<ProductNode>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct ProductNode {
    pub id: String,
    #[serde(default)]
    pub metafield: Option<MetafieldRef>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MainThemeData {
    pub themes: ThemeConnection,
}

#[derive(Debug, Deserialize)]
pub struct ThemeConnection {
    pub nodes: Vec<Theme>,
}

/// The published theme.
#[derive(Debug, Clone, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeProductTemplatesData {
    pub theme: Option<ThemeFilesNode>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeFilesNode {
    pub files: ThemeFileConnection,
}

#[derive(Debug, Deserialize)]
pub struct ThemeFileConnection {
    pub nodes: Vec<ThemeFileNode>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeFileNode {
    pub filename: String,
    #[serde(default)]
    pub body: Option<ThemeFileBody>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeFileBody {
    /// Present only for text bodies (the inline fragment).
    #[serde(default)]
    pub content: Option<String>,
}

/// A theme file with its text content.
#[derive(Debug, Clone)]
pub struct ThemeFile {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeFilesUpsertData {
    pub theme_files_upsert: Option<ThemeFilesUpsertPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeFilesUpsertPayload {
    #[serde(default)]
    pub upserted_theme_files: Option<Vec<UpsertedThemeFile>>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertedThemeFile {
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metafield_node_maps_wire_type() {
        let node: MetafieldNode = serde_json::from_str(
            r#"{"id":"gid://shopify/Metafield/1","namespace":"bl_custom_button","key":"external_links","value":"[]","type":"json"}"#,
        )
        .unwrap();
        let entry = node.into_entry(OwnerId::new("gid://shopify/Product/1"));
        assert_eq!(entry.value_type, ValueType::Json);
        assert_eq!(entry.id.as_deref(), Some("gid://shopify/Metafield/1"));
    }

    #[test]
    fn test_user_errors_join_field_paths() {
        let errors = vec![
            UserError {
                field: Some(vec!["metafields".to_string(), "0".to_string(), "value".to_string()]),
                message: "is invalid".to_string(),
            },
            UserError {
                field: None,
                message: "something else".to_string(),
            },
        ];
        let err = ensure_no_user_errors(&errors).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User error: metafields.0.value: is invalid; : something else"
        );
    }

    #[test]
    fn test_empty_user_errors_pass() {
        assert!(ensure_no_user_errors(&[]).is_ok());
    }

    #[test]
    fn test_theme_file_body_tolerates_non_text_bodies() {
        let node: ThemeFileNode =
            serde_json::from_str(r#"{"filename":"templates/product.json","body":{}}"#).unwrap();
        assert!(node.body.unwrap().content.is_none());
    }
}
