//! One-shot, best-effort theme auto-install.
//!
//! Inspects the published theme's JSON product template and patches the
//! app block into the product-form section. Runs at most once per install:
//! a sentinel metafield on the app installation records that the attempt
//! happened, whatever the outcome of the patch itself.
//!
//! Every failure path carries a tagged reason; callers turn any non-success
//! into "show manual-install guidance", never into a fatal error.

mod plan;

pub use plan::{APP_BLOCK_MARKER, PlanOutcome, plan_install};

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use buylink_core::reconcile::ValueType;
use buylink_core::stored::{SENTINEL_KEY, SENTINEL_NAMESPACE};
use buylink_core::{ConfigEntry, OwnerId};

use crate::config::ShopifyConfig;
use crate::shopify::operations::{Theme, ThemeFile};
use crate::shopify::{AdminClient, ShopifyError};
use crate::store::MetafieldStore;

/// The template filename preferred when several product templates exist.
const DEFAULT_PRODUCT_TEMPLATE: &str = "templates/product.json";

/// Remote reads/writes the installer needs beyond the metafield store.
#[allow(async_fn_in_trait)]
pub trait ThemeSource {
    /// Owner GID of the app installation (sentinel scope).
    async fn current_app_installation(&self) -> Result<OwnerId, ShopifyError>;
    /// Whether any product carries a link configuration.
    async fn has_configured_products(&self) -> Result<bool, ShopifyError>;
    /// The published theme, if any.
    async fn main_theme(&self) -> Result<Option<Theme>, ShopifyError>;
    /// JSON product template files of a theme.
    async fn product_templates(&self, theme_id: &str) -> Result<Vec<ThemeFile>, ShopifyError>;
    /// Write one theme file back.
    async fn upsert_theme_file(
        &self,
        theme_id: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), ShopifyError>;
}

impl ThemeSource for AdminClient {
    async fn current_app_installation(&self) -> Result<OwnerId, ShopifyError> {
        Self::current_app_installation(self).await
    }

    async fn has_configured_products(&self) -> Result<bool, ShopifyError> {
        Self::has_configured_products(self).await
    }

    async fn main_theme(&self) -> Result<Option<Theme>, ShopifyError> {
        Self::main_theme(self).await
    }

    async fn product_templates(&self, theme_id: &str) -> Result<Vec<ThemeFile>, ShopifyError> {
        Self::product_templates(self, theme_id).await
    }

    async fn upsert_theme_file(
        &self,
        theme_id: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), ShopifyError> {
        Self::upsert_theme_file(self, theme_id, filename, content).await
    }
}

/// Terminal outcome of one install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The template was patched and the sentinel set.
    Installed {
        /// Template file that was modified.
        template: String,
        /// Identifier the block was registered under.
        block_key: String,
    },
    /// The block was already present; sentinel set, nothing written.
    AlreadyInstalled,
    /// Nothing to do; no sentinel written for `NoConfiguredProducts`.
    Skipped(SkipReason),
}

/// Why an attempt was skipped before touching the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The sentinel says an attempt already happened.
    SentinelPresent,
    /// No product carries a configuration yet; nothing to render.
    NoConfiguredProducts,
}

/// Tagged failure reasons; all map to manual-install guidance.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("No active theme on this store")]
    NoActiveTheme,

    #[error("No JSON product template found in the active theme")]
    NoProductTemplate,

    #[error("Product template is not valid JSON: {0}")]
    InvalidTemplateJson(#[source] serde_json::Error),

    #[error("No product-form section found in the product template")]
    NoSuitableSection,

    #[error("Theme rejected the updated template: {0}")]
    UpdateFailed(String),

    #[error(transparent)]
    Remote(#[from] ShopifyError),
}

impl InstallError {
    /// Stable snake_case tag for the failure reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NoActiveTheme => "no_active_theme",
            Self::NoProductTemplate => "no_product_template",
            Self::InvalidTemplateJson(_) => "invalid_template_json",
            Self::NoSuitableSection => "no_suitable_section",
            Self::UpdateFailed(_) => "update_failed",
            Self::Remote(_) => "remote_error",
        }
    }
}

/// Drives one auto-install attempt end to end.
pub struct AutoInstaller<C, S> {
    source: C,
    store: S,
    block_type: String,
}

impl<C: ThemeSource, S: MetafieldStore> AutoInstaller<C, S> {
    /// Create an installer for the configured app block.
    #[must_use]
    pub fn new(source: C, store: S, config: &ShopifyConfig) -> Self {
        Self {
            source,
            store,
            block_type: config.app_block_type(),
        }
    }

    /// Run one attempt. Terminal in all cases; re-entry is prevented by the
    /// sentinel, checked before anything else is touched.
    ///
    /// # Errors
    ///
    /// Returns a tagged [`InstallError`]; callers surface it as guidance to
    /// install the block manually, never as a fatal condition.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<InstallOutcome, InstallError> {
        let install_owner = self.source.current_app_installation().await?;

        let sentinel = self
            .store
            .read_all(&install_owner, SENTINEL_NAMESPACE)
            .await
            .map_err(InstallError::Remote)?;
        if sentinel.iter().any(|e| e.key == SENTINEL_KEY) {
            return Ok(InstallOutcome::Skipped(SkipReason::SentinelPresent));
        }

        if !self.source.has_configured_products().await? {
            return Ok(InstallOutcome::Skipped(SkipReason::NoConfiguredProducts));
        }

        let theme = self
            .source
            .main_theme()
            .await?
            .ok_or(InstallError::NoActiveTheme)?;

        let templates = self.source.product_templates(&theme.id).await?;
        let template = pick_template(&templates).ok_or(InstallError::NoProductTemplate)?;

        let block_key = format!("external_links_{}", Uuid::new_v4().simple());
        match plan_install(&template.content, &self.block_type, &block_key)? {
            PlanOutcome::AlreadyPresent => {
                self.mark_attempted(&install_owner).await?;
                info!(theme = %theme.name, "app block already present");
                Ok(InstallOutcome::AlreadyInstalled)
            }
            PlanOutcome::Patched { content } => {
                self.source
                    .upsert_theme_file(&theme.id, &template.filename, &content)
                    .await
                    .map_err(|e| match e {
                        ShopifyError::UserError(msg) => InstallError::UpdateFailed(msg),
                        other => InstallError::Remote(other),
                    })?;
                self.mark_attempted(&install_owner).await?;
                info!(theme = %theme.name, template = %template.filename, "app block installed");
                Ok(InstallOutcome::Installed {
                    template: template.filename.clone(),
                    block_key,
                })
            }
        }
    }

    /// Write the sentinel. Value is a timestamp by convention; only the
    /// entry's presence is ever checked.
    async fn mark_attempted(&self, install_owner: &OwnerId) -> Result<(), InstallError> {
        let sentinel = ConfigEntry {
            owner_id: install_owner.clone(),
            namespace: SENTINEL_NAMESPACE.to_string(),
            key: SENTINEL_KEY.to_string(),
            value: chrono::Utc::now().to_rfc3339(),
            value_type: ValueType::SingleLineText,
            id: None,
        };
        self.store
            .upsert(std::slice::from_ref(&sentinel))
            .await
            .map_err(InstallError::Remote)?;
        Ok(())
    }
}

/// Prefer the default product template, else take the first candidate.
fn pick_template(templates: &[ThemeFile]) -> Option<&ThemeFile> {
    templates
        .iter()
        .find(|t| t.filename == DEFAULT_PRODUCT_TEMPLATE)
        .or_else(|| templates.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_template_prefers_default_name() {
        let templates = vec![
            ThemeFile {
                filename: "templates/product.pre-order.json".to_string(),
                content: "{}".to_string(),
            },
            ThemeFile {
                filename: "templates/product.json".to_string(),
                content: "{}".to_string(),
            },
        ];
        assert_eq!(
            pick_template(&templates).unwrap().filename,
            "templates/product.json"
        );
    }

    #[test]
    fn test_pick_template_falls_back_to_first() {
        let templates = vec![ThemeFile {
            filename: "templates/product.alt.json".to_string(),
            content: "{}".to_string(),
        }];
        assert_eq!(
            pick_template(&templates).unwrap().filename,
            "templates/product.alt.json"
        );
        assert!(pick_template(&[]).is_none());
    }

    #[test]
    fn test_reason_tags_are_stable() {
        assert_eq!(InstallError::NoActiveTheme.reason(), "no_active_theme");
        assert_eq!(InstallError::NoProductTemplate.reason(), "no_product_template");
        assert_eq!(InstallError::NoSuitableSection.reason(), "no_suitable_section");
        assert_eq!(
            InstallError::UpdateFailed("x".to_string()).reason(),
            "update_failed"
        );
    }
}
