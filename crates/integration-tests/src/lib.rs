//! Integration tests for BuyLink.
//!
//! The remote store is replaced by [`MemoryStore`], an in-memory
//! [`MetafieldStore`] that records every call, so save/load/clear flows
//! and the auto-installer can be exercised end to end without a Shopify
//! store.
//!
//! # Test Categories
//!
//! - `link_save_flow` - save/load/clear scenarios against the memory store
//! - `auto_install` - the one-shot theme install heuristic
//! - `storefront_protocol` - persisted payload through to rendered buttons

// Test support: a poisoned lock is a test bug, unwrapping is the right call.
#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use buylink_admin::shopify::ShopifyError;
use buylink_admin::shopify::operations::{Theme, ThemeFile};
use buylink_admin::store::MetafieldStore;
use buylink_admin::theme::ThemeSource;
use buylink_core::{ConfigEntry, OwnerId};

/// Where to inject a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Upsert,
    Delete,
}

/// In-memory metafield store with an operation log.
///
/// Entries keep insertion order, ids are assigned on create, and every
/// remote-equivalent call is appended to `ops` so tests can assert
/// ordering (deletes strictly before upserts) and call counts.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<ConfigEntry>>,
    next_id: Mutex<u64>,
    /// Call log, e.g. `read:bl_custom_button`, `delete:hide_atc`,
    /// `upsert:external_links`.
    pub ops: Mutex<Vec<String>>,
    /// When set, the matching call fails with a remote user error.
    pub fail_on: Mutex<Option<FailOn>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry as if it already existed remotely.
    pub fn seed(&self, mut entry: ConfigEntry) {
        let mut next_id = self.next_id.lock().unwrap();
        if entry.id.is_none() {
            *next_id += 1;
            entry.id = Some(format!("gid://test/Metafield/{next_id}"));
        }
        self.entries.lock().unwrap().push(entry);
    }

    /// Snapshot of the stored entries for one owner and namespace.
    #[must_use]
    pub fn entries_for(&self, owner_id: &OwnerId, namespace: &str) -> Vec<ConfigEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.owner_id == owner_id && e.namespace == namespace)
            .cloned()
            .collect()
    }

    /// The recorded call log.
    #[must_use]
    pub fn log(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn check_failure(&self, point: FailOn) -> Result<(), ShopifyError> {
        if *self.fail_on.lock().unwrap() == Some(point) {
            return Err(ShopifyError::UserError("injected remote failure".to_string()));
        }
        Ok(())
    }
}

impl MetafieldStore for &MemoryStore {
    async fn read_all(
        &self,
        owner_id: &OwnerId,
        namespace: &str,
    ) -> Result<Vec<ConfigEntry>, ShopifyError> {
        self.ops.lock().unwrap().push(format!("read:{namespace}"));
        Ok(self.entries_for(owner_id, namespace))
    }

    async fn upsert(&self, entries: &[ConfigEntry]) -> Result<Vec<ConfigEntry>, ShopifyError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        self.check_failure(FailOn::Upsert)?;

        let mut stored = self.entries.lock().unwrap();
        let mut result = Vec::new();
        for entry in entries {
            self.ops.lock().unwrap().push(format!("upsert:{}", entry.key));
            let existing = stored.iter_mut().find(|e| {
                e.owner_id == entry.owner_id && e.namespace == entry.namespace && e.key == entry.key
            });
            let written = if let Some(existing) = existing {
                existing.value = entry.value.clone();
                existing.value_type = entry.value_type;
                existing.clone()
            } else {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                let mut created = entry.clone();
                created.id = Some(format!("gid://test/Metafield/{next_id}"));
                stored.push(created.clone());
                created
            };
            result.push(written);
        }
        Ok(result)
    }

    async fn delete_by_keys(
        &self,
        owner_id: &OwnerId,
        namespace: &str,
        keys: &[String],
    ) -> Result<(), ShopifyError> {
        if keys.is_empty() {
            // Mirrors the adapter contract: zero identifiers, zero calls.
            return Ok(());
        }
        self.check_failure(FailOn::Delete)?;

        for key in keys {
            self.ops.lock().unwrap().push(format!("delete:{key}"));
        }
        self.entries.lock().unwrap().retain(|e| {
            !(&e.owner_id == owner_id && e.namespace == namespace && keys.contains(&e.key))
        });
        Ok(())
    }
}

/// Scripted theme-side remote for the auto-installer.
pub struct FakeThemeSource {
    pub installation: OwnerId,
    pub configured_products: bool,
    pub theme: Option<Theme>,
    pub templates: Vec<ThemeFile>,
    /// When set, the template write fails with this user-error message.
    pub reject_upload: Option<String>,
    /// Files written back, `(theme_id, filename, content)`.
    pub uploads: Mutex<Vec<(String, String, String)>>,
}

impl FakeThemeSource {
    /// A source with an active theme and one product template.
    #[must_use]
    pub fn with_template(content: &str) -> Self {
        Self {
            installation: OwnerId::new("gid://shopify/AppInstallation/1"),
            configured_products: true,
            theme: Some(Theme {
                id: "gid://shopify/OnlineStoreTheme/1".to_string(),
                name: "Dawn".to_string(),
            }),
            templates: vec![ThemeFile {
                filename: "templates/product.json".to_string(),
                content: content.to_string(),
            }],
            reject_upload: None,
            uploads: Mutex::new(Vec::new()),
        }
    }
}

impl ThemeSource for &FakeThemeSource {
    async fn current_app_installation(&self) -> Result<OwnerId, ShopifyError> {
        Ok(self.installation.clone())
    }

    async fn has_configured_products(&self) -> Result<bool, ShopifyError> {
        Ok(self.configured_products)
    }

    async fn main_theme(&self) -> Result<Option<Theme>, ShopifyError> {
        Ok(self.theme.clone())
    }

    async fn product_templates(&self, _theme_id: &str) -> Result<Vec<ThemeFile>, ShopifyError> {
        Ok(self.templates.clone())
    }

    async fn upsert_theme_file(
        &self,
        theme_id: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), ShopifyError> {
        if let Some(message) = &self.reject_upload {
            return Err(ShopifyError::UserError(message.clone()));
        }
        self.uploads.lock().unwrap().push((
            theme_id.to_string(),
            filename.to_string(),
            content.to_string(),
        ));
        Ok(())
    }
}
