//! Theme app block commands.

use thiserror::Error;

use buylink_admin::config::{AppConfig, ConfigError};
use buylink_admin::shopify::AdminClient;
use buylink_admin::store::ConfigStore;
use buylink_admin::theme::{AutoInstaller, InstallOutcome, SkipReason};

/// Errors that can occur during theme commands.
#[derive(Debug, Error)]
pub enum ThemeCmdError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Run one auto-install attempt and report the outcome.
///
/// Install failures are guidance, not command failures: the block can
/// always be added manually in the theme editor.
#[allow(clippy::print_stdout)]
pub async fn install() -> Result<(), ThemeCmdError> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let client = AdminClient::new(&config.shopify);
    let installer = AutoInstaller::new(client.clone(), ConfigStore::new(client), &config.shopify);

    match installer.run().await {
        Ok(InstallOutcome::Installed {
            template,
            block_key,
        }) => {
            println!("installed app block `{block_key}` into {template}");
        }
        Ok(InstallOutcome::AlreadyInstalled) => {
            println!("app block already present; nothing to do");
        }
        Ok(InstallOutcome::Skipped(SkipReason::SentinelPresent)) => {
            println!("install was already attempted; skipping");
        }
        Ok(InstallOutcome::Skipped(SkipReason::NoConfiguredProducts)) => {
            println!("no products carry a link configuration yet; skipping");
        }
        Err(error) => {
            println!("automatic install did not complete ({}): {error}", error.reason());
            println!("add the \"External links\" block to the product template manually in the theme editor");
        }
    }
    Ok(())
}
