//! Link configuration commands.
//!
//! Thin wrappers over [`buylink_admin::links::LinkService`]: parse input,
//! call the service, print the result. All policy lives in the service.

use thiserror::Error;

use buylink_admin::config::{AppConfig, ConfigError};
use buylink_admin::links::{LinkService, LinkServiceError};
use buylink_admin::shopify::AdminClient;
use buylink_admin::store::ConfigStore;
use buylink_core::{ExternalLink, OwnerId, ProductLinkConfig};

/// Errors that can occur during link commands.
#[derive(Debug, Error)]
pub enum LinksCmdError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The service rejected or failed the operation.
    #[error(transparent)]
    Service(#[from] LinkServiceError),

    /// The `--json` argument was not a valid link array.
    #[error("Invalid link JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn service() -> Result<LinkService<ConfigStore>, LinksCmdError> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let client = AdminClient::new(&config.shopify);
    Ok(LinkService::new(ConfigStore::new(client)))
}

/// Print the persisted configuration for a product.
#[allow(clippy::print_stdout)]
pub async fn get(product: &str) -> Result<(), LinksCmdError> {
    let service = service()?;
    match service.load(&OwnerId::new(product)).await? {
        Some(config) => {
            println!("hide_add_to_cart: {}", config.hide_add_to_cart);
            println!("{}", serde_json::to_string_pretty(&config.links)?);
        }
        None => println!("not configured"),
    }
    Ok(())
}

/// Save a configuration from a JSON link array.
#[allow(clippy::print_stdout)]
pub async fn set(product: &str, json: &str, hide_atc: bool) -> Result<(), LinksCmdError> {
    let links: Vec<ExternalLink> = serde_json::from_str(json)?;
    let desired = ProductLinkConfig {
        owner_id: OwnerId::new(product),
        links,
        hide_add_to_cart: hide_atc,
    };

    let service = service()?;
    service.save(&desired).await?;
    println!(
        "saved {} link(s) for {product}",
        desired.normalized_links().len()
    );
    Ok(())
}

/// Remove all configuration for a product.
#[allow(clippy::print_stdout)]
pub async fn clear(product: &str) -> Result<(), LinksCmdError> {
    let service = service()?;
    service.clear(&OwnerId::new(product)).await?;
    println!("cleared configuration for {product}");
    Ok(())
}
