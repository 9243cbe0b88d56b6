//! BuyLink CLI - link configuration and theme management.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted configuration for a product
//! bl-cli links get -p gid://shopify/Product/123
//!
//! # Save a configuration (JSON array of {url, text, enabled})
//! bl-cli links set -p gid://shopify/Product/123 \
//!     -j '[{"url":"https://partner.example/x","text":"Buy at partner","enabled":true}]' \
//!     --hide-atc
//!
//! # Remove all configuration for a product
//! bl-cli links clear -p gid://shopify/Product/123
//!
//! # Attempt the one-shot app block install into the active theme
//! bl-cli theme install
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE`, `SHOPIFY_ACCESS_TOKEN`, `BUYLINK_EXTENSION_UUID`
//! - `SHOPIFY_API_VERSION` (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bl-cli")]
#[command(author, version, about = "BuyLink management CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage per-product link configuration
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },
    /// Theme app block management
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Subcommand)]
enum LinksAction {
    /// Print the persisted configuration for a product
    Get {
        /// Product GID (gid://shopify/Product/...)
        #[arg(short, long)]
        product: String,
    },
    /// Save a configuration, reconciling against remote state
    Set {
        /// Product GID (gid://shopify/Product/...)
        #[arg(short, long)]
        product: String,

        /// JSON array of {url, text, enabled}
        #[arg(short = 'j', long)]
        json: String,

        /// Hide the native add-to-cart control
        #[arg(long)]
        hide_atc: bool,
    },
    /// Remove all configuration for a product
    Clear {
        /// Product GID (gid://shopify/Product/...)
        #[arg(short, long)]
        product: String,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// One-shot app block install into the active theme
    Install,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Links { action } => match action {
            LinksAction::Get { product } => commands::links::get(&product).await?,
            LinksAction::Set {
                product,
                json,
                hide_atc,
            } => commands::links::set(&product, &json, hide_atc).await?,
            LinksAction::Clear { product } => commands::links::clear(&product).await?,
        },
        Commands::Theme { action } => match action {
            ThemeAction::Install => commands::theme::install().await?,
        },
    }
    Ok(())
}
