//! Shopify Admin API GraphQL client.
//!
//! Documents are hand-written and each operation deserializes into its own
//! response type; anything the remote returns outside that shape surfaces as
//! an error rather than being poked at dynamically.

mod client;
pub mod operations;

pub use client::AdminClient;

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from a mutation (e.g., invalid input), per-field messages
    /// joined into one readable string.
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
}

impl GraphQLError {
    /// A bare-message error for responses missing expected data.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_errors_join_into_one_message() {
        let err = ShopifyError::GraphQL(vec![
            GraphQLError::message("first"),
            GraphQLError::message("second"),
        ]);
        assert_eq!(err.to_string(), "GraphQL errors: first; second");
    }

    #[test]
    fn test_user_error_display() {
        let err = ShopifyError::UserError("value: is invalid".to_string());
        assert_eq!(err.to_string(), "User error: value: is invalid");
    }

    #[test]
    fn test_rate_limited_display() {
        let err = ShopifyError::RateLimited(30);
        assert!(err.to_string().contains("30 seconds"));
    }
}
