//! Shopify Storefront and Admin API clients.
//!
//! # Architecture
//!
//! - Hand-written GraphQL documents sent through [`GraphQLClient`], which
//!   wraps them in `graphql_client` envelopes and posts with `reqwest`
//! - Shopify is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for pages and the layout (5 minute TTL)
//! - Handlers and services depend on the [`StorefrontApi`] and [`AdminApi`]
//!   ports, so tests can swap in fakes
//!
//! # APIs
//!
//! ## Storefront API
//! - Pages, shop settings, menus, products by ID
//! - Customer lookup by customer access token (wishlist)
//!
//! ## Admin API
//! - Customer lookup by email, customer creation, email marketing consent
//!   updates (newsletter only)

mod admin;
mod graphql;
mod storefront;
pub mod types;

pub use admin::AdminClient;
pub use graphql::GraphQLClient;
pub use storefront::StorefrontClient;
pub use types::*;

use async_trait::async_trait;
use larkspur_core::Email;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
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

    /// Access token rejected by Shopify.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Mutation rejected the input.
    #[error("User errors: {}", format_user_errors(.0))]
    UserErrors(Vec<UserError>),
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error with only a message, for failures detected client-side.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

/// A validation error returned in a mutation payload's `userErrors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Path to the offending input field, e.g. `["email"]`.
    pub field: Option<Vec<String>>,
    /// Human-readable message.
    pub message: String,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Ports
// =============================================================================

/// Read access to the Storefront API.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Fetch a CMS page by handle. `Ok(None)` when no page has that handle.
    async fn page_by_handle(&self, handle: &str) -> Result<Option<Page>, ShopifyError>;

    /// Fetch shop settings and the footer menu for the shared layout.
    async fn layout(&self, footer_menu_handle: &str) -> Result<Layout, ShopifyError>;

    /// Fetch the customer a storefront access token belongs to.
    ///
    /// `Ok(None)` when Shopify does not recognise the token.
    async fn customer_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<Customer>, ShopifyError>;

    /// Fetch products by GID in one request. Unknown or non-product IDs are skipped.
    async fn products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, ShopifyError>;
}

/// Customer writes through the Admin API, used by the newsletter.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Find the customer registered with `email`, if any.
    async fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Subscriber>, ShopifyError>;

    /// Create a customer tagged `newsletter` with the given consent.
    ///
    /// Mutation `userErrors` are returned as [`ShopifyError::UserErrors`].
    async fn create_subscriber(
        &self,
        email: &Email,
        consent: &EmailMarketingConsentInput,
    ) -> Result<Subscriber, ShopifyError>;

    /// Replace an existing customer's email marketing consent.
    ///
    /// Mutation `userErrors` are returned as [`ShopifyError::UserErrors`].
    async fn update_email_marketing_consent(
        &self,
        customer_id: &str,
        consent: &EmailMarketingConsentInput,
    ) -> Result<Subscriber, ShopifyError>;
}
