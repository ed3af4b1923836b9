//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /pages/{handle}         - CMS page
//! GET  /wishlist               - Logged-in customer's wishlist
//! POST /newsletter             - Newsletter signup (JSON or HTMX fragment, rate limited)
//! GET  /newsletter             - Redirect to /
//! GET  /static/*               - Static assets
//! ```

pub mod layout;
pub mod newsletter;
pub mod pages;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::newsletter_rate_limiter;
use crate::state::AppState;

/// Create the newsletter routes router.
pub fn newsletter_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/newsletter",
            post(newsletter::subscribe).route_layer(newsletter_rate_limiter()),
        )
        .route("/newsletter", get(newsletter::redirect_home))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/pages/{handle}", get(pages::show))
        .route("/wishlist", get(wishlist::show))
        .merge(newsletter_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Shopify.
async fn health() -> &'static str {
    "ok"
}
