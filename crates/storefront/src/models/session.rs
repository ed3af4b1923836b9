//! Visitor state kept in the session.
//!
//! Handlers and services talk to the session through [`CustomerSession`] so
//! the newsletter and wishlist flows can be tested without a cookie jar.

use async_trait::async_trait;
use larkspur_core::MarketingState;
use thiserror::Error;
use tower_sessions::Session;

use crate::shopify::CustomerAccessToken;

/// Session keys.
pub mod keys {
    /// Storefront customer access token issued at login.
    pub const CUSTOMER_ACCESS_TOKEN: &str = "customerAccessToken";

    /// Email marketing state recorded after a newsletter signup.
    pub const EMAIL_MARKETING_CONSENT: &str = "emailMarketingConsent";
}

/// Session store failure.
#[derive(Debug, Error)]
#[error("session error: {0}")]
pub struct SessionError(#[from] tower_sessions::session::Error);

/// Per-request visitor state.
#[async_trait]
pub trait CustomerSession: Send + Sync {
    /// Access token of the logged-in customer, if any.
    async fn customer_access_token(&self) -> Result<Option<CustomerAccessToken>, SessionError>;

    /// Forget the customer access token, logging the visitor out.
    async fn clear_customer_access_token(&self) -> Result<(), SessionError>;

    /// Marketing state recorded by a previous newsletter signup.
    async fn marketing_state(&self) -> Result<Option<MarketingState>, SessionError>;

    /// Record the visitor's marketing state.
    async fn set_marketing_state(&self, state: MarketingState) -> Result<(), SessionError>;
}

#[async_trait]
impl CustomerSession for Session {
    async fn customer_access_token(&self) -> Result<Option<CustomerAccessToken>, SessionError> {
        Ok(self.get(keys::CUSTOMER_ACCESS_TOKEN).await?)
    }

    async fn clear_customer_access_token(&self) -> Result<(), SessionError> {
        self.remove::<CustomerAccessToken>(keys::CUSTOMER_ACCESS_TOKEN)
            .await?;
        Ok(())
    }

    async fn marketing_state(&self) -> Result<Option<MarketingState>, SessionError> {
        Ok(self.get(keys::EMAIL_MARKETING_CONSENT).await?)
    }

    async fn set_marketing_state(&self, state: MarketingState) -> Result<(), SessionError> {
        self.insert(keys::EMAIL_MARKETING_CONSENT, state).await?;
        Ok(())
    }
}
