//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::navigation::LinkPolicy;
use crate::shopify::{AdminApi, AdminClient, ShopifyError, StorefrontApi, StorefrontClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Shopify access goes through
/// the [`StorefrontApi`] and [`AdminApi`] ports so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: Arc<dyn StorefrontApi>,
    admin: Arc<dyn AdminApi>,
    link_policy: LinkPolicy,
}

impl AppState {
    /// Create application state backed by the real Shopify clients.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ShopifyError> {
        let storefront = Arc::new(StorefrontClient::new(&config.shopify)?);
        let admin = Arc::new(AdminClient::new(&config.shopify)?);
        Ok(Self::with_clients(config, storefront, admin))
    }

    /// Create application state with explicit Shopify clients.
    #[must_use]
    pub fn with_clients(
        config: StorefrontConfig,
        storefront: Arc<dyn StorefrontApi>,
        admin: Arc<dyn AdminApi>,
    ) -> Self {
        let link_policy = LinkPolicy::new(config.internal_hosts());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                admin,
                link_policy,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &dyn StorefrontApi {
        self.inner.storefront.as_ref()
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn admin(&self) -> &dyn AdminApi {
        self.inner.admin.as_ref()
    }

    /// Footer link policy for the configured hosts.
    ///
    /// The shop's primary domain is only known after the layout query and is
    /// added per request.
    #[must_use]
    pub fn link_policy(&self) -> &LinkPolicy {
        &self.inner.link_policy
    }
}
