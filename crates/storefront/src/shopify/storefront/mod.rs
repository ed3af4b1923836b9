//! Shopify Storefront API client implementation.
//!
//! Reads pages, the shop layout, customer wishlists, and products.
//! Pages and the layout are cached using `moka` (5-minute TTL); customer and
//! product lookups are per-visitor and always go to Shopify.

mod cache;
mod conversions;
pub mod queries;

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::SecretString;
use tracing::{debug, instrument};

use crate::config::ShopifyConfig;
use crate::shopify::types::{Customer, Layout, Page, Product};
use crate::shopify::{GraphQLClient, ShopifyError, StorefrontApi};

use cache::{CacheKey, CacheValue};
use conversions::{convert_customer, convert_layout, convert_page, convert_products};
use queries::{
    CUSTOMER_WISHLIST, CustomerWishlistData, CustomerWishlistVariables, LAYOUT, LayoutData,
    LayoutVariables, PAGE_BY_HANDLE, PRODUCTS_BY_IDS, PageByHandleData, PageByHandleVariables,
    ProductsByIdsData, ProductsByIdsVariables,
};

// Private access tokens use a different header than public tokens
// See: https://shopify.dev/docs/storefronts/headless/building-with-the-storefront-api/getting-started
const PRIVATE_TOKEN_HEADER: &str = "Shopify-Storefront-Private-Token";

/// Shopify rejects `nodes(ids:)` lookups with more IDs than this.
const MAX_NODES_PER_QUERY: usize = 250;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
#[derive(Clone)]
pub struct StorefrontClient {
    graphql: GraphQLClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let endpoint = format!(
            "https://{}/api/{}/graphql.json",
            config.store, config.api_version
        );

        Self::with_endpoint(endpoint, config.storefront_private_token.clone())
    }

    fn with_endpoint(endpoint: String, token: SecretString) -> Result<Self, ShopifyError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            graphql: GraphQLClient::new(endpoint, PRIVATE_TOKEN_HEADER, token)?,
            cache,
        })
    }
}

#[async_trait]
impl StorefrontApi for StorefrontClient {
    #[instrument(skip(self), fields(handle = %handle))]
    async fn page_by_handle(&self, handle: &str) -> Result<Option<Page>, ShopifyError> {
        let cache_key = CacheKey::Page(handle.to_string());

        if let Some(CacheValue::Page(page)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for page");
            return Ok(Some(*page));
        }

        let data: PageByHandleData = self
            .graphql
            .query(
                PAGE_BY_HANDLE,
                "PageByHandle",
                PageByHandleVariables { handle },
            )
            .await?;

        // Missing pages are not cached so a newly published page shows up at once
        let Some(node) = data.page else {
            return Ok(None);
        };

        let page = convert_page(node);

        self.cache
            .insert(cache_key, CacheValue::Page(Box::new(page.clone())))
            .await;

        Ok(Some(page))
    }

    #[instrument(skip(self), fields(menu = %footer_menu_handle))]
    async fn layout(&self, footer_menu_handle: &str) -> Result<Layout, ShopifyError> {
        let cache_key = CacheKey::Layout(footer_menu_handle.to_string());

        if let Some(CacheValue::Layout(layout)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for layout");
            return Ok(*layout);
        }

        let data: LayoutData = self
            .graphql
            .query(LAYOUT, "Layout", LayoutVariables { footer_menu_handle })
            .await?;

        let layout = convert_layout(data);

        self.cache
            .insert(cache_key, CacheValue::Layout(Box::new(layout.clone())))
            .await;

        Ok(layout)
    }

    #[instrument(skip(self, access_token))]
    async fn customer_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<Customer>, ShopifyError> {
        let data: CustomerWishlistData = self
            .graphql
            .query(
                CUSTOMER_WISHLIST,
                "CustomerWishlist",
                CustomerWishlistVariables {
                    customer_access_token: access_token,
                },
            )
            .await?;

        Ok(data.customer.map(convert_customer))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, ShopifyError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut products = Vec::with_capacity(ids.len());
        for batch in ids.chunks(MAX_NODES_PER_QUERY) {
            let data: ProductsByIdsData = self
                .graphql
                .query(
                    PRODUCTS_BY_IDS,
                    "ProductsByIds",
                    ProductsByIdsVariables { ids: batch },
                )
                .await?;

            products.extend(convert_products(data)?);
        }

        Ok(products)
    }
}
