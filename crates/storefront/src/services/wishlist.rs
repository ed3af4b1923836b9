//! Wishlist loading for logged-in customers.
//!
//! The wishlist is a `custom.wishlist` customer metafield holding product
//! GIDs as JSON. Products are fetched in one `nodes(ids:)` request.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::models::{CustomerSession, SessionError};
use crate::shopify::{Metafield, Product, ShopifyError, StorefrontApi};

/// Result of loading the wishlist page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistOutcome {
    /// Wishlisted products in stored order.
    Loaded(Vec<Product>),
    /// The visitor is not (or no longer) logged in; the stale token was cleared.
    RedirectToLogin,
}

/// Failures that leave the customer logged in.
#[derive(Debug, Error)]
pub enum WishlistError {
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Load the wishlist of the customer logged in on `session`.
///
/// Only authentication failures log the visitor out: a missing, blank, or
/// expired token, or a token Shopify no longer recognises. Transport and
/// GraphQL failures are returned as errors and keep the token.
///
/// # Errors
///
/// Returns [`WishlistError`] if the session store or Shopify fails.
#[instrument(skip_all)]
pub async fn load_wishlist(
    storefront: &dyn StorefrontApi,
    session: &dyn CustomerSession,
    now: DateTime<Utc>,
) -> Result<WishlistOutcome, WishlistError> {
    let token = session
        .customer_access_token()
        .await?
        .filter(|token| token.is_usable(now));

    let Some(token) = token else {
        session.clear_customer_access_token().await?;
        return Ok(WishlistOutcome::RedirectToLogin);
    };

    let Some(customer) = storefront
        .customer_by_access_token(&token.access_token)
        .await?
    else {
        info!("Customer access token rejected; logging out");
        session.clear_customer_access_token().await?;
        return Ok(WishlistOutcome::RedirectToLogin);
    };

    let ids = customer
        .wishlist
        .as_ref()
        .map(wishlist_product_ids)
        .unwrap_or_default();

    if ids.is_empty() {
        return Ok(WishlistOutcome::Loaded(Vec::new()));
    }

    let products = storefront.products_by_ids(&ids).await?;
    Ok(WishlistOutcome::Loaded(products))
}

/// Stored wishlist formats: a bare array, or the object the account pages write.
#[derive(Deserialize)]
#[serde(untagged)]
enum WishlistValue {
    Ids(Vec<String>),
    Wrapped { wishlist: Vec<String> },
}

/// Product GIDs from a wishlist metafield, deduplicated in stored order.
///
/// Malformed values are logged and treated as an empty wishlist.
#[must_use]
pub fn wishlist_product_ids(metafield: &Metafield) -> Vec<String> {
    if metafield.value.trim().is_empty() {
        return Vec::new();
    }

    let ids = match serde_json::from_str::<WishlistValue>(&metafield.value) {
        Ok(WishlistValue::Ids(ids) | WishlistValue::Wrapped { wishlist: ids }) => ids,
        Err(e) => {
            warn!(error = %e, "Malformed wishlist metafield; showing empty wishlist");
            return Vec::new();
        }
    };

    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        if !id.is_empty() && !unique.iter().any(|seen| seen == id) {
            unique.push(id.to_string());
        }
    }
    unique
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use larkspur_core::MarketingState;

    use super::*;
    use crate::shopify::{Customer, CustomerAccessToken, GraphQLError, Layout, Page};

    fn metafield(value: &str) -> Metafield {
        Metafield {
            key: "wishlist".to_string(),
            value: value.to_string(),
        }
    }

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            handle: "linen-shirt".to_string(),
            title: "Linen Shirt".to_string(),
            first_variant: None,
        }
    }

    #[derive(Default)]
    struct FakeStorefront {
        customer: Option<Customer>,
        customer_fails: bool,
        requested_ids: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl StorefrontApi for FakeStorefront {
        async fn page_by_handle(&self, _handle: &str) -> Result<Option<Page>, ShopifyError> {
            Ok(None)
        }

        async fn layout(&self, _footer_menu_handle: &str) -> Result<Layout, ShopifyError> {
            Err(ShopifyError::GraphQL(vec![]))
        }

        async fn customer_by_access_token(
            &self,
            _access_token: &str,
        ) -> Result<Option<Customer>, ShopifyError> {
            if self.customer_fails {
                return Err(ShopifyError::GraphQL(vec![GraphQLError::message("timeout")]));
            }
            Ok(self.customer.clone())
        }

        async fn products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, ShopifyError> {
            self.requested_ids.lock().unwrap().push(ids.to_vec());
            Ok(ids.iter().map(|id| product(id)).collect())
        }
    }

    struct FakeSession {
        token: Mutex<Option<CustomerAccessToken>>,
    }

    impl FakeSession {
        fn with_token(token: Option<CustomerAccessToken>) -> Self {
            Self {
                token: Mutex::new(token),
            }
        }
    }

    #[async_trait]
    impl CustomerSession for FakeSession {
        async fn customer_access_token(
            &self,
        ) -> Result<Option<CustomerAccessToken>, SessionError> {
            Ok(self.token.lock().unwrap().clone())
        }

        async fn clear_customer_access_token(&self) -> Result<(), SessionError> {
            *self.token.lock().unwrap() = None;
            Ok(())
        }

        async fn marketing_state(&self) -> Result<Option<MarketingState>, SessionError> {
            Ok(None)
        }

        async fn set_marketing_state(&self, _state: MarketingState) -> Result<(), SessionError> {
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    fn token(expires_at: Option<DateTime<Utc>>) -> CustomerAccessToken {
        CustomerAccessToken {
            access_token: "customer-token".to_string(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_missing_token_redirects() {
        let storefront = FakeStorefront::default();
        let session = FakeSession::with_token(None);

        let outcome = load_wishlist(&storefront, &session, now()).await.unwrap();
        assert_eq!(outcome, WishlistOutcome::RedirectToLogin);
    }

    #[tokio::test]
    async fn test_expired_token_is_cleared() {
        let storefront = FakeStorefront::default();
        let session = FakeSession::with_token(Some(token(Some(now() - Duration::minutes(1)))));

        let outcome = load_wishlist(&storefront, &session, now()).await.unwrap();
        assert_eq!(outcome, WishlistOutcome::RedirectToLogin);
        assert!(session.token.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_token_is_cleared() {
        let storefront = FakeStorefront::default();
        let session = FakeSession::with_token(Some(token(None)));

        let outcome = load_wishlist(&storefront, &session, now()).await.unwrap();
        assert_eq!(outcome, WishlistOutcome::RedirectToLogin);
        assert!(session.token.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_token() {
        let storefront = FakeStorefront {
            customer_fails: true,
            ..FakeStorefront::default()
        };
        let session = FakeSession::with_token(Some(token(None)));

        let err = load_wishlist(&storefront, &session, now()).await.unwrap_err();
        assert!(matches!(err, WishlistError::Shopify(_)));
        assert!(session.token.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_loads_products_in_one_request() {
        let storefront = FakeStorefront {
            customer: Some(Customer {
                wishlist: Some(metafield(
                    r#"{"wishlist":["gid://shopify/Product/1","gid://shopify/Product/2"]}"#,
                )),
            }),
            ..FakeStorefront::default()
        };
        let session = FakeSession::with_token(Some(token(Some(now() + Duration::days(1)))));

        let outcome = load_wishlist(&storefront, &session, now()).await.unwrap();
        let WishlistOutcome::Loaded(products) = outcome else {
            panic!("expected products");
        };
        assert_eq!(products.len(), 2);
        assert_eq!(storefront.requested_ids.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_wishlist_skips_product_lookup() {
        let storefront = FakeStorefront {
            customer: Some(Customer { wishlist: None }),
            ..FakeStorefront::default()
        };
        let session = FakeSession::with_token(Some(token(None)));

        let outcome = load_wishlist(&storefront, &session, now()).await.unwrap();
        assert_eq!(outcome, WishlistOutcome::Loaded(Vec::new()));
        assert!(storefront.requested_ids.lock().unwrap().is_empty());
    }

    #[test]
    fn test_wishlist_product_ids_formats() {
        assert_eq!(
            wishlist_product_ids(&metafield(r#"["gid://shopify/Product/1"]"#)),
            vec!["gid://shopify/Product/1"]
        );
        assert_eq!(
            wishlist_product_ids(&metafield(
                r#"{"wishlist":["gid://shopify/Product/2","gid://shopify/Product/2"," "]}"#
            )),
            vec!["gid://shopify/Product/2"]
        );
        assert!(wishlist_product_ids(&metafield("")).is_empty());
        assert!(wishlist_product_ids(&metafield("{not json")).is_empty());
        assert!(wishlist_product_ids(&metafield(r#"{"items":[]}"#)).is_empty());
    }
}
