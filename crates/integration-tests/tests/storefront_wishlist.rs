//! Router tests for the wishlist page.
//!
//! A `/test/login` helper route seeds the customer access token that the
//! account login flow would normally store.
//!
//! Run with: `cargo test -p larkspur-integration-tests --test storefront_wishlist`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    http::{StatusCode, header},
};
use chrono::{Duration, Utc};
use larkspur_integration_tests::{
    FakeAdmin, FakeStorefront, body_string, customer_with_wishlist, get_request, login_request,
    product, send, session_cookie, test_app, test_app_with_login,
};
use larkspur_storefront::shopify::CustomerAccessToken;

const TOKEN: &str = "d2f6a1c0e9b84f7e";

fn token(expires_in: Duration) -> CustomerAccessToken {
    CustomerAccessToken {
        access_token: TOKEN.to_string(),
        expires_at: Some(Utc::now() + expires_in),
    }
}

async fn log_in(app: &Router, token: &CustomerAccessToken) -> String {
    let response = send(app, login_request(token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    session_cookie(&response).unwrap()
}

async fn session_token(app: &Router, cookie: &str) -> Option<CustomerAccessToken> {
    let body = body_string(send(app, get_request("/test/token", Some(cookie))).await).await;
    serde_json::from_str(&body).unwrap()
}

fn catalogue() -> FakeStorefront {
    FakeStorefront::new()
        .with_product(product(1, "linen-shirt", "Linen Shirt", "48.00", Some("60.00")))
        .with_product(product(2, "field-hat", "Field Hat", "32.00", None))
}

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let app = test_app(Arc::new(FakeStorefront::new()), Arc::new(FakeAdmin::new()));

    let response = send(&app, get_request("/wishlist", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/account/login"
    );
}

#[tokio::test]
async fn test_expired_token_is_cleared() {
    let store = Arc::new(FakeStorefront::new().with_customer(TOKEN, customer_with_wishlist("[]")));
    let app = test_app_with_login(store, Arc::new(FakeAdmin::new()));
    let cookie = log_in(&app, &token(-Duration::minutes(5))).await;

    let response = send(&app, get_request("/wishlist", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/account/login"
    );

    assert!(session_token(&app, &cookie).await.is_none());
}

#[tokio::test]
async fn test_unknown_customer_is_cleared() {
    let app = test_app_with_login(Arc::new(FakeStorefront::new()), Arc::new(FakeAdmin::new()));
    let cookie = log_in(&app, &token(Duration::days(1))).await;

    let response = send(&app, get_request("/wishlist", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(session_token(&app, &cookie).await.is_none());
}

#[tokio::test]
async fn test_shopify_failure_keeps_visitor_logged_in() {
    let store = Arc::new(FakeStorefront::new().failing_customers());
    let app = test_app_with_login(store, Arc::new(FakeAdmin::new()));
    let cookie = log_in(&app, &token(Duration::days(1))).await;

    let response = send(&app, get_request("/wishlist", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_string(response).await, "External service error");

    assert_eq!(
        session_token(&app, &cookie).await.unwrap().access_token,
        TOKEN
    );
}

#[tokio::test]
async fn test_wishlist_renders_saved_products() {
    let store = Arc::new(catalogue().with_customer(
        TOKEN,
        customer_with_wishlist(r#"["gid://shopify/Product/2", "gid://shopify/Product/1"]"#),
    ));
    let app = test_app_with_login(store.clone(), Arc::new(FakeAdmin::new()));
    let cookie = log_in(&app, &token(Duration::days(1))).await;

    let response = send(&app, get_request("/wishlist", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );

    let html = body_string(response).await;
    let hat = html.find("Field Hat").unwrap();
    let shirt = html.find("Linen Shirt").unwrap();
    assert!(hat < shirt, "products keep wishlist order");

    assert!(html.contains(r#"href="/products/linen-shirt?Size=M""#));
    assert!(html.contains("product-card__badge"));
    assert!(html.contains("<s class=\"product-card__compare-at\">$60.00</s>"));
    assert!(html.contains("$32.00"));

    assert_eq!(
        store.product_requests(),
        vec![vec![
            "gid://shopify/Product/2".to_string(),
            "gid://shopify/Product/1".to_string(),
        ]]
    );
}

#[tokio::test]
async fn test_empty_wishlist_skips_product_lookup() {
    let store = Arc::new(catalogue().with_customer(TOKEN, customer_with_wishlist("[]")));
    let app = test_app_with_login(store.clone(), Arc::new(FakeAdmin::new()));
    let cookie = log_in(&app, &token(Duration::days(1))).await;

    let response = send(&app, get_request("/wishlist", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Your wishlist is empty"));
    assert!(store.product_requests().is_empty());
}

#[tokio::test]
async fn test_malformed_wishlist_renders_empty() {
    let store = Arc::new(catalogue().with_customer(TOKEN, customer_with_wishlist("{not json")));
    let app = test_app_with_login(store, Arc::new(FakeAdmin::new()));
    let cookie = log_in(&app, &token(Duration::days(1))).await;

    let response = send(&app, get_request("/wishlist", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Your wishlist is empty"));
}
