//! Smoke tests against a running storefront.
//!
//! These tests require a storefront connected to a real Shopify store:
//! `cargo run -p larkspur-storefront`
//!
//! Run with: `cargo test -p larkspur-integration-tests --test storefront_live -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode, redirect::Policy};

fn base_url() -> String {
    std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health() {
    let response = client()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_page_is_404() {
    let response = client()
        .get(format!("{}/pages/this-page-does-not-exist-7f3c", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("content-security-policy"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_wishlist_requires_login() {
    let response = client()
        .get(format!("{}/wishlist", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/account/login"
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_newsletter_rejects_invalid_email() {
    let response = client()
        .post(format!("{}/newsletter", base_url()))
        .form(&[("email", "not-an-email")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["subscriber"].is_null());
    assert_eq!(body["error"]["message"], "Please enter a valid email address.");
}
