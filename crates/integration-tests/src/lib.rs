//! Integration tests for the Larkspur storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests (in-process, fake Shopify clients)
//! cargo test -p larkspur-integration-tests
//!
//! # Live smoke tests against a running storefront
//! STOREFRONT_URL=http://localhost:3000 cargo test -p larkspur-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_pages` - CMS pages, footer links, security headers
//! - `storefront_newsletter` - signup flow, HTMX fragments, rate limiting
//! - `storefront_wishlist` - login redirect and product cards
//! - `storefront_live` - smoke tests against a running server (ignored by default)
//!
//! The helpers here build the real router from `larkspur_storefront` with
//! in-memory [`FakeStorefront`] and [`FakeAdmin`] clients.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
    routing::{get, post},
};
use larkspur_core::{Email, MarketingState};
use larkspur_storefront::{
    config::{ShopifyConfig, SiteConfig, StorefrontConfig},
    content::TrustedHtml,
    middleware::{create_session_layer, session::SESSION_COOKIE_NAME},
    models::{CustomerSession, keys},
    routes,
    shopify::{
        AdminApi, Customer, CustomerAccessToken, EmailMarketingConsent,
        EmailMarketingConsentInput, GraphQLError, Layout, Menu, MenuItem, Metafield, Money, Page,
        Product, ProductVariant, Seo, SelectedOption, Shop, ShopifyError, StorefrontApi,
        Subscriber, UserError,
    },
    state::AppState,
};
use secrecy::SecretString;
use tower::ServiceExt;
use tower_sessions::Session;

/// Client address sent with newsletter posts so the rate limiter can key them.
pub const TEST_CLIENT_IP: &str = "203.0.113.7";

/// Contact address configured for the test site.
pub const CONTACT_EMAIL: &str = "hello@larkspur.test";

/// Configuration pointing at a store that is never contacted.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        site: SiteConfig {
            name: "Larkspur".to_string(),
            footer_menu_handle: "footer".to_string(),
            contact_email: Some(CONTACT_EMAIL.to_string()),
            internal_hosts: vec!["journal.larkspur.test".to_string()],
        },
        shopify: ShopifyConfig {
            store: "larkspur.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            storefront_private_token: SecretString::from("integration-test-storefront"),
            admin_access_token: SecretString::from("integration-test-admin"),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Application state backed by the given fakes.
#[must_use]
pub fn test_state(storefront: Arc<FakeStorefront>, admin: Arc<FakeAdmin>) -> AppState {
    AppState::with_clients(test_config(), storefront, admin)
}

/// The full production router over the given fakes.
#[must_use]
pub fn test_app(storefront: Arc<FakeStorefront>, admin: Arc<FakeAdmin>) -> Router {
    larkspur_storefront::app(test_state(storefront, admin))
}

/// Storefront routes plus two helpers that stand in for the login flow:
///
/// - `POST /test/login` stores the JSON [`CustomerAccessToken`] in the session
/// - `GET /test/token` returns the session's token (or `null`)
#[must_use]
pub fn test_app_with_login(storefront: Arc<FakeStorefront>, admin: Arc<FakeAdmin>) -> Router {
    let state = test_state(storefront, admin);
    let session_layer = create_session_layer(state.config());

    routes::routes()
        .route("/test/login", post(seed_login))
        .route("/test/token", get(current_token))
        .layer(session_layer)
        .with_state(state)
}

async fn seed_login(session: Session, Json(token): Json<CustomerAccessToken>) -> StatusCode {
    match session.insert(keys::CUSTOMER_ACCESS_TOKEN, token).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn current_token(session: Session) -> Json<Option<CustomerAccessToken>> {
    Json(session.customer_access_token().await.ok().flatten())
}

// =============================================================================
// Request helpers
// =============================================================================

/// Send a request through the router and return the response.
///
/// # Panics
///
/// Panics if the router fails, which axum routers never do.
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

/// `GET path`, optionally with a session cookie.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn get_request(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Form `POST /newsletter` from [`TEST_CLIENT_IP`].
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn newsletter_request(email: &str, htmx: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/newsletter")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", TEST_CLIENT_IP);
    if htmx {
        builder = builder.header("hx-request", "true");
    }
    let body = format!("email={}", urlencoding::encode(email));
    builder.body(Body::from(body)).expect("valid request")
}

/// JSON `POST /test/login` with the given token.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn login_request(token: &CustomerAccessToken) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/test/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(token).expect("token serializes"),
        ))
        .expect("valid request")
}

/// The `name=value` pair of the session cookie set by `response`.
#[must_use]
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(str::to_string)
}

/// Read the whole response body as UTF-8.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("UTF-8 body")
}

// =============================================================================
// Fixtures
// =============================================================================

/// A published page.
#[must_use]
pub fn page(handle: &str, title: &str, body: &str) -> Page {
    Page {
        id: format!("gid://shopify/Page/{handle}"),
        handle: handle.to_string(),
        title: title.to_string(),
        body: TrustedHtml::from_operator_cms(body.to_string()),
        seo: Seo::default(),
        section: None,
    }
}

/// The footer menu used by most tests.
#[must_use]
pub fn footer_layout() -> Layout {
    let item = |id: &str, title: &str, url: Option<&str>| MenuItem {
        id: format!("gid://shopify/MenuItem/{id}"),
        title: title.to_string(),
        url: url.map(str::to_string),
    };

    Layout {
        shop: Shop {
            name: "Larkspur".to_string(),
            primary_domain_url: "https://www.larkspur.test".to_string(),
        },
        footer_menu: Some(Menu {
            id: "gid://shopify/Menu/1".to_string(),
            items: vec![
                item("1", "About", Some("https://www.larkspur.test/pages/about")),
                item("2", "Journal", Some("https://journal.larkspur.test/")),
                item("3", "Instagram", Some("https://instagram.com/larkspur")),
                item("4", "Email us", Some("mailto:hello@larkspur.test")),
                item("5", "Broken", Some("javascript:alert(1)")),
                item("6", "Unlinked", None),
            ],
        }),
    }
}

/// A product with one variant priced in USD.
#[must_use]
pub fn product(id: u64, handle: &str, title: &str, price: &str, compare_at: Option<&str>) -> Product {
    let money = |amount: &str| Money {
        amount: amount.to_string(),
        currency_code: "USD".to_string(),
    };

    Product {
        id: format!("gid://shopify/Product/{id}"),
        handle: handle.to_string(),
        title: title.to_string(),
        first_variant: Some(ProductVariant {
            id: format!("gid://shopify/ProductVariant/{id}0"),
            title: "Default Title".to_string(),
            available_for_sale: true,
            sku: None,
            price: money(price),
            compare_at_price: compare_at.map(money),
            image: None,
            selected_options: vec![SelectedOption {
                name: "Size".to_string(),
                value: "M".to_string(),
            }],
        }),
    }
}

/// A customer whose wishlist metafield holds `value`.
#[must_use]
pub fn customer_with_wishlist(value: &str) -> Customer {
    Customer {
        wishlist: Some(Metafield {
            key: "wishlist".to_string(),
            value: value.to_string(),
        }),
    }
}

/// A customer record in the given marketing state.
#[must_use]
pub fn subscriber(id: &str, email: &str, state: MarketingState) -> Subscriber {
    Subscriber {
        id: id.to_string(),
        email: Some(email.to_string()),
        email_marketing_consent: Some(EmailMarketingConsent {
            consent_updated_at: None,
            marketing_opt_in_level: None,
            marketing_state: state,
        }),
    }
}

// =============================================================================
// Fakes
// =============================================================================

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory Storefront API.
#[derive(Default)]
pub struct FakeStorefront {
    pages: Mutex<HashMap<String, Page>>,
    layout: Mutex<Option<Layout>>,
    customers: Mutex<HashMap<String, Customer>>,
    products: Mutex<Vec<Product>>,
    fail_customers: Mutex<bool>,
    product_requests: Mutex<Vec<Vec<String>>>,
}

impl FakeStorefront {
    /// A store with the footer menu and no pages.
    #[must_use]
    pub fn new() -> Self {
        let fake = Self::default();
        *lock(&fake.layout) = Some(footer_layout());
        fake
    }

    /// Publish a page.
    #[must_use]
    pub fn with_page(self, page: Page) -> Self {
        lock(&self.pages).insert(page.handle.clone(), page);
        self
    }

    /// Make every layout query fail.
    #[must_use]
    pub fn without_layout(self) -> Self {
        *lock(&self.layout) = None;
        self
    }

    /// Register a customer behind an access token.
    #[must_use]
    pub fn with_customer(self, access_token: &str, customer: Customer) -> Self {
        lock(&self.customers).insert(access_token.to_string(), customer);
        self
    }

    /// Add a product to the catalogue.
    #[must_use]
    pub fn with_product(self, product: Product) -> Self {
        lock(&self.products).push(product);
        self
    }

    /// Make every customer query fail as a transport error.
    #[must_use]
    pub fn failing_customers(self) -> Self {
        *lock(&self.fail_customers) = true;
        self
    }

    /// IDs passed to each `products_by_ids` call.
    #[must_use]
    pub fn product_requests(&self) -> Vec<Vec<String>> {
        lock(&self.product_requests).clone()
    }
}

#[async_trait]
impl StorefrontApi for FakeStorefront {
    async fn page_by_handle(&self, handle: &str) -> Result<Option<Page>, ShopifyError> {
        Ok(lock(&self.pages).get(handle).cloned())
    }

    async fn layout(&self, _footer_menu_handle: &str) -> Result<Layout, ShopifyError> {
        lock(&self.layout)
            .clone()
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("layout unavailable")]))
    }

    async fn customer_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<Customer>, ShopifyError> {
        if *lock(&self.fail_customers) {
            return Err(ShopifyError::RateLimited(2));
        }
        Ok(lock(&self.customers).get(access_token).cloned())
    }

    async fn products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, ShopifyError> {
        lock(&self.product_requests).push(ids.to_vec());
        let products = lock(&self.products);
        Ok(ids
            .iter()
            .filter_map(|id| products.iter().find(|p| &p.id == id).cloned())
            .collect())
    }
}

/// What the fake Admin API was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
    Find(String),
    Create(String, MarketingState),
    Update(String, MarketingState),
}

/// In-memory Admin API.
#[derive(Default)]
pub struct FakeAdmin {
    customers: Mutex<Vec<Subscriber>>,
    reject_with: Mutex<Option<UserError>>,
    calls: Mutex<Vec<AdminCall>>,
}

impl FakeAdmin {
    /// An Admin API with no customers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing customer.
    #[must_use]
    pub fn with_customer(self, customer: Subscriber) -> Self {
        lock(&self.customers).push(customer);
        self
    }

    /// Reject every mutation with this user error.
    #[must_use]
    pub fn rejecting(self, error: UserError) -> Self {
        *lock(&self.reject_with) = Some(error);
        self
    }

    /// Calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<AdminCall> {
        lock(&self.calls).clone()
    }

    fn rejection(&self) -> Option<ShopifyError> {
        lock(&self.reject_with)
            .clone()
            .map(|error| ShopifyError::UserErrors(vec![error]))
    }
}

#[async_trait]
impl AdminApi for FakeAdmin {
    async fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Subscriber>, ShopifyError> {
        lock(&self.calls).push(AdminCall::Find(email.as_str().to_string()));
        Ok(lock(&self.customers)
            .iter()
            .find(|c| c.email.as_deref() == Some(email.as_str()))
            .cloned())
    }

    async fn create_subscriber(
        &self,
        email: &Email,
        consent: &EmailMarketingConsentInput,
    ) -> Result<Subscriber, ShopifyError> {
        lock(&self.calls).push(AdminCall::Create(
            email.as_str().to_string(),
            consent.marketing_state,
        ));
        if let Some(error) = self.rejection() {
            return Err(error);
        }

        let mut customers = lock(&self.customers);
        let created = subscriber(
            &format!("gid://shopify/Customer/{}", customers.len() + 1),
            email.as_str(),
            consent.marketing_state,
        );
        customers.push(created.clone());
        Ok(created)
    }

    async fn update_email_marketing_consent(
        &self,
        customer_id: &str,
        consent: &EmailMarketingConsentInput,
    ) -> Result<Subscriber, ShopifyError> {
        lock(&self.calls).push(AdminCall::Update(
            customer_id.to_string(),
            consent.marketing_state,
        ));
        if let Some(error) = self.rejection() {
            return Err(error);
        }

        let mut customers = lock(&self.customers);
        let customer = customers
            .iter_mut()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("customer not found")]))?;
        customer.email_marketing_consent = Some(EmailMarketingConsent {
            consent_updated_at: Some(consent.consent_updated_at.clone()),
            marketing_opt_in_level: Some(consent.marketing_opt_in_level),
            marketing_state: consent.marketing_state,
        });
        Ok(customer.clone())
    }
}
