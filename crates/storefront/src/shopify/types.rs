//! Domain types for the Shopify Storefront and Admin APIs.
//!
//! These are the shapes handlers and templates work with. Raw GraphQL
//! response structs live next to their queries and are converted into these.

use chrono::{DateTime, SecondsFormat, Utc};
use larkspur_core::{MarketingOptInLevel, MarketingState, Price};
use serde::{Deserialize, Serialize};

use crate::content::TrustedHtml;

// =============================================================================
// Money & Image Types
// =============================================================================

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Human-readable price, e.g. `$19.99`.
    ///
    /// Currencies without a known symbol fall back to `19.99 JPY`.
    #[must_use]
    pub fn display(&self) -> String {
        Price::parse(&self.amount, &self.currency_code).map_or_else(
            |_| format!("{} {}", self.amount, self.currency_code),
            |price| price.display(),
        )
    }
}

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Shopify image ID.
    pub id: Option<String>,
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

/// SEO metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    /// Page title for search engines.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
}

/// A custom data field attached to a page or customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafield {
    /// Metafield key within its namespace.
    pub key: String,
    /// Raw value; its format depends on the metafield definition.
    pub value: String,
}

// =============================================================================
// Product Types
// =============================================================================

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: String,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// SKU code.
    pub sku: Option<String>,
    /// Current price.
    pub price: Money,
    /// Compare-at price (original price if on sale).
    pub compare_at_price: Option<Money>,
    /// Variant image.
    pub image: Option<Image>,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
}

/// A product as shown in the wishlist: identity plus its first variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// First variant, if the product has any.
    pub first_variant: Option<ProductVariant>,
}

// =============================================================================
// Content Types
// =============================================================================

/// A CMS page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Page title.
    pub title: String,
    /// Pre-rendered body markup authored in the Shopify admin.
    pub body: TrustedHtml,
    /// SEO metadata.
    pub seo: Seo,
    /// The `custom.section` metafield, when set.
    pub section: Option<Metafield>,
}

/// A navigation menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Menu item ID.
    pub id: String,
    /// Link text.
    pub title: String,
    /// Target URL; Shopify omits it for some item types.
    pub url: Option<String>,
}

/// A navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    /// Menu ID.
    pub id: String,
    /// Top-level items in display order.
    pub items: Vec<MenuItem>,
}

/// Shop-wide settings used by the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    /// Shop name.
    pub name: String,
    /// Primary domain URL (e.g., `https://larkspur.com`).
    pub primary_domain_url: String,
}

/// Data fetched once per page for the shared layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Shop settings.
    pub shop: Shop,
    /// Footer menu, if the configured handle exists.
    pub footer_menu: Option<Menu>,
}

// =============================================================================
// Customer Types
// =============================================================================

/// A logged-in storefront customer, reduced to what the wishlist needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// The `custom.wishlist` metafield, when set.
    pub wishlist: Option<Metafield>,
}

/// Storefront customer access token kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccessToken {
    /// Token sent as `customerAccessToken` to the Storefront API.
    pub access_token: String,
    /// Expiry reported by Shopify when the token was issued.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CustomerAccessToken {
    /// Whether this token can still authenticate a request at `now`.
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.trim().is_empty() && self.expires_at.is_none_or(|at| at > now)
    }
}

/// Email marketing consent as returned by the Admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMarketingConsent {
    /// When consent last changed (ISO 8601).
    pub consent_updated_at: Option<String>,
    /// How the customer opted in.
    pub marketing_opt_in_level: Option<MarketingOptInLevel>,
    /// Current consent state.
    pub marketing_state: MarketingState,
}

/// A customer record as seen by the newsletter flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    /// Customer GID.
    pub id: String,
    /// Email address on file.
    pub email: Option<String>,
    /// Email marketing consent, absent for customers without an email.
    pub email_marketing_consent: Option<EmailMarketingConsent>,
}

impl Subscriber {
    /// Marketing state, treating a missing consent record as not subscribed.
    #[must_use]
    pub fn marketing_state(&self) -> MarketingState {
        self.email_marketing_consent
            .as_ref()
            .map_or(MarketingState::NotSubscribed, |consent| {
                consent.marketing_state
            })
    }
}

/// Consent payload sent with `customerCreate` and
/// `customerEmailMarketingConsentUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMarketingConsentInput {
    /// Time the visitor submitted the form (ISO 8601, UTC).
    pub consent_updated_at: String,
    /// Opt-in level recorded with the consent.
    pub marketing_opt_in_level: MarketingOptInLevel,
    /// Requested state.
    pub marketing_state: MarketingState,
}

impl EmailMarketingConsentInput {
    /// Single opt-in subscription consent given at `now`.
    #[must_use]
    pub fn subscribed_at(now: DateTime<Utc>) -> Self {
        Self {
            consent_updated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            marketing_opt_in_level: MarketingOptInLevel::SingleOptIn,
            marketing_state: MarketingState::Subscribed,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn test_money_display() {
        let money = Money {
            amount: "24.5".to_string(),
            currency_code: "USD".to_string(),
        };
        assert_eq!(money.display(), "$24.50");

        let yen = Money {
            amount: "1200.0".to_string(),
            currency_code: "JPY".to_string(),
        };
        assert_eq!(yen.display(), "1200.0 JPY");
    }

    #[test]
    fn test_subscriber_deserializes_admin_shape() {
        let json = serde_json::json!({
            "id": "gid://shopify/Customer/1",
            "email": "reader@example.com",
            "emailMarketingConsent": {
                "consentUpdatedAt": "2026-01-05T10:00:00Z",
                "marketingOptInLevel": "SINGLE_OPT_IN",
                "marketingState": "SUBSCRIBED"
            }
        });
        let subscriber: Subscriber = serde_json::from_value(json).unwrap();
        assert_eq!(subscriber.marketing_state(), MarketingState::Subscribed);
    }

    #[test]
    fn test_subscriber_without_consent_is_not_subscribed() {
        let json = serde_json::json!({
            "id": "gid://shopify/Customer/2",
            "email": null,
            "emailMarketingConsent": null
        });
        let subscriber: Subscriber = serde_json::from_value(json).unwrap();
        assert_eq!(subscriber.marketing_state(), MarketingState::NotSubscribed);
    }

    #[test]
    fn test_consent_input_serializes_for_shopify() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let input = EmailMarketingConsentInput::subscribed_at(now);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "consentUpdatedAt": "2026-03-01T12:30:00Z",
                "marketingOptInLevel": "SINGLE_OPT_IN",
                "marketingState": "SUBSCRIBED"
            })
        );
    }

    #[test]
    fn test_customer_access_token_usable() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let token = |value: &str, expires_at| CustomerAccessToken {
            access_token: value.to_string(),
            expires_at,
        };

        assert!(token("abc", None).is_usable(now));
        assert!(token("abc", Some(now + Duration::hours(1))).is_usable(now));
        assert!(!token("abc", Some(now - Duration::seconds(1))).is_usable(now));
        assert!(!token("  ", None).is_usable(now));
    }
}
