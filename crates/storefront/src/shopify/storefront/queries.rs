//! GraphQL documents for the Shopify Storefront API and their raw response shapes.
//!
//! Response structs mirror the selection sets exactly; conversion into the
//! domain types in [`crate::shopify::types`] happens in `conversions`.

use serde::{Deserialize, Serialize};

use crate::shopify::types::{Image, Metafield, Money, Seo, SelectedOption};

pub const PAGE_BY_HANDLE: &str = include_str!("../../../graphql/storefront/page.graphql");
pub const LAYOUT: &str = include_str!("../../../graphql/storefront/layout.graphql");
pub const CUSTOMER_WISHLIST: &str = include_str!("../../../graphql/storefront/customer.graphql");
pub const PRODUCTS_BY_IDS: &str = include_str!("../../../graphql/storefront/products.graphql");

// =============================================================================
// Page
// =============================================================================

#[derive(Debug, Serialize)]
pub struct PageByHandleVariables<'a> {
    pub handle: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PageByHandleData {
    pub page: Option<PageNode>,
}

#[derive(Debug, Deserialize)]
pub struct PageNode {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub seo: Option<Seo>,
    /// One entry per requested identifier, `null` when unset.
    #[serde(default)]
    pub metafields: Vec<Option<Metafield>>,
}

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutVariables<'a> {
    pub footer_menu_handle: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LayoutData {
    pub shop: ShopNode,
    pub menu: Option<MenuNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopNode {
    pub name: String,
    pub primary_domain: DomainNode,
}

#[derive(Debug, Deserialize)]
pub struct DomainNode {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct MenuNode {
    pub id: String,
    pub items: Vec<MenuItemNode>,
}

#[derive(Debug, Deserialize)]
pub struct MenuItemNode {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWishlistVariables<'a> {
    pub customer_access_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CustomerWishlistData {
    pub customer: Option<CustomerNode>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerNode {
    pub wishlist: Option<Metafield>,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ProductsByIdsVariables<'a> {
    pub ids: &'a [String],
}

/// `nodes` returns any `Node`; entries are kept as raw JSON until their
/// `__typename` is known.
#[derive(Debug, Deserialize)]
pub struct ProductsByIdsData {
    pub nodes: Vec<Option<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub struct ProductNode {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variants: VariantConnection,
}

#[derive(Debug, Deserialize)]
pub struct VariantConnection {
    pub nodes: Vec<VariantNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub sku: Option<String>,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    pub image: Option<Image>,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}
