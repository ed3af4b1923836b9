//! Conversions from raw Storefront responses into domain types.

use tracing::debug;

use crate::content::TrustedHtml;
use crate::shopify::ShopifyError;
use crate::shopify::types::{
    Customer, Layout, Menu, MenuItem, Page, Product, ProductVariant, Shop,
};

use super::queries::{
    CustomerNode, LayoutData, PageNode, ProductNode, ProductsByIdsData, VariantNode,
};

const SECTION_METAFIELD_KEY: &str = "section";

pub fn convert_page(node: PageNode) -> Page {
    let section = node
        .metafields
        .into_iter()
        .flatten()
        .find(|m| m.key == SECTION_METAFIELD_KEY && !m.value.trim().is_empty());

    Page {
        id: node.id,
        handle: node.handle,
        title: node.title,
        body: TrustedHtml::from_operator_cms(node.body),
        seo: node.seo.unwrap_or_default(),
        section,
    }
}

pub fn convert_layout(data: LayoutData) -> Layout {
    Layout {
        shop: Shop {
            name: data.shop.name,
            primary_domain_url: data.shop.primary_domain.url,
        },
        footer_menu: data.menu.map(|menu| Menu {
            id: menu.id,
            items: menu
                .items
                .into_iter()
                .map(|item| MenuItem {
                    id: item.id,
                    title: item.title,
                    url: item.url,
                })
                .collect(),
        }),
    }
}

pub fn convert_customer(node: CustomerNode) -> Customer {
    Customer {
        wishlist: node.wishlist,
    }
}

/// Keep `Product` nodes in request order, dropping `null`s and other node types.
///
/// # Errors
///
/// Returns [`ShopifyError::Parse`] if a node claims to be a `Product` but does
/// not match the selection set.
pub fn convert_products(data: ProductsByIdsData) -> Result<Vec<Product>, ShopifyError> {
    let mut products = Vec::with_capacity(data.nodes.len());

    for node in data.nodes.into_iter().flatten() {
        let typename = node
            .get("__typename")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();

        if typename != "Product" {
            debug!(typename, "Skipping non-product node");
            continue;
        }

        let product: ProductNode = serde_json::from_value(node)?;
        products.push(convert_product(product));
    }

    Ok(products)
}

fn convert_product(node: ProductNode) -> Product {
    Product {
        id: node.id,
        handle: node.handle,
        title: node.title,
        first_variant: node.variants.nodes.into_iter().next().map(convert_variant),
    }
}

fn convert_variant(node: VariantNode) -> ProductVariant {
    ProductVariant {
        id: node.id,
        title: node.title,
        available_for_sale: node.available_for_sale,
        sku: node.sku,
        price: node.price,
        compare_at_price: node.compare_at_price,
        image: node.image,
        selected_options: node.selected_options,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::storefront::queries::PageByHandleData;

    #[test]
    fn test_convert_page_picks_section_metafield() {
        let data: PageByHandleData = serde_json::from_value(serde_json::json!({
            "page": {
                "id": "gid://shopify/Page/1",
                "handle": "about",
                "title": "About",
                "body": "<p>Hello</p>",
                "seo": {"title": null, "description": "About us"},
                "metafields": [{"key": "section", "value": "Story Grid"}]
            }
        }))
        .unwrap();

        let page = convert_page(data.page.unwrap());
        assert_eq!(page.body.as_str(), "<p>Hello</p>");
        assert_eq!(page.seo.description.as_deref(), Some("About us"));
        assert_eq!(page.section.unwrap().value, "Story Grid");
    }

    #[test]
    fn test_convert_page_without_section() {
        let data: PageByHandleData = serde_json::from_value(serde_json::json!({
            "page": {
                "id": "gid://shopify/Page/2",
                "handle": "faq",
                "title": "FAQ",
                "body": "",
                "seo": null,
                "metafields": [null]
            }
        }))
        .unwrap();

        let page = convert_page(data.page.unwrap());
        assert!(page.section.is_none());
        assert_eq!(page.seo, crate::shopify::types::Seo::default());
    }

    #[test]
    fn test_convert_products_skips_nulls_and_other_types() {
        let data: ProductsByIdsData = serde_json::from_value(serde_json::json!({
            "nodes": [
                null,
                {"__typename": "Collection"},
                {
                    "__typename": "Product",
                    "id": "gid://shopify/Product/7",
                    "handle": "linen-shirt",
                    "title": "Linen Shirt",
                    "variants": {"nodes": [{
                        "id": "gid://shopify/ProductVariant/70",
                        "title": "S / Sand",
                        "availableForSale": true,
                        "sku": null,
                        "price": {"amount": "48.0", "currencyCode": "USD"},
                        "compareAtPrice": null,
                        "image": null,
                        "selectedOptions": [{"name": "Size", "value": "S"}]
                    }]}
                }
            ]
        }))
        .unwrap();

        let products = convert_products(data).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].handle, "linen-shirt");
        let variant = products[0].first_variant.as_ref().unwrap();
        assert_eq!(variant.price.display(), "$48.00");
    }

    #[test]
    fn test_convert_products_without_variants() {
        let data: ProductsByIdsData = serde_json::from_value(serde_json::json!({
            "nodes": [{
                "__typename": "Product",
                "id": "gid://shopify/Product/8",
                "handle": "gift-card",
                "title": "Gift Card",
                "variants": {"nodes": []}
            }]
        }))
        .unwrap();

        let products = convert_products(data).unwrap();
        assert!(products[0].first_variant.is_none());
    }
}
