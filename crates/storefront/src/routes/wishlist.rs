//! Wishlist route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::header::CACHE_CONTROL,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::layout::LayoutView;
use crate::services::wishlist::{WishlistOutcome, load_wishlist};
use crate::shopify::{Product, SelectedOption};
use crate::state::AppState;

/// Where visitors without a valid customer session are sent.
pub const LOGIN_PATH: &str = "/account/login";

/// Wishlist responses are per-customer and must never be cached.
pub const WISHLIST_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// Image display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Product card display data, built from the product's first variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub title: String,
    pub url: String,
    pub image: Option<ImageView>,
    pub price: Option<String>,
    pub compare_at_price: Option<String>,
    pub on_sale: bool,
    pub available: bool,
}

impl From<Product> for ProductCardView {
    fn from(product: Product) -> Self {
        let Some(variant) = product.first_variant else {
            return Self {
                url: variant_url(&product.handle, &[]),
                title: product.title,
                image: None,
                price: None,
                compare_at_price: None,
                on_sale: false,
                available: false,
            };
        };

        let compare_at_price = variant.compare_at_price.as_ref().map(|m| m.display());

        Self {
            url: variant_url(&product.handle, &variant.selected_options),
            image: variant.image.map(|image| ImageView {
                alt: image
                    .alt_text
                    .filter(|alt| !alt.trim().is_empty())
                    .unwrap_or_else(|| product.title.clone()),
                url: image.url,
                width: image.width,
                height: image.height,
            }),
            price: Some(variant.price.display()),
            on_sale: compare_at_price.is_some(),
            compare_at_price,
            available: variant.available_for_sale,
            title: product.title,
        }
    }
}

/// Product page URL preselecting a variant: `/products/{handle}?Size=M&Color=Sand`.
#[must_use]
pub fn variant_url(handle: &str, options: &[SelectedOption]) -> String {
    let mut url = format!("/products/{}", urlencoding::encode(handle));

    for (i, option) in options.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(&urlencoding::encode(&option.name));
        url.push('=');
        url.push_str(&urlencoding::encode(&option.value));
    }

    url
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub layout: LayoutView,
    pub document_title: String,
    pub products: Vec<ProductCardView>,
}

/// Display the logged-in customer's wishlist.
///
/// Visitors without a usable customer access token are redirected to the
/// login page and the stale token is removed from the session.
///
/// # Errors
///
/// Returns 502 if Shopify fails; the visitor stays logged in.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let products = match load_wishlist(state.storefront(), &session, Utc::now()).await? {
        WishlistOutcome::RedirectToLogin => return Ok(Redirect::to(LOGIN_PATH).into_response()),
        WishlistOutcome::Loaded(products) => products,
    };

    let layout = LayoutView::load(&state, &session, "/wishlist").await;

    let template = WishlistTemplate {
        document_title: layout.document_title("Wishlist"),
        products: products.into_iter().map(ProductCardView::from).collect(),
        layout,
    };

    Ok(([(CACHE_CONTROL, WISHLIST_CACHE_CONTROL)], template).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::{Image, Money, ProductVariant};

    fn money(amount: &str) -> Money {
        Money {
            amount: amount.to_string(),
            currency_code: "USD".to_string(),
        }
    }

    fn product(compare_at: Option<&str>, alt_text: Option<&str>) -> Product {
        Product {
            id: "gid://shopify/Product/1".to_string(),
            handle: "linen-shirt".to_string(),
            title: "Linen Shirt".to_string(),
            first_variant: Some(ProductVariant {
                id: "gid://shopify/ProductVariant/10".to_string(),
                title: "M / Sand".to_string(),
                available_for_sale: true,
                sku: Some("LS-M-SAND".to_string()),
                price: money("48.00"),
                compare_at_price: compare_at.map(money),
                image: Some(Image {
                    id: None,
                    url: "https://cdn.shopify.com/s/files/linen.jpg".to_string(),
                    alt_text: alt_text.map(str::to_string),
                    width: Some(800),
                    height: Some(1000),
                }),
                selected_options: vec![
                    SelectedOption {
                        name: "Size".to_string(),
                        value: "M".to_string(),
                    },
                    SelectedOption {
                        name: "Color".to_string(),
                        value: "Sand & Stone".to_string(),
                    },
                ],
            }),
        }
    }

    #[test]
    fn test_variant_url() {
        assert_eq!(variant_url("linen-shirt", &[]), "/products/linen-shirt");
        assert_eq!(
            variant_url(
                "linen-shirt",
                &product(None, None).first_variant.unwrap().selected_options
            ),
            "/products/linen-shirt?Size=M&Color=Sand%20%26%20Stone"
        );
    }

    #[test]
    fn test_card_sale_and_alt_fallback() {
        let card = ProductCardView::from(product(Some("60.00"), None));
        assert!(card.on_sale);
        assert_eq!(card.price.as_deref(), Some("$48.00"));
        assert_eq!(card.compare_at_price.as_deref(), Some("$60.00"));
        assert_eq!(card.image.unwrap().alt, "Linen Shirt");

        let card = ProductCardView::from(product(None, Some("Folded linen shirt")));
        assert!(!card.on_sale);
        assert_eq!(card.image.unwrap().alt, "Folded linen shirt");
    }

    #[test]
    fn test_card_without_variant() {
        let mut gift_card = product(None, None);
        gift_card.first_variant = None;
        let card = ProductCardView::from(gift_card);
        assert_eq!(card.url, "/products/linen-shirt");
        assert!(card.price.is_none());
        assert!(!card.available);
    }

    #[test]
    fn test_template_renders_sale_badge() {
        let template = WishlistTemplate {
            layout: LayoutView {
                site_name: "Larkspur".to_string(),
                ..LayoutView::default()
            },
            document_title: "Larkspur | Wishlist".to_string(),
            products: vec![ProductCardView::from(product(Some("60.00"), None))],
        };

        let html = template.render().unwrap();
        assert!(html.contains("product-card__badge"));
        assert!(html.contains("<s class=\"product-card__compare-at\">$60.00</s>"));
        assert!(html.contains("alt=\"Linen Shirt\""));
        assert!(html.contains("/products/linen-shirt?Size=M&#38;Color=Sand%20%26%20Stone"));
    }

    #[test]
    fn test_template_renders_empty_state() {
        let template = WishlistTemplate {
            layout: LayoutView::default(),
            document_title: "Wishlist".to_string(),
            products: Vec::new(),
        };

        assert!(template.render().unwrap().contains("Your wishlist is empty"));
    }
}
