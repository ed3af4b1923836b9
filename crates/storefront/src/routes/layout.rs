//! Shared layout data for every full HTML page.
//!
//! Loaded once per request: the footer menu (cached by the Storefront
//! client) and the visitor's newsletter state from the session.

use tracing::warn;

use crate::models::CustomerSession;
use crate::services::navigation::{FooterLink, footer_links};
use crate::state::AppState;

/// Data `base.html` and its partials render.
#[derive(Debug, Clone, Default)]
pub struct LayoutView {
    pub site_name: String,
    pub footer_links: Vec<FooterLink>,
    /// The session says this visitor already subscribed; the footer shows a
    /// notice instead of the form.
    pub newsletter_subscribed: bool,
}

impl LayoutView {
    /// Load the layout for a page at `current_path`.
    ///
    /// Shopify and session failures degrade to an empty footer and a visible
    /// newsletter form; they never fail the page.
    pub async fn load(state: &AppState, session: &dyn CustomerSession, current_path: &str) -> Self {
        let site = &state.config().site;

        let footer_links = match state.storefront().layout(&site.footer_menu_handle).await {
            Ok(layout) => {
                let mut policy = state.link_policy().clone();
                policy.allow_url_host(&layout.shop.primary_domain_url);
                footer_links(&policy, layout.footer_menu.as_ref(), current_path)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load layout; rendering empty footer");
                Vec::new()
            }
        };

        let newsletter_subscribed = match session.marketing_state().await {
            Ok(state) => state.is_some_and(larkspur_core::MarketingState::is_subscribed),
            Err(e) => {
                warn!(error = %e, "Failed to read newsletter state from session");
                false
            }
        };

        Self {
            site_name: site.name.clone(),
            footer_links,
            newsletter_subscribed,
        }
    }

    /// `<title>` text for a page titled `title`.
    #[must_use]
    pub fn document_title(&self, title: &str) -> String {
        format!("{} | {}", self.site_name, title)
    }
}
