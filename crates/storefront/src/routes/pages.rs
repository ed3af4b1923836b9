//! CMS page route handlers.
//!
//! Pages are authored in the Shopify admin. Two embedded blocks are driven by
//! page data: the contact block (page titled exactly "Contact") and a section
//! hook named by the `custom.section` metafield.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::instrument;

use crate::content::TrustedHtml;
use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::layout::LayoutView;
use crate::shopify::Page;
use crate::state::AppState;

/// Page title that switches on the contact block.
pub const CONTACT_PAGE_TITLE: &str = "Contact";

/// Page display data.
#[derive(Debug, Clone)]
pub struct PageView {
    pub title: String,
    pub document_title: String,
    pub description: Option<String>,
    pub body: TrustedHtml,
    pub show_contact: bool,
    pub contact_email: Option<String>,
    /// Value of the `custom.section` metafield.
    pub section: Option<String>,
}

impl PageView {
    /// Build the view for `page` under `layout`.
    #[must_use]
    pub fn new(page: Page, layout: &LayoutView, contact_email: Option<&str>) -> Self {
        let show_contact = page.title == CONTACT_PAGE_TITLE;
        let seo_title = page
            .seo
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| page.title.clone());

        Self {
            document_title: layout.document_title(&seo_title),
            description: page.seo.description.filter(|d| !d.trim().is_empty()),
            show_contact,
            contact_email: contact_email.filter(|_| show_contact).map(str::to_string),
            section: page.section.map(|m| m.value.trim().to_string()),
            title: page.title,
            body: page.body,
        }
    }
}

/// CMS page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/show.html")]
pub struct PageTemplate {
    pub layout: LayoutView,
    pub page: PageView,
}

/// Display a CMS page.
///
/// # Errors
///
/// Returns 404 if no page has this handle, 502 if Shopify fails.
#[instrument(skip(state, session), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
) -> Result<PageTemplate> {
    let page = state
        .storefront()
        .page_by_handle(&handle)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("page {handle}")))?;

    let layout = LayoutView::load(&state, &session, &format!("/pages/{handle}")).await;
    let page = PageView::new(page, &layout, state.config().site.contact_email.as_deref());

    Ok(PageTemplate { layout, page })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::{Metafield, Seo};

    fn layout() -> LayoutView {
        LayoutView {
            site_name: "Larkspur".to_string(),
            ..LayoutView::default()
        }
    }

    fn page(title: &str) -> Page {
        Page {
            id: "gid://shopify/Page/1".to_string(),
            handle: title.to_lowercase(),
            title: title.to_string(),
            body: TrustedHtml::from_operator_cms("<p>Body <strong>copy</strong></p>".to_string()),
            seo: Seo {
                title: None,
                description: Some("Meta".to_string()),
            },
            section: None,
        }
    }

    #[test]
    fn test_contact_block_only_for_exact_title() {
        let view = PageView::new(page("Contact"), &layout(), Some("hello@larkspur.test"));
        assert!(view.show_contact);
        assert_eq!(view.contact_email.as_deref(), Some("hello@larkspur.test"));

        for title in ["contact", "Contact us", "Contacts"] {
            let view = PageView::new(page(title), &layout(), Some("hello@larkspur.test"));
            assert!(!view.show_contact, "{title}");
            assert!(view.contact_email.is_none());
        }
    }

    #[test]
    fn test_document_title_prefers_seo_title() {
        let view = PageView::new(page("About"), &layout(), None);
        assert_eq!(view.document_title, "Larkspur | About");

        let mut about = page("About");
        about.seo.title = Some("Our story".to_string());
        let view = PageView::new(about, &layout(), None);
        assert_eq!(view.document_title, "Larkspur | Our story");
    }

    #[test]
    fn test_template_renders_body_unescaped_and_section() {
        let mut about = page("About");
        about.section = Some(Metafield {
            key: "section".to_string(),
            value: "Story Grid".to_string(),
        });
        let template = PageTemplate {
            page: PageView::new(about, &layout(), None),
            layout: layout(),
        };

        let html = template.render().unwrap();
        assert!(html.contains("<p>Body <strong>copy</strong></p>"));
        assert!(html.contains(r#"data-section="Story Grid""#));
        assert!(html.contains("page-section--story-grid"));
        assert!(html.contains("<title>Larkspur | About</title>"));
        assert!(!html.contains("contact-us"));
    }

    #[test]
    fn test_template_renders_contact_block() {
        let template = PageTemplate {
            page: PageView::new(page("Contact"), &layout(), Some("hello@larkspur.test")),
            layout: layout(),
        };

        let html = template.render().unwrap();
        assert!(html.contains("contact-us"));
        assert!(html.contains("mailto:hello@larkspur.test"));
    }

    #[test]
    fn test_embedded_blocks_render_before_body() {
        let mut contact = page("Contact");
        contact.section = Some(Metafield {
            key: "section".to_string(),
            value: "Store Hours".to_string(),
        });
        let template = PageTemplate {
            page: PageView::new(contact, &layout(), Some("hello@larkspur.test")),
            layout: layout(),
        };

        let html = template.render().unwrap();
        let contact_block = html.find("class=\"contact-us\"").unwrap();
        let section = html.find("page-section--store-hours").unwrap();
        let body = html.find("class=\"page__body\"").unwrap();
        assert!(contact_block < section);
        assert!(section < body);
        assert!(html.contains(r#"<h2 id="page-section-heading" class="page-section__title">Store Hours</h2>"#));
    }
}
