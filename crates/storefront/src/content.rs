//! Trusted markup rendering.
//!
//! Page bodies are authored by the shop operator in the Shopify admin and
//! arrive as pre-rendered HTML. [`TrustedHtml`] is the only type templates
//! output without escaping; everything else goes through askama's default
//! HTML escaping. Keeping the capability in one type makes the injection
//! surface greppable: `TrustedHtml::from_operator_cms` and the single `|safe`
//! in `templates/pages/show.html`.

use std::fmt;

/// HTML that originates from the operator's own CMS and is rendered verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    /// Wrap markup fetched from the Shopify CMS.
    ///
    /// Only call this for content the shop operator authored. Visitor input
    /// must never reach this constructor.
    #[must_use]
    pub const fn from_operator_cms(html: String) -> Self {
        Self(html)
    }

    /// Raw markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the body has any non-whitespace content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trusted_html_is_verbatim() {
        let html = TrustedHtml::from_operator_cms("<p>Hello <em>there</em></p>".to_string());
        assert_eq!(html.to_string(), "<p>Hello <em>there</em></p>");
        assert!(!html.is_blank());
        assert!(TrustedHtml::from_operator_cms(" \n".to_string()).is_blank());
    }
}
