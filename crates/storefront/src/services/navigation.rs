//! Footer navigation.
//!
//! Menu URLs coming from Shopify are absolute even for storefront pages
//! (`https://larkspur.myshopify.com/pages/about`). [`LinkPolicy`] turns links
//! on our own hosts into path-only links and marks everything else external.

use tracing::{debug, warn};
use url::Url;

use crate::shopify::Menu;

/// Where a footer link points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Path on this storefront, e.g. `/pages/about?ref=footer`.
    Internal(String),
    /// Absolute URL opened in a new browsing context.
    External(String),
}

/// Classifies URLs against an allow-list of hosts served by this storefront.
///
/// Hosts match exactly, ignoring ASCII case and a trailing dot;
/// `larkspur.com.evil.test` does not match `larkspur.com`.
#[derive(Debug, Clone, Default)]
pub struct LinkPolicy {
    hosts: Vec<String>,
}

impl LinkPolicy {
    /// Build a policy from hostnames (no scheme or port).
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = Self::default();
        for host in hosts {
            policy.allow(host.as_ref());
        }
        policy
    }

    /// Add a hostname to the allow-list.
    pub fn allow(&mut self, host: &str) {
        let host = normalize_host(host);
        if !host.is_empty() && !self.hosts.contains(&host) {
            self.hosts.push(host);
        }
    }

    /// Add the host of an absolute URL, e.g. the shop's primary domain.
    pub fn allow_url_host(&mut self, url: &str) {
        match Url::parse(url) {
            Ok(parsed) => {
                if let Some(host) = parsed.host_str() {
                    self.allow(host);
                }
            }
            Err(e) => debug!(url, error = %e, "Ignoring unparseable allow-list URL"),
        }
    }

    /// Whether `host` is served by this storefront.
    #[must_use]
    pub fn is_internal_host(&self, host: &str) -> bool {
        let host = normalize_host(host);
        self.hosts.iter().any(|allowed| *allowed == host)
    }

    /// Classify a menu URL. `None` for empty, unparseable, or unsafe URLs.
    #[must_use]
    pub fn classify(&self, raw_url: &str) -> Option<LinkTarget> {
        let raw_url = raw_url.trim();
        if raw_url.is_empty() {
            return None;
        }

        if raw_url.starts_with('/') && !raw_url.starts_with("//") {
            return Some(LinkTarget::Internal(raw_url.to_string()));
        }

        // Protocol-relative URLs inherit the page scheme
        let parsed = if raw_url.starts_with("//") {
            Url::parse(&format!("https:{raw_url}"))
        } else {
            Url::parse(raw_url)
        };

        let url = match parsed {
            Ok(url) => url,
            Err(e) => {
                warn!(url = raw_url, error = %e, "Dropping unparseable footer link");
                return None;
            }
        };

        match url.scheme() {
            "http" | "https" => {
                if url.host_str().is_some_and(|host| self.is_internal_host(host)) {
                    Some(LinkTarget::Internal(path_and_query(&url)))
                } else {
                    Some(LinkTarget::External(url.to_string()))
                }
            }
            "mailto" | "tel" => Some(LinkTarget::External(raw_url.to_string())),
            scheme => {
                warn!(url = raw_url, scheme, "Dropping footer link with unsupported scheme");
                None
            }
        }
    }
}

/// A footer link ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterLink {
    pub title: String,
    pub href: String,
    pub external: bool,
    /// Points at the page being rendered.
    pub active: bool,
}

/// Footer links for `menu`, in menu order, skipping items without a usable URL.
#[must_use]
pub fn footer_links(policy: &LinkPolicy, menu: Option<&Menu>, current_path: &str) -> Vec<FooterLink> {
    let Some(menu) = menu else {
        return Vec::new();
    };

    let current = trim_trailing_slash(current_path);

    menu.items
        .iter()
        .filter_map(|item| {
            let target = policy.classify(item.url.as_deref()?)?;
            Some(match target {
                LinkTarget::Internal(href) => {
                    let path = href.split(['?', '#']).next().unwrap_or_default();
                    FooterLink {
                        title: item.title.clone(),
                        active: trim_trailing_slash(path) == current,
                        href,
                        external: false,
                    }
                }
                LinkTarget::External(href) => FooterLink {
                    title: item.title.clone(),
                    href,
                    external: true,
                    active: false,
                },
            })
        })
        .collect()
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn path_and_query(url: &Url) -> String {
    let mut href = url.path().to_string();
    if let Some(query) = url.query() {
        href.push('?');
        href.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        href.push('#');
        href.push_str(fragment);
    }
    href
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::MenuItem;

    fn policy() -> LinkPolicy {
        LinkPolicy::new(["larkspur.myshopify.com", "Shop.Larkspur.test"])
    }

    fn menu(urls: &[(&str, Option<&str>)]) -> Menu {
        Menu {
            id: "gid://shopify/Menu/1".to_string(),
            items: urls
                .iter()
                .enumerate()
                .map(|(i, (title, url))| MenuItem {
                    id: format!("gid://shopify/MenuItem/{i}"),
                    title: (*title).to_string(),
                    url: url.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn test_allow_listed_host_becomes_path() {
        assert_eq!(
            policy().classify("https://larkspur.myshopify.com/pages/about?ref=footer"),
            Some(LinkTarget::Internal("/pages/about?ref=footer".to_string()))
        );
        assert_eq!(
            policy().classify("http://SHOP.larkspur.test/collections/all"),
            Some(LinkTarget::Internal("/collections/all".to_string()))
        );
    }

    #[test]
    fn test_host_match_is_exact() {
        let policy = policy();
        for url in [
            "https://shop.larkspur.test.evil.example/pages/about",
            "https://evil-shop.larkspur.test/",
            "https://larkspur.myshopify.com.attacker.io/",
        ] {
            assert!(
                matches!(policy.classify(url), Some(LinkTarget::External(_))),
                "{url} should be external"
            );
        }
    }

    #[test]
    fn test_relative_and_protocol_relative() {
        assert_eq!(
            policy().classify("/pages/faq"),
            Some(LinkTarget::Internal("/pages/faq".to_string()))
        );
        assert_eq!(
            policy().classify("//shop.larkspur.test/pages/faq"),
            Some(LinkTarget::Internal("/pages/faq".to_string()))
        );
        assert!(matches!(
            policy().classify("//instagram.com/larkspur"),
            Some(LinkTarget::External(_))
        ));
    }

    #[test]
    fn test_contact_schemes_are_external() {
        assert_eq!(
            policy().classify("mailto:hello@larkspur.test"),
            Some(LinkTarget::External("mailto:hello@larkspur.test".to_string()))
        );
        assert!(matches!(
            policy().classify("tel:+15555550100"),
            Some(LinkTarget::External(_))
        ));
    }

    #[test]
    fn test_unsafe_links_are_dropped() {
        assert_eq!(policy().classify("javascript:alert(1)"), None);
        assert_eq!(policy().classify("data:text/html,hi"), None);
        assert_eq!(policy().classify("not a url"), None);
        assert_eq!(policy().classify("   "), None);
    }

    #[test]
    fn test_allow_url_host() {
        let mut policy = LinkPolicy::default();
        policy.allow_url_host("https://www.larkspur.com");
        policy.allow_url_host("not a url");
        assert!(policy.is_internal_host("WWW.LARKSPUR.COM."));
        assert!(!policy.is_internal_host("larkspur.com"));
    }

    #[test]
    fn test_footer_links() {
        let menu = menu(&[
            ("About", Some("https://larkspur.myshopify.com/pages/about/")),
            ("Instagram", Some("https://instagram.com/larkspur")),
            ("Broken", Some("javascript:void(0)")),
            ("Heading", None),
        ]);

        let links = footer_links(&policy(), Some(&menu), "/pages/about");

        assert_eq!(
            links,
            vec![
                FooterLink {
                    title: "About".to_string(),
                    href: "/pages/about/".to_string(),
                    external: false,
                    active: true,
                },
                FooterLink {
                    title: "Instagram".to_string(),
                    href: "https://instagram.com/larkspur".to_string(),
                    external: true,
                    active: false,
                },
            ]
        );
    }

    #[test]
    fn test_footer_links_without_menu() {
        assert!(footer_links(&policy(), None, "/").is_empty());
    }
}
