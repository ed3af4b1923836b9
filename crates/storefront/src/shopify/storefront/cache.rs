//! Cache types for Storefront API responses.

use crate::shopify::types::{Layout, Page};

/// Cache key for pages and the layout.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// Page by handle.
    Page(String),
    /// Layout by footer menu handle.
    Layout(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Page(Box<Page>),
    Layout(Box<Layout>),
}
