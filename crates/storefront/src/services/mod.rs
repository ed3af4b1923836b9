//! Business logic services for storefront.
//!
//! Services take the Shopify ports and the visitor's session explicitly, so
//! they run unchanged against fakes in tests.
//!
//! # Services
//!
//! - `navigation` - Footer link classification
//! - `newsletter` - Email marketing signup via the Admin API
//! - `wishlist` - Customer wishlist loading via the Storefront API

pub mod navigation;
pub mod newsletter;
pub mod wishlist;
