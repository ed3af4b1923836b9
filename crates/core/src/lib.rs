//! Larkspur Core - Shared domain types.
//!
//! Types used by the storefront crate and its integration tests:
//! - [`Email`] - validated, normalised subscriber address
//! - [`MarketingState`] / [`MarketingOptInLevel`] - Shopify email marketing consent
//! - [`Price`] - decimal money with display formatting
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and testable without a running Shopify store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
