//! Core types for the storefront.

pub mod email;
pub mod marketing;
pub mod price;

pub use email::{Email, EmailError};
pub use marketing::{MarketingOptInLevel, MarketingState};
pub use price::{CurrencyCode, Price, PriceError};
