//! Email marketing consent enums.
//!
//! Wire names follow Shopify's `CustomerEmailMarketingState` and
//! `CustomerMarketingOptInLevel` enums.

use serde::{Deserialize, Serialize};

/// Marketing consent state of a customer's email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketingState {
    /// Waiting on a double opt-in confirmation.
    Pending,
    /// Subscribed to marketing.
    Subscribed,
    /// Unsubscribed from marketing.
    Unsubscribed,
    /// Data has been redacted.
    Redacted,
    /// Address is invalid.
    Invalid,
    /// Not subscribed to marketing. Unknown wire values decode here too.
    #[serde(other)]
    NotSubscribed,
}

impl MarketingState {
    /// Shopify wire name of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotSubscribed => "NOT_SUBSCRIBED",
            Self::Pending => "PENDING",
            Self::Subscribed => "SUBSCRIBED",
            Self::Unsubscribed => "UNSUBSCRIBED",
            Self::Redacted => "REDACTED",
            Self::Invalid => "INVALID",
        }
    }

    /// Whether the customer currently receives marketing email.
    #[must_use]
    pub const fn is_subscribed(self) -> bool {
        matches!(self, Self::Subscribed)
    }
}

impl std::fmt::Display for MarketingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer opted in to marketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketingOptInLevel {
    /// Opted in without a confirmation step.
    SingleOptIn,
    /// Opted in and confirmed via email.
    ConfirmedOptIn,
    /// Opt-in level is not known.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_marketing_state_wire_names() {
        let json = serde_json::to_string(&MarketingState::NotSubscribed).unwrap();
        assert_eq!(json, "\"NOT_SUBSCRIBED\"");

        let state: MarketingState = serde_json::from_str("\"SUBSCRIBED\"").unwrap();
        assert!(state.is_subscribed());
    }

    #[test]
    fn test_unknown_marketing_state_is_not_subscribed() {
        let state: MarketingState = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(state, MarketingState::NotSubscribed);
        assert!(!state.is_subscribed());

        let state: MarketingState = serde_json::from_str("\"NOT_SUBSCRIBED\"").unwrap();
        assert_eq!(state, MarketingState::NotSubscribed);
    }

    #[test]
    fn test_opt_in_level() {
        let level: MarketingOptInLevel = serde_json::from_str("\"SINGLE_OPT_IN\"").unwrap();
        assert_eq!(level, MarketingOptInLevel::SingleOptIn);

        let level: MarketingOptInLevel = serde_json::from_str("\"WHATEVER\"").unwrap();
        assert_eq!(level, MarketingOptInLevel::Unknown);
    }
}
