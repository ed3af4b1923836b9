//! Newsletter subscription.
//!
//! Subscribers are plain Shopify customers with email marketing consent.
//! A signup either creates the customer, updates the consent of an existing
//! one, or does nothing when the address is already subscribed.

use chrono::{DateTime, Utc};
use larkspur_core::Email;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::models::CustomerSession;
use crate::shopify::{
    AdminApi, EmailMarketingConsentInput, ShopifyError, Subscriber, UserError,
};

/// Shown when the submitted address fails validation.
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";

/// Shown for any failure that is not the visitor's fault.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Why a signup did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    /// The input was rejected, locally or by a Shopify mutation.
    #[error("{}", .0.message)]
    Rejected(UserError),

    /// Shopify could not be reached or answered unexpectedly.
    #[error("{0}")]
    Failed(String),
}

impl SubscribeError {
    fn invalid_email() -> Self {
        Self::Rejected(UserError {
            field: Some(vec!["email".to_string()]),
            message: INVALID_EMAIL_MESSAGE.to_string(),
        })
    }

    fn failed() -> Self {
        Self::Failed(GENERIC_FAILURE_MESSAGE.to_string())
    }

    /// Input field the error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&[String]> {
        match self {
            Self::Rejected(user_error) => user_error.field.as_deref(),
            Self::Failed(_) => None,
        }
    }

    /// Message safe to show the visitor.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected(user_error) => &user_error.message,
            Self::Failed(message) => message,
        }
    }
}

/// JSON body of a newsletter response: exactly one side is set.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub subscriber: Option<Subscriber>,
    pub error: Option<SubscribeErrorBody>,
}

/// Error half of [`SubscribeResponse`].
#[derive(Debug, Serialize)]
pub struct SubscribeErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl From<Result<Subscriber, SubscribeError>> for SubscribeResponse {
    fn from(result: Result<Subscriber, SubscribeError>) -> Self {
        match result {
            Ok(subscriber) => Self {
                subscriber: Some(subscriber),
                error: None,
            },
            Err(err) => Self {
                subscriber: None,
                error: Some(SubscribeErrorBody {
                    field: err.field().map(<[String]>::to_vec),
                    message: err.message().to_string(),
                }),
            },
        }
    }
}

/// Subscribe `raw_email` to the newsletter with consent recorded at `now`.
///
/// On success the resulting marketing state is remembered in the session so
/// the footer can skip the form on later pages.
///
/// # Errors
///
/// - [`SubscribeError::Rejected`] for an invalid address (no API call is made)
///   or the first `userErrors` entry of a rejected mutation
/// - [`SubscribeError::Failed`] for any other failure; details are logged
#[instrument(skip_all)]
pub async fn subscribe(
    admin: &dyn AdminApi,
    session: &dyn CustomerSession,
    raw_email: &str,
    now: DateTime<Utc>,
) -> Result<Subscriber, SubscribeError> {
    let email = Email::parse(raw_email).map_err(|e| {
        debug!(error = %e, "Rejected newsletter email");
        SubscribeError::invalid_email()
    })?;

    let existing = admin
        .find_customer_by_email(&email)
        .await
        .map_err(|e| shopify_failure(&e))?;

    let consent = EmailMarketingConsentInput::subscribed_at(now);

    let subscriber = match existing {
        Some(customer) if customer.marketing_state().is_subscribed() => {
            info!(customer_id = %customer.id, "Email already subscribed");
            customer
        }
        Some(customer) => {
            let updated = admin
                .update_email_marketing_consent(&customer.id, &consent)
                .await
                .map_err(|e| shopify_failure(&e))?;
            info!(customer_id = %updated.id, "Updated email marketing consent");
            updated
        }
        None => {
            let created = admin
                .create_subscriber(&email, &consent)
                .await
                .map_err(|e| shopify_failure(&e))?;
            info!(customer_id = %created.id, "Created newsletter subscriber");
            created
        }
    };

    // Shopify already holds the consent; a session failure only costs the footer hint
    if let Err(e) = session
        .set_marketing_state(subscriber.marketing_state())
        .await
    {
        error!(error = %e, "Failed to store marketing state in session");
    }

    Ok(subscriber)
}

fn shopify_failure(err: &ShopifyError) -> SubscribeError {
    if let ShopifyError::UserErrors(user_errors) = err
        && let Some(first) = user_errors.first()
    {
        info!(message = %first.message, "Shopify rejected newsletter signup");
        return SubscribeError::Rejected(first.clone());
    }

    error!(error = %err, "Newsletter subscription failed");
    SubscribeError::failed()
}
