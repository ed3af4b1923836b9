//! GraphQL documents for the Shopify Admin API and their raw response shapes.

use serde::{Deserialize, Serialize};

use crate::shopify::UserError;
use crate::shopify::types::{EmailMarketingConsentInput, Subscriber};

pub const CUSTOMER_BY_EMAIL: &str = include_str!("../../../graphql/admin/customer_by_email.graphql");
pub const CUSTOMER_CREATE: &str = include_str!("../../../graphql/admin/customer_create.graphql");
pub const CUSTOMER_EMAIL_MARKETING_CONSENT_UPDATE: &str =
    include_str!("../../../graphql/admin/customer_email_marketing_consent_update.graphql");

// =============================================================================
// Customer lookup
// =============================================================================

#[derive(Debug, Serialize)]
pub struct CustomerByEmailVariables {
    /// Admin search syntax, e.g. `email:"reader@example.com"`.
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerByEmailData {
    pub customers: SubscriberConnection,
}

#[derive(Debug, Deserialize)]
pub struct SubscriberConnection {
    pub nodes: Vec<Subscriber>,
}

// =============================================================================
// Mutations
// =============================================================================

#[derive(Debug, Serialize)]
pub struct MutationVariables<I> {
    pub input: I,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateInput<'a> {
    pub email: &'a str,
    pub email_marketing_consent: &'a EmailMarketingConsentInput,
    pub tags: &'a [&'a str],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentUpdateInput<'a> {
    pub customer_id: &'a str,
    pub email_marketing_consent: &'a EmailMarketingConsentInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateData {
    pub customer_create: Option<CustomerPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentUpdateData {
    pub customer_email_marketing_consent_update: Option<CustomerPayload>,
}

/// Shared payload shape of `customerCreate` and
/// `customerEmailMarketingConsentUpdate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub customer: Option<Subscriber>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}
