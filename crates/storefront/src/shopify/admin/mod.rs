//! Shopify Admin API client.
//!
//! The storefront only touches the Admin API for newsletter signups: looking
//! up a customer by email and writing email marketing consent.

mod queries;

use async_trait::async_trait;
use larkspur_core::Email;
use tracing::instrument;

use crate::config::ShopifyConfig;
use crate::shopify::types::{EmailMarketingConsentInput, Subscriber};
use crate::shopify::{AdminApi, GraphQLClient, GraphQLError, ShopifyError};

use queries::{
    CUSTOMER_BY_EMAIL, CUSTOMER_CREATE, CUSTOMER_EMAIL_MARKETING_CONSENT_UPDATE,
    ConsentUpdateData, ConsentUpdateInput, CustomerByEmailData, CustomerByEmailVariables,
    CustomerCreateData, CustomerCreateInput, CustomerPayload, MutationVariables,
};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Tag added to customers created from the newsletter form.
pub const NEWSLETTER_TAG: &str = "newsletter";

/// Client for the Shopify Admin API.
#[derive(Clone)]
pub struct AdminClient {
    graphql: GraphQLClient,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let endpoint = format!(
            "https://{}/admin/api/{}/graphql.json",
            config.store, config.api_version
        );

        Ok(Self {
            graphql: GraphQLClient::new(
                endpoint,
                ACCESS_TOKEN_HEADER,
                config.admin_access_token.clone(),
            )?,
        })
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    #[instrument(skip(self, email), fields(email_domain = %email.domain()))]
    async fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Subscriber>, ShopifyError> {
        let data: CustomerByEmailData = self
            .graphql
            .query(
                CUSTOMER_BY_EMAIL,
                "CustomerByEmail",
                CustomerByEmailVariables {
                    query: email_search_query(email),
                },
            )
            .await?;

        Ok(data.customers.nodes.into_iter().next())
    }

    #[instrument(skip(self, email, consent), fields(email_domain = %email.domain()))]
    async fn create_subscriber(
        &self,
        email: &Email,
        consent: &EmailMarketingConsentInput,
    ) -> Result<Subscriber, ShopifyError> {
        let data: CustomerCreateData = self
            .graphql
            .query(
                CUSTOMER_CREATE,
                "CustomerCreate",
                MutationVariables {
                    input: CustomerCreateInput {
                        email: email.as_str(),
                        email_marketing_consent: consent,
                        tags: &[NEWSLETTER_TAG],
                    },
                },
            )
            .await?;

        mutation_customer("customerCreate", data.customer_create)
    }

    #[instrument(skip(self, consent), fields(customer_id = %customer_id))]
    async fn update_email_marketing_consent(
        &self,
        customer_id: &str,
        consent: &EmailMarketingConsentInput,
    ) -> Result<Subscriber, ShopifyError> {
        let data: ConsentUpdateData = self
            .graphql
            .query(
                CUSTOMER_EMAIL_MARKETING_CONSENT_UPDATE,
                "CustomerEmailMarketingConsentUpdate",
                MutationVariables {
                    input: ConsentUpdateInput {
                        customer_id,
                        email_marketing_consent: consent,
                    },
                },
            )
            .await?;

        mutation_customer(
            "customerEmailMarketingConsentUpdate",
            data.customer_email_marketing_consent_update,
        )
    }
}

/// Admin search query matching one exact email address.
fn email_search_query(email: &Email) -> String {
    let escaped = email.as_str().replace('\\', "\\\\").replace('"', "\\\"");
    format!("email:\"{escaped}\"")
}

/// Unwrap a customer mutation payload, surfacing `userErrors` first.
fn mutation_customer(
    mutation: &str,
    payload: Option<CustomerPayload>,
) -> Result<Subscriber, ShopifyError> {
    let Some(payload) = payload else {
        return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
            "{mutation} returned no payload"
        ))]));
    };

    if !payload.user_errors.is_empty() {
        return Err(ShopifyError::UserErrors(payload.user_errors));
    }

    payload.customer.ok_or_else(|| {
        ShopifyError::GraphQL(vec![GraphQLError::message(format!(
            "{mutation} returned no customer"
        ))])
    })
}
