//! GraphQL transport shared by the Storefront and Admin clients.
//!
//! Documents are plain strings; `graphql_client` provides the request body and
//! response envelope types, `reqwest` 0.13 does the HTTP.

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{QueryBody, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};

use super::{GraphQLError, GraphQLErrorLocation, ShopifyError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Authenticated client for one Shopify GraphQL endpoint.
#[derive(Clone)]
pub struct GraphQLClient {
    inner: Arc<GraphQLClientInner>,
}

struct GraphQLClientInner {
    client: reqwest::Client,
    endpoint: String,
    token_header: &'static str,
    access_token: SecretString,
}

impl GraphQLClient {
    /// Create a client that sends `access_token` in the `token_header` header.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(
        endpoint: String,
        token_header: &'static str,
        access_token: SecretString,
    ) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(GraphQLClientInner {
                client,
                endpoint,
                token_header,
                access_token,
            }),
        })
    }

    /// Execute a GraphQL document and decode its `data`.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::RateLimited`] on HTTP 429
    /// - [`ShopifyError::Unauthorized`] on HTTP 401/403
    /// - [`ShopifyError::GraphQL`] on other non-success statuses, on GraphQL
    ///   `errors`, or when the response carries no data
    /// - [`ShopifyError::Parse`] when the body does not match `T`
    pub async fn query<V, T>(
        &self,
        query: &'static str,
        operation_name: &'static str,
        variables: V,
    ) -> Result<T, ShopifyError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let request_body = QueryBody {
            variables,
            query,
            operation_name,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(
                self.inner.token_header,
                self.inner.access_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ShopifyError::Unauthorized(format!(
                "{operation_name} rejected with HTTP {status}"
            )));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = operation_name,
                body = %truncate(&response_text, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                truncate(&response_text, 200)
            ))]));
        }

        decode_response(operation_name, &response_text)
    }
}

/// Decode a GraphQL response envelope, surfacing `errors` before `data`.
fn decode_response<T: DeserializeOwned>(
    operation_name: &str,
    response_text: &str,
) -> Result<T, ShopifyError> {
    let response: Response<T> = serde_json::from_str(response_text).map_err(|e| {
        tracing::error!(
            error = %e,
            operation = operation_name,
            body = %truncate(response_text, 500),
            "Failed to parse Shopify GraphQL response"
        );
        ShopifyError::Parse(e)
    })?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        tracing::debug!(errors = ?errors, operation = operation_name, "GraphQL errors in response");

        return Err(ShopifyError::GraphQL(
            errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e.locations.map_or_else(Vec::new, |locs| {
                        locs.into_iter()
                            .map(|l| GraphQLErrorLocation {
                                line: i64::from(l.line),
                                column: i64::from(l.column),
                            })
                            .collect()
                    }),
                    path: e.path.map_or_else(Vec::new, |p| {
                        p.into_iter()
                            .map(|fragment| match fragment {
                                graphql_client::PathFragment::Key(s) => {
                                    serde_json::Value::String(s)
                                }
                                graphql_client::PathFragment::Index(i) => {
                                    serde_json::Value::Number(i.into())
                                }
                            })
                            .collect()
                    }),
                })
                .collect(),
        ));
    }

    response.data.ok_or_else(|| {
        tracing::error!(
            operation = operation_name,
            body = %truncate(response_text, 500),
            "Shopify GraphQL response has no data and no errors"
        );
        ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")])
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
