use std::time::Duration;

use reqwest::{Client, header::HeaderValue};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    env_config::ShopifyConfig,
    error::{BillingError, BillingUserError, Res},
    session::ShopSession,
};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(default)]
    path: Option<Vec<serde_json::Value>>,
}

impl From<GraphqlError> for BillingUserError {
    fn from(error: GraphqlError) -> Self {
        BillingUserError {
            field: error.path.map(|path| {
                path.into_iter()
                    .map(|segment| match segment {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect()
            }),
            message: Some(error.message),
        }
    }
}

/// Thin client for a shop's Admin GraphQL endpoint.
#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    api_version: String,
    base_url: Option<String>,
}

pub fn create_client(config: &ShopifyConfig) -> Res<AdminClient> {
    AdminClient::new(&config.api_version, config.request_timeout)
}

impl AdminClient {
    pub fn new(api_version: &str, timeout: Duration) -> Res<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(AdminClient {
            client,
            api_version: api_version.to_string(),
            base_url: None,
        })
    }

    /// Sends every request to `base_url` instead of the shop's own domain.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn endpoint(&self, shop: &str) -> String {
        let base = match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", shop),
        };
        format!("{}/admin/api/{}/graphql.json", base, self.api_version)
    }

    /// Runs a GraphQL document for the session's shop and returns its `data`.
    ///
    /// Top-level GraphQL `errors`, non-success statuses and transport failures
    /// all come back as `BillingError`.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        session: &ShopSession,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, BillingError> {
        let token = HeaderValue::from_str(&session.access_token)
            .map_err(|_| BillingError::new("Session access token is not a valid header value"))?;

        let response = self
            .client
            .post(self.endpoint(&session.shop))
            .header(ACCESS_TOKEN_HEADER, token)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);
            let errors = match body.get("errors") {
                Some(serde_json::Value::String(message)) => {
                    vec![BillingUserError::message(message.clone())]
                }
                Some(other) => serde_json::from_value::<Vec<GraphqlError>>(other.clone())
                    .map(|errors| errors.into_iter().map(Into::into).collect())
                    .unwrap_or_default(),
                None => Vec::new(),
            };
            log::warn!("Admin API for {} responded with {}", session.shop, status);
            return Err(BillingError::with_errors(
                format!("Shopify Admin API responded with {}", status),
                errors,
            ));
        }

        let body = response.json::<GraphqlResponse<T>>().await?;
        if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
            return Err(BillingError::with_errors(
                "Error while billing the store",
                errors.into_iter().map(Into::into).collect(),
            ));
        }

        body.data
            .ok_or_else(|| BillingError::new("Shopify Admin API returned no data"))
    }
}

