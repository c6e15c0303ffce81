use common::{
    env_config::ShopifyConfig,
    error::{AppError, Res},
};
use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const TOKEN_EXCHANGE_GRANT: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
const ID_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:id_token";
const OFFLINE_ACCESS_TOKEN_TYPE: &str = "urn:shopify:params:oauth:token-type:offline-access-token";

#[derive(Debug, Serialize)]
pub struct TokenExchangeRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'a str,
    pub subject_token: &'a str,
    pub subject_token_type: &'a str,
    pub requested_token_type: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Trades App Bridge session tokens for Admin API access tokens.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    api_key: String,
    api_secret: String,
    base_url: Option<String>,
}

impl AuthClient {
    pub fn new(config: &ShopifyConfig) -> Res<Self> {
        Ok(AuthClient {
            client: Client::builder().timeout(config.request_timeout).build()?,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            base_url: None,
        })
    }

    /// Sends exchanges to `base_url` instead of the shop's own domain.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub async fn exchange_token(&self, shop: &str, session_token: &str) -> Res<TokenExchangeResponse> {
        let base = match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", shop),
        };
        let request_body = TokenExchangeRequest {
            client_id: &self.api_key,
            client_secret: &self.api_secret,
            grant_type: TOKEN_EXCHANGE_GRANT,
            subject_token: session_token,
            subject_token_type: ID_TOKEN_TYPE,
            requested_token_type: OFFLINE_ACCESS_TOKEN_TYPE,
        };

        info!("Exchanging session token for {}", shop);
        let response = self
            .client
            .post(format!("{}/admin/oauth/access_token", base))
            .json(&request_body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let error_response = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::json!({"error": "unknown_error"}));
            let message = error_response["error_description"]
                .as_str()
                .or_else(|| error_response["error"].as_str())
                .unwrap_or("Failed to exchange session token")
                .to_string();
            warn!("Token exchange for {} failed ({}): {}", shop, status, message);
            return Err(AppError::Unauthorized(message));
        }

        let token_response = response.json::<TokenExchangeResponse>().await?;
        info!("Token exchange succeeded for {}", shop);
        Ok(token_response)
    }
}
