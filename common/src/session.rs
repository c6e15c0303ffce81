use actix_web::{HttpMessage, HttpRequest};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    env_config::ShopifyConfig,
    error::{AppError, Res},
};

/// Claims carried by the session token App Bridge attaches to every request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionTokenClaims {
    /// Shop admin URL, e.g. `https://example.myshopify.com/admin`.
    pub iss: String,
    /// Shop URL, e.g. `https://example.myshopify.com`.
    pub dest: String,
    /// The app's API key.
    pub aud: String,
    /// Staff member id.
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub nbf: Option<usize>,
    #[serde(default)]
    pub iat: Option<usize>,
    #[serde(default)]
    pub jti: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
}

impl SessionTokenClaims {
    /// Shop domain the token was issued for.
    pub fn shop(&self) -> Res<String> {
        let url = url::Url::parse(&self.dest)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token destination: {}", e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| AppError::Unauthorized("Token destination has no host".to_string()))?;

        if !is_valid_shop_domain(host) {
            return Err(AppError::Unauthorized(format!(
                "Token destination is not a shop: {}",
                host
            )));
        }
        Ok(host.to_string())
    }
}

/// Authenticated shop context for a single request.
///
/// Produced by the auth middleware, handlers only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopSession {
    /// Shop domain, e.g. `example.myshopify.com`.
    pub shop: String,
    /// Admin API access token used to act on behalf of the shop.
    pub access_token: String,
    /// Granted access scopes.
    pub scope: Option<String>,
}

impl ShopSession {
    pub fn new(shop: impl Into<String>, access_token: impl Into<String>) -> Self {
        ShopSession {
            shop: shop.into(),
            access_token: access_token.into(),
            scope: None,
        }
    }
}

/// Verifies a session token's signature, audience and lifetime.
pub fn validate_session_token(token: &str, config: &ShopifyConfig) -> Res<SessionTokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.api_key.as_str()]);
    validation.validate_nbf = true;
    validation.leeway = 5;

    let token_data = jsonwebtoken::decode::<SessionTokenClaims>(
        token,
        &DecodingKey::from_secret(config.api_secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// `*.myshopify.com` with a plain lowercase store handle.
pub fn is_valid_shop_domain(shop: &str) -> bool {
    match shop.strip_suffix(".myshopify.com") {
        Some(handle) => {
            !handle.is_empty()
                && !handle.starts_with('-')
                && handle
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        }
        None => false,
    }
}

/// Returns the session the auth middleware attached to the request.
pub fn get_shop_session_or_error(req: &HttpRequest) -> Res<ShopSession> {
    req.extensions()
        .get::<ShopSession>()
        .cloned()
        .ok_or(AppError::NoSession)
}
