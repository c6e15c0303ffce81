use std::{future::Future, pin::Pin, rc::Rc, sync::Arc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use common::{
    env_config::ShopifyConfig,
    error::Res,
    session::{self, ShopSession},
};
use futures::future::{Ready, ok};
use log::{debug, warn};

use crate::services::auth_client::AuthClient;

/// Attaches a `ShopSession` to requests carrying a valid App Bridge session token.
///
/// Requests without one pass through untouched; handlers that need a shop
/// answer 401 themselves.
pub struct AuthMiddleware {
    config: Rc<ShopifyConfig>,
    auth_client: Rc<AuthClient>,
}

impl AuthMiddleware {
    pub fn new(config: ShopifyConfig, auth_client: AuthClient) -> Self {
        AuthMiddleware {
            config: Rc::new(config),
            auth_client: Rc::new(auth_client),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Arc::new(service),
            config: self.config.clone(),
            auth_client: self.auth_client.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Arc<S>,
    config: Rc<ShopifyConfig>,
    auth_client: Rc<AuthClient>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token_value = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string());

        let config = self.config.clone();
        let auth_client = self.auth_client.clone();
        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            if let Some(token) = token_value {
                // validate token and insert the shop session for the handlers
                match resolve_session(&config, &auth_client, &token).await {
                    Ok(shop_session) => {
                        debug!(
                            "Authenticated request for {} scope={}",
                            shop_session.shop,
                            shop_session.scope.as_deref().unwrap_or("none")
                        );
                        req.extensions_mut().insert(shop_session);
                    }
                    Err(e) => warn!("Rejected session token on {}: {}", req.path(), e),
                }
            }
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}

async fn resolve_session(
    config: &ShopifyConfig,
    auth_client: &AuthClient,
    token: &str,
) -> Res<ShopSession> {
    let claims = session::validate_session_token(token, config)?;
    let shop = claims.shop()?;
    let exchanged = auth_client.exchange_token(&shop, token).await?;

    Ok(ShopSession {
        shop,
        access_token: exchanged.access_token,
        scope: exchanged.scope,
    })
}
