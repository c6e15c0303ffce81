use common::{env_config::Config, error::Res};
use middleware::auth::AuthMiddleware;
use services::auth_client::AuthClient;

pub mod middleware {
    pub mod auth;
}
pub mod services {
    pub mod auth_client;
}

// Token exchange client, shared across workers
pub fn auth_client(config: &Config) -> Res<AuthClient> {
    AuthClient::new(&config.shopify)
}

// Session-token auth middleware
pub fn auth_middleware(config: &Config, auth_client: AuthClient) -> AuthMiddleware {
    AuthMiddleware::new(config.shopify.clone(), auth_client)
}
