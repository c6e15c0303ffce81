mod cors;

use actix_web::{
    App, HttpServer, Scope,
    web::{self},
};
use api_auth::services::auth_client::AuthClient;
use common::env_config::Config;
use log::{info, warn};

// Catalog is public, everything else runs behind the session token middleware
fn api_scope(config: &Config, auth_client: AuthClient) -> Scope {
    web::scope("/api")
        .service(api_plans::mount_catalog())
        .service(
            web::scope("")
                .wrap(api_auth::auth_middleware(config, auth_client))
                .service(api_plans::mount_plans()),
        )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup(&config.log_file).expect("Failed to set up logger");
    }

    // billing provider backed by the Shopify Admin API
    let provider =
        api_plans::billing_provider(&config).expect("Failed to create billing provider");

    // session token exchange client
    let auth_client = api_auth::auth_client(&config).expect("Failed to create auth client");

    if config.is_production() && config.billing.test {
        warn!("BILLING_TEST is enabled in production, charges will not be collected");
    }

    info!(
        "Starting {} server on {}:{} (billing test mode: {})",
        config.environment, config.server_host, config.server_port, config.billing.test
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::from(provider.clone()))
            .wrap(logger::middleware(config_data.console_logging_enabled)) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(api_scope(&config_data, auth_client.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
