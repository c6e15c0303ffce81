use std::sync::Arc;

use actix_web::web::{self};
use common::{env_config::Config, error::Res};

pub mod routes {
    pub mod plans;
}

pub mod services {
    pub mod billing;
    pub mod catalog;
    pub mod shopify;
}

pub mod models {
    pub mod plan;
}

mod dtos {
    pub(crate) mod plans;
}

mod misc {
    pub(crate) mod graphql;
}

#[cfg(test)]
pub(crate) mod testing;

pub use services::billing::BillingProvider;

/// Plan catalog, served without a shop session.
pub fn mount_catalog() -> actix_web::Resource {
    web::resource("/plans").route(web::get().to(routes::plans::get_plans))
}

/// Billing endpoints, they read the `ShopSession` set by the auth middleware.
pub fn mount_plans() -> actix_web::Scope {
    web::scope("/plans")
        .service(routes::plans::get_check)
        .service(routes::plans::post_subscribe)
        .service(routes::plans::get_current)
}

/// Billing provider talking to the Shopify Admin API with the configured credentials.
pub fn billing_provider(config: &Config) -> Res<Arc<dyn BillingProvider>> {
    let provider = services::shopify::ShopifyBilling::from_config(&config.shopify)?;
    Ok(Arc::new(provider))
}
