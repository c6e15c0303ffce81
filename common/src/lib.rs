pub mod env_config;
pub mod error;
pub mod http;
pub mod session;
pub mod shopify;
