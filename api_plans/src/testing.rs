use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use common::{
    env_config::{BillingSettings, Config, ShopifyConfig},
    error::BillingError,
    session::ShopSession,
};

use crate::{models::plan::BillingConfig, services::billing::BillingProvider};

/// In-memory provider: charges listed in `active` are paid, anything else gets a
/// confirmation URL. Records every call by charge name.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    active: Vec<String>,
    failure: Option<String>,
    queried: Mutex<Vec<String>>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn with_active(mut self, charge_name: &str) -> Self {
        self.active.push(charge_name.to_string());
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    fn fail_if_configured(&self) -> Result<(), BillingError> {
        match &self.failure {
            Some(message) => Err(BillingError::new(format!(
                "Billing provider request failed: {}",
                message
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BillingProvider for ScriptedProvider {
    async fn has_active_payment(
        &self,
        _session: &ShopSession,
        config: &BillingConfig,
    ) -> Result<bool, BillingError> {
        self.queried.lock().unwrap().push(config.charge_name.clone());
        self.fail_if_configured()?;
        Ok(self.active.contains(&config.charge_name))
    }

    async fn request_payment(
        &self,
        session: &ShopSession,
        config: &BillingConfig,
    ) -> Result<String, BillingError> {
        self.requested.lock().unwrap().push(config.charge_name.clone());
        self.fail_if_configured()?;
        Ok(format!(
            "https://{}/admin/charges/confirm?name={}",
            session.shop,
            config.charge_name.replace(' ', "%20")
        ))
    }
}

pub(crate) fn session() -> ShopSession {
    ShopSession::new("demo-shop.myshopify.com", "shpat_test")
}

pub(crate) fn billing_settings() -> BillingSettings {
    BillingSettings {
        currency_code: "USD".into(),
        trial_days: 0,
        test: true,
    }
}

pub(crate) fn config() -> Config {
    Config {
        environment: "development".into(),
        server_host: "127.0.0.1".into(),
        server_port: 8080,
        num_workers: 1,
        cors_allowed_origin: "http://localhost:3000".into(),
        console_logging_enabled: false,
        log_file: "plans.log".into(),
        shopify: ShopifyConfig {
            api_key: "app-key".into(),
            api_secret: "app-secret".into(),
            host_name: "plans.example.com".into(),
            api_version: "2024-07".into(),
            request_timeout: Duration::from_secs(5),
        },
        billing: billing_settings(),
    }
}
