use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use common::{
    env_config::ShopifyConfig,
    error::{BillingError, Res},
    session::ShopSession,
    shopify::{self, AdminClient},
};
use serde_json::json;

use crate::{
    misc::graphql::{
        ACTIVE_SUBSCRIPTIONS_QUERY, ActiveSubscriptionsData, CREATE_SUBSCRIPTION_MUTATION,
        CreateSubscriptionData, LineItemInput,
    },
    models::plan::BillingConfig,
    services::billing::BillingProvider,
};

/// `BillingProvider` backed by the Shopify Billing API.
pub struct ShopifyBilling {
    client: AdminClient,
    host_name: String,
}

impl ShopifyBilling {
    pub fn new(client: AdminClient, host_name: impl Into<String>) -> Self {
        ShopifyBilling {
            client,
            host_name: host_name.into(),
        }
    }

    pub fn from_config(config: &ShopifyConfig) -> Res<Self> {
        Ok(Self::new(shopify::create_client(config)?, config.host_name.clone()))
    }

    /// Where Shopify sends the merchant after approving a charge: the app's
    /// embedded entry point for the shop.
    fn return_url(&self, shop: &str) -> Result<String, BillingError> {
        let host = general_purpose::STANDARD.encode(format!("{}/admin", shop));
        url::Url::parse_with_params(
            &format!("https://{}", self.host_name),
            &[("shop", shop), ("host", host.as_str())],
        )
        .map(|url| url.to_string())
        .map_err(|e| BillingError::new(format!("Invalid app host {}: {}", self.host_name, e)))
    }
}

#[async_trait]
impl BillingProvider for ShopifyBilling {
    async fn has_active_payment(
        &self,
        session: &ShopSession,
        config: &BillingConfig,
    ) -> Result<bool, BillingError> {
        let data: ActiveSubscriptionsData = self
            .client
            .graphql(session, ACTIVE_SUBSCRIPTIONS_QUERY, json!({}))
            .await?;

        Ok(data
            .current_app_installation
            .active_subscriptions
            .iter()
            .any(|subscription| subscription.pays_for(config)))
    }

    async fn request_payment(
        &self,
        session: &ShopSession,
        config: &BillingConfig,
    ) -> Result<String, BillingError> {
        let line_item: LineItemInput = config.into();
        let variables = json!({
            "name": config.charge_name,
            "lineItems": [line_item],
            "returnUrl": self.return_url(&session.shop)?,
            "test": config.test,
            "trialDays": config.trial_days,
        });

        let data: CreateSubscriptionData = self
            .client
            .graphql(session, CREATE_SUBSCRIPTION_MUTATION, variables)
            .await?;
        let payload = data.app_subscription_create;

        if !payload.user_errors.is_empty() {
            return Err(BillingError::with_errors(
                "Error while billing the store",
                payload.user_errors,
            ));
        }

        payload
            .confirmation_url
            .ok_or_else(|| BillingError::new("Billing API returned no confirmation URL"))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::{
        services::catalog,
        testing::{billing_settings, session},
    };

    const GRAPHQL_PATH: &str = "/admin/api/2024-07/graphql.json";

    fn provider(base_url: String) -> ShopifyBilling {
        let client = AdminClient::new("2024-07", Duration::from_millis(500))
            .unwrap()
            .with_base_url(base_url);
        ShopifyBilling::new(client, "plans.example.com")
    }

    fn basic() -> BillingConfig {
        catalog::config_for("basic", &billing_settings()).unwrap()
    }

    #[actix_web::test]
    async fn finds_active_subscription_by_charge_name() {
        let server = MockServer::start_async().await;
        let query = server.mock(|when, then| {
            when.method(POST)
                .path(GRAPHQL_PATH)
                .header("X-Shopify-Access-Token", "shpat_test")
                .body_contains("activeSubscriptions");
            then.status(200).json_body(json!({
                "data": { "currentAppInstallation": { "activeSubscriptions": [
                    { "name": "Premium Plan", "status": "ACTIVE", "test": true },
                    { "name": "Basic Plan", "status": "ACTIVE", "test": true }
                ] } }
            }));
        });

        let active = provider(server.base_url())
            .has_active_payment(&session(), &basic())
            .await
            .unwrap();
        assert!(active);
        query.assert();
    }

    #[actix_web::test]
    async fn pending_subscription_is_not_active() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(GRAPHQL_PATH);
            then.status(200).json_body(json!({
                "data": { "currentAppInstallation": { "activeSubscriptions": [
                    { "name": "Basic Plan", "status": "PENDING", "test": true }
                ] } }
            }));
        });

        let active = provider(server.base_url())
            .has_active_payment(&session(), &basic())
            .await
            .unwrap();
        assert!(!active);
    }

    #[actix_web::test]
    async fn creates_subscription_and_returns_confirmation_url() {
        let server = MockServer::start_async().await;
        let mutation = server.mock(|when, then| {
            when.method(POST)
                .path(GRAPHQL_PATH)
                .body_contains("appSubscriptionCreate")
                .body_contains("\"name\":\"Basic Plan\"")
                .body_contains("EVERY_30_DAYS")
                .body_contains("\"returnUrl\":\"https://plans.example.com/?shop=demo-shop.myshopify.com&host=");
            then.status(200).json_body(json!({
                "data": { "appSubscriptionCreate": {
                    "confirmationUrl": "https://demo-shop.myshopify.com/admin/charges/1/confirm",
                    "userErrors": []
                } }
            }));
        });

        let url = provider(server.base_url())
            .request_payment(&session(), &basic())
            .await
            .unwrap();
        assert_eq!(url, "https://demo-shop.myshopify.com/admin/charges/1/confirm");
        mutation.assert();
    }

    #[actix_web::test]
    async fn user_errors_are_reported() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(GRAPHQL_PATH);
            then.status(200).json_body(json!({
                "data": { "appSubscriptionCreate": {
                    "confirmationUrl": null,
                    "userErrors": [{ "field": ["returnUrl"], "message": "Return url is invalid" }]
                } }
            }));
        });

        let err = provider(server.base_url())
            .request_payment(&session(), &basic())
            .await
            .unwrap_err();
        assert!(err.has_errors());
        assert_eq!(err.first_error().as_deref(), Some("Return url is invalid"));
    }

    #[actix_web::test]
    async fn graphql_errors_are_reported() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(GRAPHQL_PATH);
            then.status(200).json_body(json!({
                "errors": [{ "message": "Access denied for appSubscriptionCreate field." }]
            }));
        });

        let err = provider(server.base_url())
            .request_payment(&session(), &basic())
            .await
            .unwrap_err();
        assert_eq!(
            err.first_error().as_deref(),
            Some("Access denied for appSubscriptionCreate field.")
        );
    }

    #[actix_web::test]
    async fn http_failure_is_billing_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(GRAPHQL_PATH);
            then.status(401)
                .json_body(json!({ "errors": "[API] Invalid API key or access token" }));
        });

        let err = provider(server.base_url())
            .has_active_payment(&session(), &basic())
            .await
            .unwrap_err();
        assert!(err.message.contains("401"));
        assert_eq!(
            err.first_error().as_deref(),
            Some("[API] Invalid API key or access token")
        );
    }

    #[actix_web::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(GRAPHQL_PATH);
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({ "data": null }));
        });

        let err = provider(server.base_url())
            .has_active_payment(&session(), &basic())
            .await
            .unwrap_err();
        assert_eq!(err.message, "Billing provider request timed out");
    }

    #[actix_web::test]
    async fn unreachable_provider_is_billing_error() {
        let err = provider("http://127.0.0.1:1".to_string())
            .has_active_payment(&session(), &basic())
            .await
            .unwrap_err();
        assert!(err.message.starts_with("Billing provider request failed"));
    }

    #[test]
    fn return_url_points_back_into_the_embedded_app() {
        let url = provider("http://unused".to_string())
            .return_url("demo-shop.myshopify.com")
            .unwrap();
        assert_eq!(
            url,
            "https://plans.example.com/?shop=demo-shop.myshopify.com&host=ZGVtby1zaG9wLm15c2hvcGlmeS5jb20vYWRtaW4%3D"
        );
    }
}
