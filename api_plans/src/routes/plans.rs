use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    session,
};
use log::{error, info};

use crate::{
    dtos::plans::{
        CheckResponse, CurrentPlanErrorResponse, CurrentPlanResponse, PlansResponse,
        SubscribeRequest, SubscribeResponse,
    },
    services::{self, billing::BillingProvider, catalog},
};

/// Lists the plans a merchant can subscribe to.
///
/// # Output
/// - Success: `{ plans: [{ id, name, price, interval, features }] }`
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/plans');
/// const { plans } = await response.json();
/// // plans[0] => { id: "basic", name: "Basic Plan", price: 4.99,
/// //               interval: "EVERY_30_DAYS", features: ["Feature 1", "Feature 2"] }
/// ```
pub async fn get_plans() -> Res<impl Responder> {
    Success::ok(PlansResponse {
        plans: catalog::list_plans(),
    })
}

/// Tells whether the shop pays for any plan.
///
/// # Output
/// - Success: `{ hasActiveSubscription: bool }`
/// - 401 without a Shopify session, 500 `{ error, message }` when billing fails
#[get("/check")]
pub async fn get_check(
    req: HttpRequest,
    config: web::Data<Arc<Config>>,
    provider: web::Data<dyn BillingProvider>,
) -> Res<impl Responder> {
    let session = session::get_shop_session_or_error(&req)?;
    info!("Checking subscription status for {}", session.shop);

    let current =
        services::billing::resolve_current_plan(provider.get_ref(), &session, &config.billing)
            .await
            .map_err(|e| {
                error!("Billing error in check for {}: {}", session.shop, e);
                e.context("Failed to check subscription status")
            })?;

    Success::ok(CheckResponse {
        has_active_subscription: current.has_active_subscription(),
    })
}

/// Starts (or confirms) the subscription to a plan.
///
/// # Input
/// - `planId`: `basic` or `premium`
///
/// # Output
/// - Success: `{ hasActiveSubscription, confirmationUrl }`; when
///   `confirmationUrl` is set the merchant has to approve the charge there
/// - 400 for an unknown plan, 401 without a Shopify session,
///   500 `{ error, message }` when billing fails
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/plans/subscribe', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ planId: 'premium' })
/// });
/// const data = await response.json();
/// if (data.confirmationUrl) {
///   window.open(data.confirmationUrl, '_top');
/// }
/// ```
#[post("/subscribe")]
pub async fn post_subscribe(
    req: HttpRequest,
    body: Option<web::Json<SubscribeRequest>>,
    config: web::Data<Arc<Config>>,
    provider: web::Data<dyn BillingProvider>,
) -> Res<impl Responder> {
    let session = session::get_shop_session_or_error(&req)?;
    let plan_id = body
        .and_then(|b| b.into_inner().plan_id)
        .unwrap_or_default();

    let billing_config = catalog::config_for(&plan_id, &config.billing)?;
    info!(
        "Starting subscription process for {} plan={} config={}",
        session.shop,
        plan_id,
        serde_json::to_string(&billing_config).unwrap_or_default()
    );

    let result = services::billing::check(provider.get_ref(), &session, &billing_config)
        .await
        .map_err(|e| {
            error!(
                "Billing error in subscribe for {} plan={}: {}",
                session.shop, plan_id, e
            );
            e.context("Failed to process subscription")
        })?;

    info!(
        "Billing check result for {}: active={} confirmation_url={:?}",
        session.shop,
        result.has_active_subscription(),
        result.confirmation_url()
    );
    Success::ok(SubscribeResponse::from(result))
}

/// Reports which plan the shop currently pays for.
///
/// # Output
/// - Success: `{ currentPlan: "premium" | "basic" | null, hasActiveSubscription }`
/// - 401 without a Shopify session
/// - 500 `{ error, currentPlan: null, hasActiveSubscription: false }` when billing fails
#[get("/current")]
pub async fn get_current(
    req: HttpRequest,
    config: web::Data<Arc<Config>>,
    provider: web::Data<dyn BillingProvider>,
) -> Res<HttpResponse> {
    let session = session::get_shop_session_or_error(&req)?;

    match services::billing::resolve_current_plan(provider.get_ref(), &session, &config.billing)
        .await
    {
        Ok(current) => Ok(HttpResponse::Ok().json(CurrentPlanResponse::from(current))),
        Err(e) => {
            if let AppError::Billing { source, .. } = &e {
                error!(
                    "Error getting current plan for {}: {} {:?}",
                    session.shop, source, source.errors
                );
            } else {
                error!("Error getting current plan for {}: {}", session.shop, e);
            }
            Ok(
                HttpResponse::InternalServerError().json(CurrentPlanErrorResponse {
                    error: "Failed to get current plan",
                    current_plan: None,
                    has_active_subscription: false,
                }),
            )
        }
    }
}
