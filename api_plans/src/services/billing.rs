use async_trait::async_trait;
use common::{
    env_config::BillingSettings,
    error::{BillingError, Res},
    session::ShopSession,
};

use crate::{
    models::plan::{BillingConfig, CurrentPlan, PlanId, SubscriptionCheck},
    services::catalog,
};

/// External service that owns charge state and confirmation flows.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Whether the shop has an active, accepted charge matching `config`.
    async fn has_active_payment(
        &self,
        session: &ShopSession,
        config: &BillingConfig,
    ) -> Result<bool, BillingError>;

    /// Creates a pending charge for `config` and returns the URL the merchant
    /// must visit to approve it.
    async fn request_payment(
        &self,
        session: &ShopSession,
        config: &BillingConfig,
    ) -> Result<String, BillingError>;
}

/// Reports an active charge matching `config`, or starts one and hands back its
/// confirmation URL.
pub async fn check(
    provider: &dyn BillingProvider,
    session: &ShopSession,
    config: &BillingConfig,
) -> Res<SubscriptionCheck> {
    if provider.has_active_payment(session, config).await? {
        return Ok(SubscriptionCheck::Active);
    }

    let confirmation_url = provider.request_payment(session, config).await?;
    log::debug!(
        "Requested {} charge for {}, awaiting confirmation",
        config.charge_name,
        session.shop
    );
    Ok(SubscriptionCheck::NeedsConfirmation { confirmation_url })
}

/// Finds the plan the shop pays for, highest tier first.
///
/// Only queries the provider, so a shop without a subscription does not end up
/// with a pending charge for every plan.
pub async fn resolve_current_plan(
    provider: &dyn BillingProvider,
    session: &ShopSession,
    settings: &BillingSettings,
) -> Res<CurrentPlan> {
    for id in PlanId::BY_PRIORITY {
        let config = catalog::billing_config(id, settings)?;
        if provider.has_active_payment(session, &config).await? {
            return Ok(CurrentPlan { plan: Some(id) });
        }
    }
    Ok(CurrentPlan { plan: None })
}
