use serde::{Deserialize, Serialize};

use crate::models::plan::{CurrentPlan, Plan, PlanId, SubscriptionCheck};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    #[serde(default)]
    pub plan_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: &'static [Plan],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub has_active_subscription: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub has_active_subscription: bool,
    pub confirmation_url: Option<String>,
}

impl From<SubscriptionCheck> for SubscribeResponse {
    fn from(check: SubscriptionCheck) -> Self {
        match check {
            SubscriptionCheck::Active => SubscribeResponse {
                has_active_subscription: true,
                confirmation_url: None,
            },
            SubscriptionCheck::NeedsConfirmation { confirmation_url } => SubscribeResponse {
                has_active_subscription: false,
                confirmation_url: Some(confirmation_url),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlanResponse {
    pub current_plan: Option<PlanId>,
    pub has_active_subscription: bool,
}

impl From<CurrentPlan> for CurrentPlanResponse {
    fn from(current: CurrentPlan) -> Self {
        CurrentPlanResponse {
            current_plan: current.plan,
            has_active_subscription: current.has_active_subscription(),
        }
    }
}

/// Body of a failed current-plan lookup: the error plus safe defaults.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlanErrorResponse {
    pub error: &'static str,
    pub current_plan: Option<PlanId>,
    pub has_active_subscription: bool,
}
