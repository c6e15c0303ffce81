use std::{fmt, str::FromStr};

use common::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of an offered plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Basic,
    Premium,
}

impl PlanId {
    /// Highest tier first. Decides the reported plan when several are active.
    pub const BY_PRIORITY: [PlanId; 2] = [PlanId::Premium, PlanId::Basic];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Basic => "basic",
            PlanId::Premium => "premium",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(PlanId::Basic),
            "premium" => Ok(PlanId::Premium),
            other => Err(AppError::InvalidPlan(other.to_string())),
        }
    }
}

/// Recurring billing interval, spelled the way the Billing API expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "EVERY_30_DAYS")]
    Every30Days,
    #[serde(rename = "ANNUAL")]
    Annual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub interval: Interval,
    pub features: Vec<String>,
}

/// Everything the billing provider needs to find or create a plan's charge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingConfig {
    pub charge_name: String,
    pub amount: Decimal,
    pub currency_code: String,
    pub interval: Interval,
    pub trial_days: u32,
    pub test: bool,
}

/// Outcome of checking one charge for a shop.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionCheck {
    /// A matching charge is active.
    Active,
    /// No active charge; the merchant must approve one at this URL.
    NeedsConfirmation { confirmation_url: String },
}

impl SubscriptionCheck {
    pub fn has_active_subscription(&self) -> bool {
        matches!(self, SubscriptionCheck::Active)
    }

    pub fn confirmation_url(&self) -> Option<&str> {
        match self {
            SubscriptionCheck::Active => None,
            SubscriptionCheck::NeedsConfirmation { confirmation_url } => Some(confirmation_url),
        }
    }
}

/// The plan a shop currently pays for, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentPlan {
    pub plan: Option<PlanId>,
}

impl CurrentPlan {
    pub fn has_active_subscription(&self) -> bool {
        self.plan.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_ids_parse_only_known_values() {
        assert_eq!("basic".parse::<PlanId>().unwrap(), PlanId::Basic);
        assert_eq!("premium".parse::<PlanId>().unwrap(), PlanId::Premium);
        assert!(matches!("Basic".parse::<PlanId>(), Err(AppError::InvalidPlan(_))));
        assert!(matches!("".parse::<PlanId>(), Err(AppError::InvalidPlan(_))));
    }

    #[test]
    fn interval_uses_billing_api_names() {
        assert_eq!(
            serde_json::to_value(Interval::Every30Days).unwrap(),
            serde_json::json!("EVERY_30_DAYS")
        );
        assert_eq!(serde_json::to_value(Interval::Annual).unwrap(), serde_json::json!("ANNUAL"));
    }

    #[test]
    fn confirmation_url_only_without_active_subscription() {
        assert_eq!(SubscriptionCheck::Active.confirmation_url(), None);
        let pending = SubscriptionCheck::NeedsConfirmation {
            confirmation_url: "https://admin.shopify.com/confirm".into(),
        };
        assert!(!pending.has_active_subscription());
        assert_eq!(pending.confirmation_url(), Some("https://admin.shopify.com/confirm"));
    }
}
