use common::error::BillingUserError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::plan::{BillingConfig, Interval};

pub(crate) const ACTIVE_SUBSCRIPTIONS_QUERY: &str = r#"
query appSubscription {
  currentAppInstallation {
    activeSubscriptions {
      name
      status
      test
    }
  }
}
"#;

pub(crate) const CREATE_SUBSCRIPTION_MUTATION: &str = r#"
mutation createPaymentMutation(
  $name: String!
  $lineItems: [AppSubscriptionLineItemInput!]!
  $returnUrl: URL!
  $test: Boolean
  $trialDays: Int
) {
  appSubscriptionCreate(
    name: $name
    lineItems: $lineItems
    returnUrl: $returnUrl
    test: $test
    trialDays: $trialDays
  ) {
    confirmationUrl
    userErrors {
      field
      message
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActiveSubscriptionsData {
    pub current_app_installation: AppInstallation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppInstallation {
    #[serde(default)]
    pub active_subscriptions: Vec<ActiveSubscription>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActiveSubscription {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub test: bool,
}

impl ActiveSubscription {
    /// Only `ACTIVE` counts as paid, test charges only while billing runs in test mode.
    pub fn pays_for(&self, config: &BillingConfig) -> bool {
        self.name == config.charge_name && self.status == "ACTIVE" && (config.test || !self.test)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSubscriptionData {
    pub app_subscription_create: AppSubscriptionCreatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppSubscriptionCreatePayload {
    pub confirmation_url: Option<String>,
    #[serde(default)]
    pub user_errors: Vec<BillingUserError>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LineItemInput {
    pub plan: PlanInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlanInput {
    pub app_recurring_pricing_details: RecurringPricingDetails,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecurringPricingDetails {
    pub price: MoneyInput,
    pub interval: Interval,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MoneyInput {
    pub amount: Decimal,
    pub currency_code: String,
}

/// Enables the use of into() on a BillingConfig.
/// Returns the single recurring line item of an `appSubscriptionCreate` call.
impl From<&BillingConfig> for LineItemInput {
    fn from(config: &BillingConfig) -> Self {
        LineItemInput {
            plan: PlanInput {
                app_recurring_pricing_details: RecurringPricingDetails {
                    price: MoneyInput {
                        amount: config.amount,
                        currency_code: config.currency_code.clone(),
                    },
                    interval: config.interval,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(test: bool) -> BillingConfig {
        BillingConfig {
            charge_name: "Basic Plan".into(),
            amount: Decimal::new(499, 2),
            currency_code: "USD".into(),
            interval: Interval::Every30Days,
            trial_days: 0,
            test,
        }
    }

    fn subscription(name: &str, status: &str, test: bool) -> ActiveSubscription {
        ActiveSubscription {
            name: name.into(),
            status: status.into(),
            test,
        }
    }

    #[test]
    fn only_active_matching_charges_pay() {
        let cfg = config(true);
        assert!(subscription("Basic Plan", "ACTIVE", true).pays_for(&cfg));
        assert!(!subscription("Basic Plan", "PENDING", false).pays_for(&cfg));
        assert!(!subscription("Basic Plan", "FROZEN", false).pays_for(&cfg));
        assert!(!subscription("Premium Plan", "ACTIVE", false).pays_for(&cfg));
    }

    #[test]
    fn test_charges_do_not_pay_outside_test_mode() {
        let cfg = config(false);
        assert!(!subscription("Basic Plan", "ACTIVE", true).pays_for(&cfg));
        assert!(subscription("Basic Plan", "ACTIVE", false).pays_for(&cfg));
    }

    #[test]
    fn line_item_matches_billing_api_shape() {
        let item: LineItemInput = (&config(true)).into();
        assert_eq!(
            serde_json::to_value(item).unwrap(),
            serde_json::json!({
                "plan": {
                    "appRecurringPricingDetails": {
                        "price": { "amount": "4.99", "currencyCode": "USD" },
                        "interval": "EVERY_30_DAYS"
                    }
                }
            })
        );
    }
}
