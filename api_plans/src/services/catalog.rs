use std::sync::LazyLock;

use common::{
    env_config::BillingSettings,
    error::{AppError, Res},
};
use rust_decimal::Decimal;

use crate::models::plan::{BillingConfig, Interval, Plan, PlanId};

static CATALOG: LazyLock<Vec<Plan>> = LazyLock::new(|| {
    vec![
        Plan {
            id: PlanId::Basic,
            name: "Basic Plan".to_string(),
            price: Decimal::new(499, 2),
            interval: Interval::Every30Days,
            features: vec!["Feature 1".to_string(), "Feature 2".to_string()],
        },
        Plan {
            id: PlanId::Premium,
            name: "Premium Plan".to_string(),
            price: Decimal::new(999, 2),
            interval: Interval::Every30Days,
            features: vec![
                "Feature 1".to_string(),
                "Feature 2".to_string(),
                "Feature 3".to_string(),
                "Feature 4".to_string(),
            ],
        },
    ]
});

/// The offered plans, in display order.
pub fn list_plans() -> &'static [Plan] {
    CATALOG.as_slice()
}

pub fn find_plan(id: PlanId) -> Option<&'static Plan> {
    list_plans().iter().find(|plan| plan.id == id)
}

/// Builds the charge for a plan id received from a client.
///
/// Fails with `AppError::InvalidPlan` for anything outside the catalog.
pub fn config_for(plan_id: &str, settings: &BillingSettings) -> Res<BillingConfig> {
    let id: PlanId = plan_id.parse()?;
    billing_config(id, settings)
}

/// Merges the shared billing settings with the plan's charge name, amount and interval.
pub fn billing_config(id: PlanId, settings: &BillingSettings) -> Res<BillingConfig> {
    let plan = find_plan(id).ok_or_else(|| AppError::InvalidPlan(id.to_string()))?;

    Ok(BillingConfig {
        charge_name: plan.name.clone(),
        amount: plan.price,
        currency_code: settings.currency_code.clone(),
        interval: plan.interval,
        trial_days: settings.trial_days,
        test: settings.test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BillingSettings {
        BillingSettings {
            currency_code: "USD".into(),
            trial_days: 7,
            test: true,
        }
    }

    #[test]
    fn every_catalog_plan_has_a_matching_config() {
        for plan in list_plans() {
            let config = config_for(plan.id.as_str(), &settings()).unwrap();
            assert_eq!(config.charge_name, plan.name);
            assert_eq!(config.amount, plan.price);
            assert_eq!(config.interval, plan.interval);
        }
    }

    #[test]
    fn config_carries_shared_settings() {
        let config = config_for("premium", &settings()).unwrap();
        assert_eq!(config.charge_name, "Premium Plan");
        assert_eq!(config.amount, Decimal::new(999, 2));
        assert_eq!(config.currency_code, "USD");
        assert_eq!(config.trial_days, 7);
        assert!(config.test);
    }

    #[test]
    fn unknown_plan_is_rejected() {
        assert!(matches!(
            config_for("unknown", &settings()),
            Err(AppError::InvalidPlan(id)) if id == "unknown"
        ));
    }

    #[test]
    fn catalog_is_stable() {
        let first = list_plans();
        let second = list_plans();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, PlanId::Basic);
        assert_eq!(first[1].features.len(), 4);
    }

    #[test]
    fn catalog_serializes_prices_as_numbers() {
        let json = serde_json::to_value(list_plans()).unwrap();
        assert_eq!(json[0]["id"], "basic");
        let price = json[0]["price"].as_f64().expect("price should be a JSON number");
        assert!((price - 4.99).abs() < 1e-9);
        assert_eq!(json[1]["interval"], "EVERY_30_DAYS");
    }

    #[test]
    fn priority_covers_the_whole_catalog() {
        for id in PlanId::BY_PRIORITY {
            assert!(find_plan(id).is_some());
        }
        assert_eq!(PlanId::BY_PRIORITY.len(), list_plans().len());
    }
}
