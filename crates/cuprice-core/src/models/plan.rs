// src/models/plan.rs
//! Plan model for predefined pricing tiers
//!
//! Plans are seller-curated bundles of features shown as cards on the
//! pricing page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{lenient, Feature};

/// Link between a plan and one of the project's features
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeature {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub id: i64,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub plan_id: i64,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub feature_id: i64,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub multiplier: Decimal,

    pub feature: Feature,
}

/// Plan model representing a predefined pricing tier
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Unique plan ID
    #[serde(default, deserialize_with = "lenient::integer")]
    pub id: i64,

    /// Card title
    #[serde(default)]
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub project_id: i64,

    /// Display order, ascending
    #[serde(default, deserialize_with = "lenient::integer")]
    pub order: i64,

    /// Highlighted with a "Most Popular" badge
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_popular: bool,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_customized: bool,

    /// Only visible plans are rendered
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_visible: bool,

    #[serde(default)]
    pub stripe_product_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_per_user_pricing: bool,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub per_user_multiplier: Decimal,

    /// Declared monthly price; 0 means "sum of linked features"
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub base_price: Decimal,

    /// Free plans always display a price of 0
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_free: bool,

    /// Free trial length in days
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    pub freemium_day: Option<i64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Linked features, in display order
    #[serde(default)]
    pub plan_features: Vec<PlanFeature>,
}

impl Plan {
    /// Free trial days, only when positive
    pub fn trial_days(&self) -> Option<i64> {
        self.freemium_day.filter(|days| *days > 0)
    }

    /// Sum of the flat base price of every linked feature
    ///
    /// Feature kind is ignored: predefined plans never use unit pricing.
    pub fn linked_feature_total(&self) -> Decimal {
        self.plan_features
            .iter()
            .map(|pf| pf.feature.base_price)
            .sum()
    }

    /// Monthly base price before any discount
    pub fn monthly_base_price(&self) -> Decimal {
        if self.base_price > Decimal::ZERO {
            self.base_price
        } else {
            self.linked_feature_total()
        }
    }

    /// Linked features in display order
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.plan_features.iter().map(|pf| &pf.feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_test_plan(base_price: Decimal, feature_prices: &[Decimal]) -> Plan {
        Plan {
            id: 1,
            name: "Starter".to_string(),
            is_visible: true,
            base_price,
            plan_features: feature_prices
                .iter()
                .enumerate()
                .map(|(i, price)| PlanFeature {
                    id: i as i64,
                    plan_id: 1,
                    feature_id: i as i64,
                    multiplier: Decimal::ONE,
                    feature: Feature {
                        id: i as i64,
                        name: format!("Feature {}", i),
                        base_price: *price,
                        ..Default::default()
                    },
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_base_price_sums_features() {
        let plan = create_test_plan(dec!(0), &[dec!(10), dec!(20), dec!(5)]);
        assert_eq!(plan.monthly_base_price(), dec!(35));
    }

    #[test]
    fn test_declared_base_price_wins() {
        let plan = create_test_plan(dec!(49), &[dec!(10), dec!(20)]);
        assert_eq!(plan.monthly_base_price(), dec!(49));
    }

    #[test]
    fn test_trial_days_only_when_positive() {
        let mut plan = create_test_plan(dec!(10), &[]);
        assert_eq!(plan.trial_days(), None);
        plan.freemium_day = Some(0);
        assert_eq!(plan.trial_days(), None);
        plan.freemium_day = Some(14);
        assert_eq!(plan.trial_days(), Some(14));
    }
}
