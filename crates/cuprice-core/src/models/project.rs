//! Shared project model
//!
//! The project is the root of the payload served at `/api/share/{share_id}`:
//! currency, discount configuration, theme and the feature/plan catalogue.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{lenient, DurationTier, Feature, LegacyTheme, Plan, ThemeSettings};
use crate::currency;

/// Shared project entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// ISO 4217 currency code
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub logo: Option<String>,

    #[serde(default)]
    pub share_id: Option<String>,

    /// Annual discount rate in [0, 1)
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub annual_discount: Decimal,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub annual_discount_enabled: bool,

    /// Month-tier label ("3", "6", "9") to discount rate
    #[serde(default, deserialize_with = "lenient::rate_map")]
    pub month_group_discounts: HashMap<String, Decimal>,

    /// Legacy theme, either a JSON string or an object
    #[serde(default)]
    pub theme: Option<Value>,

    #[serde(default, deserialize_with = "lenient_theme_settings")]
    pub theme_settings: Option<ThemeSettings>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub features: Vec<Feature>,

    #[serde(default)]
    pub pricing_plans: Vec<Plan>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn lenient_theme_settings<'de, D>(deserializer: D) -> Result<Option<ThemeSettings>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match serde_json::from_value(v) {
        Ok(settings) => Some(settings),
        Err(e) => {
            debug!("Ignoring malformed theme settings: {}", e);
            None
        }
    }))
}

impl Project {
    /// Short currency symbol for plan cards
    pub fn currency_symbol(&self) -> &'static str {
        currency::currency_symbol(&self.currency)
    }

    /// Annual discount rate if the annual discount is enabled, else 0
    pub fn effective_annual_discount(&self) -> Decimal {
        if self.annual_discount_enabled {
            self.annual_discount
        } else {
            Decimal::ZERO
        }
    }

    /// Month-group discount for a tier label, 0 if unset
    pub fn month_group_discount(&self, key: &str) -> Decimal {
        self.month_group_discounts
            .get(key)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Discount rate applied to a duration tier
    pub fn discount_for(&self, tier: DurationTier) -> Decimal {
        match tier {
            DurationTier::Month => Decimal::ZERO,
            DurationTier::TwelveMonths => self.effective_annual_discount(),
            other => other
                .month_group_key()
                .map_or(Decimal::ZERO, |key| self.month_group_discount(key)),
        }
    }

    /// Whether a tier may be selected at all
    ///
    /// `month` is always available; every other tier needs a configured
    /// discount above zero (and the 12-month tier the annual flag).
    pub fn is_tier_available(&self, tier: DurationTier) -> bool {
        match tier {
            DurationTier::Month => true,
            other => self.discount_for(other) > Decimal::ZERO,
        }
    }

    /// Selectable duration tiers in menu order
    pub fn available_tiers(&self) -> Vec<DurationTier> {
        DurationTier::ALL
            .into_iter()
            .filter(|tier| self.is_tier_available(*tier))
            .collect()
    }

    /// Visible plans in ascending display order
    pub fn visible_plans(&self) -> Vec<&Plan> {
        let mut plans: Vec<&Plan> = self.pricing_plans.iter().filter(|p| p.is_visible).collect();
        plans.sort_by_key(|p| p.order);
        plans
    }

    /// Find a feature by its name
    pub fn find_feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Find a plan by id
    pub fn find_plan(&self, id: i64) -> Option<&Plan> {
        self.pricing_plans.iter().find(|p| p.id == id)
    }

    /// Parsed legacy theme, if present and well-formed
    pub fn legacy_theme(&self) -> Option<LegacyTheme> {
        self.theme.as_ref().and_then(LegacyTheme::from_value)
    }
}
