//! Pricing page DTOs

use cuprice_core::models::lenient::decimal_from_value;
use cuprice_core::models::{CustomPlanSubscription, DurationTier, FeatureCategory, SeatCount};
use cuprice_core::{AppError, AppResult};
use cuprice_services::catalog::{
    DurationOption, FeatureListing, PageHeader, PlanCard, SummaryLine,
};
use cuprice_services::pricing::{CustomPlanQuote, QuoteBreakdown};
use cuprice_services::{AnnualToggle, CustomPlanBuilder, ResolvedTheme};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use validator::Validate;

/// Largest number of features accepted in one quote request
pub const MAX_QUOTE_FEATURES: u64 = 200;

/// Query parameters of the pricing page
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PricingPageQuery {
    /// Show annual prices (ignored when the project has no annual discount)
    #[serde(default)]
    pub annual: bool,

    /// Restrict the feature catalogue to one category tab
    pub category: Option<FeatureCategory>,

    /// Base URL override for the share endpoint
    #[validate(url(message = "api_url must be an absolute URL"))]
    pub api_url: Option<String>,
}

/// Custom plan selection sent by the buyer
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Selected feature names, in selection order
    #[serde(default)]
    #[validate(length(max = MAX_QUOTE_FEATURES, message = "Too many features selected"))]
    pub features: Vec<String>,

    /// Usage or limit amounts by feature name
    ///
    /// Strings are read like typed input, numbers are taken as-is and
    /// `null` leaves the default in place.
    #[serde(default)]
    pub usage_amounts: HashMap<String, Value>,

    /// One of 1, 5, 10, 25, 50, 100
    pub seats: Option<u32>,

    /// `month`, `3months`, `6months`, `9months` or `12months`
    pub duration: Option<String>,
}

impl QuoteRequest {
    /// Replay this selection onto a builder
    pub fn apply(&self, builder: &mut CustomPlanBuilder) -> AppResult<()> {
        for name in &self.features {
            builder.add_feature(name)?;
        }

        for (name, value) in &self.usage_amounts {
            match value {
                Value::Null => {}
                Value::String(raw) => {
                    builder.enter_usage_amount(name, raw)?.ok_or_else(|| {
                        AppError::InvalidInput(format!("Invalid amount for {}: {:?}", name, raw))
                    })?;
                }
                other => {
                    builder.set_usage_amount(name, decimal_from_value(other))?;
                }
            }
        }

        if let Some(seats) = self.seats {
            builder.set_seats(SeatCount::try_from(seats)?);
        }

        if let Some(duration) = &self.duration {
            let tier = DurationTier::from_str(duration)
                .ok_or_else(|| AppError::InvalidDuration(duration.clone()))?;
            builder.set_duration(tier);
        }

        Ok(())
    }
}

/// Everything needed to render the pricing page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPageResponse {
    pub project_id: i64,
    pub currency: String,
    pub currency_symbol: &'static str,
    pub header: PageHeader,
    pub annual_toggle: AnnualToggle,
    pub plans: Vec<PlanCard>,
    pub features: Vec<FeatureListing>,
    pub duration_options: Vec<DurationOption>,
    pub seat_options: Vec<u32>,
    pub theme: ResolvedTheme,
    pub css_variables: BTreeMap<String, String>,
    pub root_style: String,
}

/// Priced custom plan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote: CustomPlanQuote,
    pub breakdown: QuoteBreakdown,
    pub lines: Vec<SummaryLine>,
    pub can_subscribe: bool,
}

impl TryFrom<&CustomPlanBuilder> for QuoteResponse {
    type Error = AppError;

    fn try_from(builder: &CustomPlanBuilder) -> Result<Self, Self::Error> {
        let quote = builder.quote()?;
        Ok(QuoteResponse {
            breakdown: quote.breakdown(),
            quote,
            lines: builder.summary()?,
            can_subscribe: builder.can_subscribe(),
        })
    }
}

/// Confirmed custom plan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub subscription: CustomPlanSubscription,
    pub quote: QuoteResponse,
}

/// Confirmed plan pick
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSelectionResponse {
    pub plan: PlanCard,
}
