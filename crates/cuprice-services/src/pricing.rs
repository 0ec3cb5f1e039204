//! Pricing resolver
//!
//! Two pure computations live here:
//! - the displayed price of a predefined plan (monthly or annual)
//! - the total of an ad-hoc custom plan across seats and duration tiers
//!
//! Money stays in `Decimal` until it is formatted. Custom plan totals are
//! computed monthly-first: `((sum * seats) * months) * (1 - discount)`.

use cuprice_core::currency::{format_fixed, format_price, rate_percent};
use cuprice_core::models::{DurationTier, Feature, FeatureKind, Plan, Project, SeatCount};
use cuprice_core::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::constants::MONTHS_PER_YEAR;
use crate::selection::SelectionState;

/// Billing period shown next to a plan price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Monthly,
    Annual,
}

impl BillingPeriod {
    /// Short suffix after the price (`/mth`, `/year`)
    pub fn suffix(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "mth",
            BillingPeriod::Annual => "year",
        }
    }
}

/// Resolved price of a predefined plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPrice {
    /// Monthly price after the annual discount, if it applies
    pub monthly_price: Decimal,

    /// `monthly_price * 12`
    pub annual_price: Decimal,

    /// Displayed amount: `0` for free plans, otherwise two fractional digits
    pub price: String,

    pub currency_symbol: &'static str,

    pub period: BillingPeriod,

    /// `Free forever`, `Billed monthly` or `Billed annually (...)`
    pub billing_label: String,

    pub is_free: bool,
}

impl PlanPrice {
    pub fn monthly_display(&self) -> String {
        format_fixed(self.monthly_price)
    }

    pub fn annual_display(&self) -> String {
        format_fixed(self.annual_price)
    }
}

/// Compute the displayed price for one predefined plan
///
/// The annual discount only applies when `is_annual` is set and the project
/// has the annual discount enabled. Feature kinds are ignored: plans are
/// always priced from flat base prices.
pub fn resolve_plan_price(plan: &Plan, project: &Project, is_annual: bool) -> PlanPrice {
    let base = plan.monthly_base_price();

    let monthly_price = if is_annual && project.annual_discount_enabled {
        base * (Decimal::ONE - project.annual_discount)
    } else {
        base
    };
    let annual_price = monthly_price * Decimal::from(MONTHS_PER_YEAR);

    let currency_symbol = project.currency_symbol();
    let period = if is_annual {
        BillingPeriod::Annual
    } else {
        BillingPeriod::Monthly
    };

    let (price, billing_label) = if plan.is_free {
        ("0".to_string(), "Free forever".to_string())
    } else if is_annual {
        let annual = format_fixed(annual_price);
        (
            annual.clone(),
            format!("Billed annually ({}{}/year)", currency_symbol, annual),
        )
    } else {
        (format_fixed(monthly_price), "Billed monthly".to_string())
    };

    PlanPrice {
        monthly_price,
        annual_price,
        price,
        currency_symbol,
        period,
        billing_label,
        is_free: plan.is_free,
    }
}

/// Months and discount rate for a duration tier
///
/// Unconfigured tiers resolve to a zero discount; availability is enforced
/// separately by [`effective_duration`].
pub fn duration_terms(project: &Project, tier: DurationTier) -> (u32, Decimal) {
    (tier.months(), project.discount_for(tier))
}

/// The tier actually billed: `tier` if available, otherwise `month`
pub fn effective_duration(project: &Project, tier: DurationTier) -> DurationTier {
    if project.is_tier_available(tier) {
        tier
    } else {
        DurationTier::Month
    }
}

/// Units counted for a countable feature when the buyer entered nothing
pub fn default_usage_amount(feature: &Feature) -> Decimal {
    match (feature.kind, feature.countable_data.as_ref()) {
        (FeatureKind::Limits, Some(data)) => data.usage_count,
        _ => Decimal::ZERO,
    }
}

fn out_of_range() -> AppError {
    AppError::InvalidInput("Amount is too large to price".to_string())
}

fn checked_mul(lhs: Decimal, rhs: Decimal) -> AppResult<Decimal> {
    lhs.checked_mul(rhs).ok_or_else(out_of_range)
}

/// Per-seat monthly contribution of one selected feature
///
/// Usage-based features multiply the unit price by the entered amount (0 if
/// unset); limit-based features fall back to the declared default quantity.
/// A stored amount always wins over the default, an explicit 0 included.
/// Everything else, including countable features without unit data, uses
/// the flat base price.
///
/// Fails with [`AppError::InvalidInput`] when the product leaves the
/// `Decimal` range.
pub fn feature_unit_contribution(feature: &Feature, usage_amount: Option<Decimal>) -> AppResult<Decimal> {
    match feature.unit_pricing() {
        Some(data) => {
            let amount = usage_amount.unwrap_or_else(|| default_usage_amount(feature));
            checked_mul(data.count_price, amount)
        }
        None => Ok(feature.base_price),
    }
}

/// Summary line total of a countable feature (`price * amount * seats`)
///
/// `Ok(None)` means the buyer still has to enter an amount.
pub fn feature_line_total(
    feature: &Feature,
    usage_amount: Option<Decimal>,
    seats: SeatCount,
) -> AppResult<Option<Decimal>> {
    let data = match feature.unit_pricing() {
        Some(data) => data,
        None => return Ok(None),
    };
    let amount = usage_amount.unwrap_or_else(|| default_usage_amount(feature));

    if data.count_price > Decimal::ZERO && amount > Decimal::ZERO {
        let per_seat = checked_mul(data.count_price, amount)?;
        checked_mul(per_seat, seats.as_decimal()).map(Some)
    } else {
        Ok(None)
    }
}

/// Priced custom plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPlanQuote {
    /// Tier billed after the availability guard
    pub duration: DurationTier,
    pub months: u32,
    pub discount_rate: Decimal,
    pub seats: SeatCount,
    pub feature_count: usize,

    /// Sum of per-feature contributions times seats
    pub base_monthly_total: Decimal,
    pub total_before_discount: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,

    pub currency: String,
}

/// Currency-formatted view of a [`CustomPlanQuote`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    pub monthly_price: String,
    pub months: u32,
    pub discount_percent: i64,
    pub total_before_discount: String,
    pub discount_amount: String,
    pub total: String,
}

impl CustomPlanQuote {
    /// Nothing selected: the total is zero and there is nothing to subscribe
    pub fn is_empty(&self) -> bool {
        self.feature_count == 0
    }

    pub fn discount_percent(&self) -> i64 {
        rate_percent(self.discount_rate)
    }

    pub fn breakdown(&self) -> QuoteBreakdown {
        QuoteBreakdown {
            monthly_price: format_price(self.base_monthly_total, &self.currency),
            months: self.months,
            discount_percent: self.discount_percent(),
            total_before_discount: format_price(self.total_before_discount, &self.currency),
            discount_amount: format_price(self.discount_amount, &self.currency),
            total: format_price(self.total, &self.currency),
        }
    }
}

/// Compute the total of a custom plan
///
/// Selected names that do not match a project feature contribute nothing.
/// A selected tier that is not available is billed as `month`. Amounts
/// whose total leaves the `Decimal` range are rejected, not wrapped.
#[instrument(skip(project, selection), fields(project_id = project.id))]
pub fn quote_custom_plan(project: &Project, selection: &SelectionState) -> AppResult<CustomPlanQuote> {
    let seats = selection.seats();
    let duration = effective_duration(project, selection.duration());
    let (months, discount_rate) = duration_terms(project, duration);

    let selected: Vec<&Feature> = project
        .features
        .iter()
        .filter(|f| selection.contains(&f.name))
        .collect();

    let mut unit_sum = Decimal::ZERO;
    for feature in &selected {
        let contribution = feature_unit_contribution(feature, selection.usage_amount(&feature.name))?;
        unit_sum = unit_sum.checked_add(contribution).ok_or_else(out_of_range)?;
    }

    let base_monthly_total = checked_mul(unit_sum, seats.as_decimal())?;
    let total_before_discount = checked_mul(base_monthly_total, Decimal::from(months))?;
    let kept_rate = Decimal::ONE.checked_sub(discount_rate).ok_or_else(out_of_range)?;
    let total = checked_mul(total_before_discount, kept_rate)?;
    let discount_amount = checked_mul(total_before_discount, discount_rate)?;

    debug!(
        features = selected.len(),
        seats = seats.get(),
        months,
        %total,
        "Custom plan quoted"
    );

    Ok(CustomPlanQuote {
        duration,
        months,
        discount_rate,
        seats,
        feature_count: selected.len(),
        base_monthly_total,
        total_before_discount,
        discount_amount,
        total,
        currency: project.currency.clone(),
    })
}
