//! Display models for the pricing page
//!
//! Plan cards, the annual toggle, the duration and seat menus, and the
//! feature catalogue labels of the custom plan builder. Every price here is
//! derived from the resolver in [`crate::pricing`].

use cuprice_core::currency::{format_price, rate_percent};
use cuprice_core::AppResult;
use cuprice_core::models::{DurationTier, Feature, FeatureCategory, FeatureKind, Plan, Project, SeatCount};
use serde::Serialize;

use crate::constants::{DEFAULT_SUBTITLE, DEFAULT_TITLE};
use crate::pricing::{default_usage_amount, feature_line_total, resolve_plan_price};
use crate::selection::SelectionState;
use crate::theme::ResolvedTheme;

/// Feature line on a plan card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCardFeature {
    pub name: String,
    pub description: Option<String>,
}

/// Fully resolved plan card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCard {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,

    /// Headline amount; `0` for free plans and plans with a free trial
    pub price: String,
    pub currency_symbol: &'static str,

    /// `mth` or `year`
    pub period: &'static str,
    /// `Month` or `Year`
    pub period_label: &'static str,
    pub billing_label: String,

    pub button_text: &'static str,
    pub is_popular: bool,
    pub is_free: bool,
    /// `Free` or `Paid`
    pub badge: &'static str,
    pub trial_label: Option<String>,

    pub features: Vec<PlanCardFeature>,
}

impl PlanCard {
    /// Build the card for one plan
    pub fn build(plan: &Plan, project: &Project, is_annual: bool) -> Self {
        let resolved = resolve_plan_price(plan, project, is_annual);
        let trial_days = plan.trial_days();

        let price = if trial_days.is_some() {
            "0".to_string()
        } else {
            resolved.price
        };

        let period = resolved.period.suffix();

        PlanCard {
            id: plan.id,
            title: plan.name.clone(),
            description: plan.description.clone(),
            price,
            currency_symbol: resolved.currency_symbol,
            period,
            period_label: if is_annual { "Year" } else { "Month" },
            billing_label: resolved.billing_label,
            button_text: if plan.is_free { "Get Started" } else { "Choose Plan" },
            is_popular: plan.is_popular,
            is_free: plan.is_free,
            badge: if plan.is_free { "Free" } else { "Paid" },
            trial_label: trial_days.map(trial_label),
            features: plan
                .features()
                .map(|f| PlanCardFeature {
                    name: f.name.clone(),
                    description: f.display_description().map(str::to_string),
                })
                .collect(),
        }
    }
}

fn trial_label(days: i64) -> String {
    format!(
        "Get {} {} free access to all premium features",
        days,
        if days == 1 { "day" } else { "days" }
    )
}

/// Cards for every visible plan, in display order
pub fn plan_cards(project: &Project, is_annual: bool) -> Vec<PlanCard> {
    project
        .visible_plans()
        .into_iter()
        .map(|plan| PlanCard::build(plan, project, is_annual))
        .collect()
}

/// Monthly / annual switch above the plan cards
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualToggle {
    pub available: bool,
    pub is_annual: bool,
    pub discount_percent: i64,
    /// `Annual (SAVE N%)`, absent when the toggle is unavailable
    pub label: Option<String>,
}

impl AnnualToggle {
    pub fn build(project: &Project, is_annual: bool) -> Self {
        let available = project.annual_discount_enabled;
        let discount_percent = rate_percent(project.annual_discount);

        AnnualToggle {
            available,
            is_annual: available && is_annual,
            discount_percent,
            label: available.then(|| format!("Annual (SAVE {}%)", discount_percent)),
        }
    }
}

/// Entry of the duration menu
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationOption {
    pub tier: DurationTier,
    pub months: u32,
    pub discount_percent: i64,
    pub label: String,
}

/// Duration menu: `Monthly` plus every available discounted tier
pub fn duration_options(project: &Project) -> Vec<DurationOption> {
    project
        .available_tiers()
        .into_iter()
        .map(|tier| {
            let discount_percent = rate_percent(project.discount_for(tier));
            let label = match tier {
                DurationTier::Month => "Monthly".to_string(),
                other => format!("{} Months ({}%)", other.months(), discount_percent),
            };
            DurationOption {
                tier,
                months: tier.months(),
                discount_percent,
                label,
            }
        })
        .collect()
}

/// Seat menu values
pub fn seat_options() -> Vec<u32> {
    SeatCount::options().map(|s| s.get()).collect()
}

/// Feature entry of the custom plan catalogue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureListing {
    pub name: String,
    pub description: Option<String>,
    pub kind: FeatureKind,
    pub category: FeatureCategory,
    pub price_label: String,
    /// Unit name for countable features, e.g. `GB`
    pub unit: Option<String>,
    /// Pre-filled amount for limit-based features
    pub default_amount: Option<String>,
}

impl FeatureListing {
    pub fn build(feature: &Feature, currency: &str) -> Self {
        let unit = feature.unit_pricing();

        let price_label = match (feature.kind.is_countable(), unit) {
            (true, Some(data)) => format!(
                "{} per {}",
                format_price(data.count_price, currency),
                data.condition
            ),
            (true, None) => format_price(feature.base_price, currency),
            (false, _) => format!("{} per user/month", format_price(feature.base_price, currency)),
        };

        FeatureListing {
            name: feature.name.clone(),
            description: feature.display_description().map(str::to_string),
            kind: feature.kind,
            category: feature.kind.category(),
            price_label,
            unit: unit.map(|d| d.condition.clone()),
            default_amount: (feature.kind == FeatureKind::Limits && unit.is_some())
                .then(|| default_usage_amount(feature).normalize().to_string()),
        }
    }
}

/// Catalogue listings, optionally restricted to one category tab
pub fn feature_catalogue(project: &Project, category: Option<FeatureCategory>) -> Vec<FeatureListing> {
    project
        .features
        .iter()
        .filter(|f| category.map_or(true, |c| f.kind.category() == c))
        .map(|f| FeatureListing::build(f, &project.currency))
        .collect()
}

/// Line of the "selected plan" summary in the custom plan builder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub name: String,
    pub kind: FeatureKind,
    /// Flat features: `$12.00/user/month`; countable: unit price label
    pub price_label: String,
    /// Usage-based aggregation, e.g. `Total usage`
    pub aggregation_label: Option<String>,
    /// Countable line total, or `Enter amount` while it is zero
    pub line_total: Option<String>,
}

/// Summary lines for the selected features, in selection order
pub fn summary_lines(project: &Project, selection: &SelectionState) -> AppResult<Vec<SummaryLine>> {
    selection
        .features()
        .iter()
        .filter_map(|name| project.find_feature(name))
        .map(|feature| {
            let listing = FeatureListing::build(feature, &project.currency);

            match feature.unit_pricing() {
                Some(data) => {
                    let total = feature_line_total(
                        feature,
                        selection.usage_amount(&feature.name),
                        selection.seats(),
                    )?;
                    Ok(SummaryLine {
                        name: feature.name.clone(),
                        kind: feature.kind,
                        price_label: listing.price_label,
                        aggregation_label: if feature.kind == FeatureKind::UsageBased {
                            data.aggregation_label()
                        } else {
                            None
                        },
                        line_total: Some(match total {
                            Some(amount) => format_price(amount, &project.currency),
                            None => "Enter amount".to_string(),
                        }),
                    })
                }
                None => Ok(SummaryLine {
                    name: feature.name.clone(),
                    kind: feature.kind,
                    price_label: format!("{}/user/month", format_price(feature.base_price, &project.currency)),
                    aggregation_label: None,
                    line_total: None,
                }),
            }
        })
        .collect()
}

/// Page header text and visibility
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHeader {
    pub title: String,
    pub subtitle: String,
    pub logo: Option<String>,
    pub show_project_name: bool,
    pub show_pricing_header: bool,
}

impl PageHeader {
    pub fn build(project: &Project, theme: &ResolvedTheme) -> Self {
        let non_blank = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        PageHeader {
            title: non_blank(&Some(project.name.clone())).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            subtitle: non_blank(&project.description).unwrap_or_else(|| DEFAULT_SUBTITLE.to_string()),
            logo: non_blank(&project.logo),
            show_project_name: theme.show_project_name,
            show_pricing_header: theme.show_pricing_header,
        }
    }

    /// Whether the header block renders at all
    pub fn is_visible(&self) -> bool {
        self.show_project_name || self.show_pricing_header
    }
}
