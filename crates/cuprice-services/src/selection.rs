//! Custom plan selection state
//!
//! `SelectionState` is the raw, UI-owned state of the custom plan builder.
//! `CustomPlanBuilder` binds it to a loaded project and keeps it consistent:
//! only known features can be selected, usage amounts are never negative,
//! and the duration tier always refers to an available discount tier.

use cuprice_core::models::{CustomPlanSubscription, DurationTier, FeatureKind, Project, SeatCount};
use cuprice_core::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::catalog::{summary_lines, SummaryLine};
use crate::pricing::{effective_duration, quote_custom_plan, CustomPlanQuote};

/// Numeric text as typed into an amount field: optional sign, digits, one dot
static USAGE_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-)?(\d*)(?:\.(\d*))?$").expect("usage input pattern is valid"));

/// Parse a usage amount typed by the buyer
///
/// Empty or partial input (`""`, `"."`, `"-"`) reads as 0 and negative
/// values floor to 0. Anything that is not a plain decimal number is
/// rejected with `None` so the caller keeps the previous value.
pub fn parse_usage_input(raw: &str) -> Option<Decimal> {
    let captures = USAGE_INPUT.captures(raw.trim())?;

    let sign = captures.get(1).map_or("", |m| m.as_str());
    let integer = captures.get(2).map_or("", |m| m.as_str());
    let fraction = captures.get(3).map_or("", |m| m.as_str());

    let normalized = format!(
        "{}{}.{}",
        sign,
        if integer.is_empty() { "0" } else { integer },
        if fraction.is_empty() { "0" } else { fraction },
    );

    let value = Decimal::from_str(&normalized).ok()?;
    Some(value.max(Decimal::ZERO))
}

/// Buyer selections for a custom plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Selected feature names, unique, in selection order
    features: Vec<String>,
    usage_amounts: HashMap<String, Decimal>,
    seats: SeatCount,
    duration: DurationTier,
}

impl SelectionState {
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.iter().any(|f| f == name)
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Select a feature; returns false if it was already selected
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.features.push(name);
        true
    }

    /// Deselect a feature and forget its amount
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.features.len();
        self.features.retain(|f| f != name);
        self.usage_amounts.remove(name);
        self.features.len() != before
    }

    /// Entered amount for a feature, if any
    pub fn usage_amount(&self, name: &str) -> Option<Decimal> {
        self.usage_amounts.get(name).copied()
    }

    pub fn usage_amounts(&self) -> &HashMap<String, Decimal> {
        &self.usage_amounts
    }

    /// Store an amount, floored at 0; returns the stored value
    pub fn set_amount(&mut self, name: impl Into<String>, amount: Decimal) -> Decimal {
        let amount = amount.max(Decimal::ZERO);
        self.usage_amounts.insert(name.into(), amount);
        amount
    }

    pub fn seats(&self) -> SeatCount {
        self.seats
    }

    pub fn set_seats(&mut self, seats: SeatCount) {
        self.seats = seats;
    }

    pub fn duration(&self) -> DurationTier {
        self.duration
    }

    /// Store a tier as-is; see [`SelectionState::restore_duration`]
    pub fn set_duration(&mut self, duration: DurationTier) {
        self.duration = duration;
    }

    /// Fall back to `month` if the tier is not available for `project`
    ///
    /// Returns true when the tier was reset.
    pub fn restore_duration(&mut self, project: &Project) -> bool {
        let effective = effective_duration(project, self.duration);
        if effective != self.duration {
            debug!(
                from = %self.duration,
                to = %effective,
                "Duration tier no longer available, resetting"
            );
            self.duration = effective;
            return true;
        }
        false
    }

    /// Subscription payload, or `None` when nothing is selected
    pub fn to_subscription(&self) -> Option<CustomPlanSubscription> {
        if self.is_empty() {
            return None;
        }

        let usage_amounts: BTreeMap<String, Decimal> = self
            .usage_amounts
            .iter()
            .filter(|(name, _)| self.contains(name))
            .map(|(name, amount)| (name.clone(), *amount))
            .collect();

        Some(CustomPlanSubscription {
            features: self.features.clone(),
            seats: self.seats,
            duration: self.duration,
            usage_amounts,
        })
    }
}

/// Custom plan builder session bound to one project
///
/// A builder is created when the buyer opens the custom plan interface and
/// dropped when it closes, so selections never outlive a session.
#[derive(Debug, Clone)]
pub struct CustomPlanBuilder {
    project: Arc<Project>,
    selection: SelectionState,
}

impl CustomPlanBuilder {
    /// Start an empty session: no features, one seat, monthly
    pub fn new(project: Arc<Project>) -> Self {
        Self {
            project,
            selection: SelectionState::default(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Select a feature by name
    ///
    /// Adding a limit-based feature seeds its amount with the declared
    /// default quantity.
    #[instrument(skip(self))]
    pub fn add_feature(&mut self, name: &str) -> AppResult<bool> {
        let feature = self
            .project
            .find_feature(name)
            .ok_or_else(|| AppError::UnknownFeature(name.to_string()))?;

        if !self.selection.insert(name) {
            return Ok(false);
        }

        if feature.kind == FeatureKind::Limits {
            if let Some(data) = &feature.countable_data {
                self.selection.set_amount(name, data.usage_count);
            }
        }

        Ok(true)
    }

    /// Deselect a feature; unknown or unselected names are a no-op
    pub fn remove_feature(&mut self, name: &str) -> bool {
        self.selection.remove(name)
    }

    /// Flip a feature's selection; returns whether it is now selected
    pub fn toggle_feature(&mut self, name: &str) -> AppResult<bool> {
        if self.selection.contains(name) {
            self.remove_feature(name);
            Ok(false)
        } else {
            self.add_feature(name)?;
            Ok(true)
        }
    }

    /// Set a usage amount directly, floored at 0
    pub fn set_usage_amount(&mut self, name: &str, amount: Decimal) -> AppResult<Decimal> {
        self.ensure_known(name)?;
        Ok(self.selection.set_amount(name, amount))
    }

    /// Apply text typed into a usage amount field
    ///
    /// Returns the stored value, or `None` when the input was rejected and
    /// the previous value kept.
    pub fn enter_usage_amount(&mut self, name: &str, raw: &str) -> AppResult<Option<Decimal>> {
        self.ensure_known(name)?;

        match parse_usage_input(raw) {
            Some(amount) => Ok(Some(self.selection.set_amount(name, amount))),
            None => {
                debug!(feature = name, input = raw, "Rejected non-numeric usage input");
                Ok(None)
            }
        }
    }

    pub fn set_seats(&mut self, seats: SeatCount) {
        self.selection.set_seats(seats);
    }

    /// Choose a duration tier; unavailable tiers fall back to `month`
    ///
    /// Returns the tier actually stored.
    pub fn set_duration(&mut self, duration: DurationTier) -> DurationTier {
        self.selection.set_duration(duration);
        self.selection.restore_duration(&self.project);
        self.selection.duration()
    }

    /// Swap in freshly loaded project data and restore invariants
    ///
    /// Selected features missing from the new catalogue are dropped.
    pub fn replace_project(&mut self, project: Arc<Project>) {
        self.project = project;

        let stale: Vec<String> = self
            .selection
            .features()
            .iter()
            .filter(|name| self.project.find_feature(name).is_none())
            .cloned()
            .collect();
        for name in &stale {
            debug!(feature = %name, "Dropping feature missing from reloaded project");
            self.selection.remove(name);
        }

        self.selection.restore_duration(&self.project);
    }

    pub fn quote(&self) -> AppResult<CustomPlanQuote> {
        quote_custom_plan(&self.project, &self.selection)
    }

    /// Summary lines for the selected features
    pub fn summary(&self) -> AppResult<Vec<SummaryLine>> {
        summary_lines(&self.project, &self.selection)
    }

    pub fn can_subscribe(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Subscription payload, or `None` when there is nothing to subscribe
    pub fn subscription(&self) -> Option<CustomPlanSubscription> {
        self.selection.to_subscription()
    }

    /// Clear every selection, keeping the project
    pub fn reset(&mut self) {
        self.selection = SelectionState::default();
    }

    fn ensure_known(&self, name: &str) -> AppResult<()> {
        if self.project.find_feature(name).is_some() {
            Ok(())
        } else {
            Err(AppError::UnknownFeature(name.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn project() -> Arc<Project> {
        let project: Project = serde_json::from_value(json!({
            "id": 3,
            "name": "Acme",
            "currency": "USD",
            "annualDiscount": 0.1,
            "annualDiscountEnabled": true,
            "monthGroupDiscounts": { "3": 0.05, "6": 0 },
            "features": [
                { "id": 1, "name": "SSO", "featureType": "Standard", "basePrice": 10 },
                { "id": 2, "name": "Storage", "featureType": "Limits", "basePrice": 0,
                  "countableData": { "usageCount": 50, "countPrice": 2, "condition": "GB" } },
                { "id": 3, "name": "API calls", "featureType": "Usage Based", "basePrice": 0,
                  "countableData": { "usageCount": 0, "countPrice": 0.01, "condition": "call" } }
            ],
            "pricingPlans": []
        }))
        .unwrap();
        Arc::new(project)
    }

    #[test]
    fn test_parse_usage_input() {
        assert_eq!(parse_usage_input("150"), Some(dec!(150)));
        assert_eq!(parse_usage_input("2.5"), Some(dec!(2.5)));
        assert_eq!(parse_usage_input(".5"), Some(dec!(0.5)));
        assert_eq!(parse_usage_input("7."), Some(dec!(7)));
        assert_eq!(parse_usage_input(""), Some(dec!(0)));
        assert_eq!(parse_usage_input("."), Some(dec!(0)));
        assert_eq!(parse_usage_input("-40"), Some(dec!(0)));
        assert_eq!(parse_usage_input("abc"), None);
        assert_eq!(parse_usage_input("1e5"), None);
        assert_eq!(parse_usage_input("1.2.3"), None);
    }

    #[test]
    fn test_selection_uniqueness() {
        let mut state = SelectionState::default();
        assert!(state.insert("SSO"));
        assert!(!state.insert("SSO"));
        assert_eq!(state.features(), ["SSO".to_string()]);
        assert!(state.remove("SSO"));
        assert!(!state.remove("SSO"));
    }

    #[test]
    fn test_add_limits_feature_seeds_amount() {
        let mut builder = CustomPlanBuilder::new(project());
        assert!(builder.add_feature("Storage").unwrap());
        assert_eq!(builder.selection().usage_amount("Storage"), Some(dec!(50)));

        builder.remove_feature("Storage");
        assert_eq!(builder.selection().usage_amount("Storage"), None);
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let mut builder = CustomPlanBuilder::new(project());
        assert!(matches!(
            builder.add_feature("Telepathy"),
            Err(AppError::UnknownFeature(_))
        ));
        assert!(builder.selection().is_empty());
    }

    #[test]
    fn test_usage_entry_keeps_last_valid_value() {
        let mut builder = CustomPlanBuilder::new(project());
        builder.add_feature("API calls").unwrap();

        assert_eq!(
            builder.enter_usage_amount("API calls", "1200").unwrap(),
            Some(dec!(1200))
        );
        assert_eq!(builder.enter_usage_amount("API calls", "12x").unwrap(), None);
        assert_eq!(builder.selection().usage_amount("API calls"), Some(dec!(1200)));

        assert_eq!(
            builder.enter_usage_amount("API calls", "-3").unwrap(),
            Some(dec!(0))
        );
        assert_eq!(builder.set_usage_amount("API calls", dec!(-9)).unwrap(), dec!(0));
    }

    #[test]
    fn test_duration_guard() {
        let mut builder = CustomPlanBuilder::new(project());
        assert_eq!(builder.set_duration(DurationTier::ThreeMonths), DurationTier::ThreeMonths);
        assert_eq!(builder.set_duration(DurationTier::SixMonths), DurationTier::Month);
        assert_eq!(builder.set_duration(DurationTier::NineMonths), DurationTier::Month);
        assert_eq!(builder.set_duration(DurationTier::TwelveMonths), DurationTier::TwelveMonths);
    }

    #[test]
    fn test_reload_resets_unavailable_tier() {
        let mut builder = CustomPlanBuilder::new(project());
        builder.add_feature("SSO").unwrap();
        builder.set_duration(DurationTier::TwelveMonths);

        let mut reloaded = (*project()).clone();
        reloaded.annual_discount_enabled = false;
        reloaded.features.retain(|f| f.name != "Storage");
        builder.replace_project(Arc::new(reloaded));

        assert_eq!(builder.selection().duration(), DurationTier::Month);
        assert!(builder.selection().contains("SSO"));
    }

    #[test]
    fn test_reload_drops_removed_features() {
        let mut builder = CustomPlanBuilder::new(project());
        builder.add_feature("Storage").unwrap();

        let mut reloaded = (*project()).clone();
        reloaded.features.retain(|f| f.name != "Storage");
        builder.replace_project(Arc::new(reloaded));

        assert!(builder.selection().is_empty());
        assert_eq!(builder.selection().usage_amount("Storage"), None);
    }

    #[test]
    fn test_subscription_payload() {
        let mut builder = CustomPlanBuilder::new(project());
        assert!(builder.subscription().is_none());

        builder.add_feature("Storage").unwrap();
        builder.add_feature("SSO").unwrap();
        builder.set_seats(SeatCount::try_from(10).unwrap());
        builder.set_duration(DurationTier::ThreeMonths);

        let subscription = builder.subscription().unwrap();
        assert_eq!(subscription.features, vec!["Storage", "SSO"]);
        assert_eq!(subscription.seats.get(), 10);
        assert_eq!(subscription.duration, DurationTier::ThreeMonths);
        assert_eq!(subscription.usage_amounts.get("Storage"), Some(&dec!(50)));

        builder.reset();
        assert!(!builder.can_subscribe());
        assert_eq!(builder.selection().seats(), SeatCount::ONE);
    }

    #[test]
    fn test_builder_quote() {
        let mut builder = CustomPlanBuilder::new(project());
        builder.add_feature("SSO").unwrap();
        builder.add_feature("Storage").unwrap();

        let quote = builder.quote().unwrap();
        assert_eq!(quote.total, dec!(110));
        assert_eq!(builder.summary().unwrap().len(), 2);
    }

    #[test]
    fn test_typed_amount_beyond_decimal_range_fails_quote() {
        let mut builder = CustomPlanBuilder::new(project());
        builder.add_feature("Storage").unwrap();

        let stored = builder
            .enter_usage_amount("Storage", "79228162514264337593543950335")
            .unwrap();
        assert_eq!(stored, Some(Decimal::MAX));

        assert!(matches!(builder.quote(), Err(AppError::InvalidInput(_))));
        assert!(builder.summary().is_err());
        assert!(builder.subscription().is_some());
    }
}
