//! Feature model
//!
//! A feature is an individually priced capability. It can be bundled into a
//! plan or picked ad hoc in the custom plan builder.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::lenient;

/// Pricing kind of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeatureKind {
    /// Flat per-seat monthly price
    #[default]
    Standard,
    /// Priced per consumed unit, amount entered by the buyer
    UsageBased,
    /// Priced per provisioned unit, defaults to a declared quantity
    Limits,
    /// AI capability, priced like a standard feature
    Ai,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Standard => write!(f, "Standard"),
            FeatureKind::UsageBased => write!(f, "Usage Based"),
            FeatureKind::Limits => write!(f, "Limits"),
            FeatureKind::Ai => write!(f, "AI"),
        }
    }
}

impl FeatureKind {
    /// Parse from the backend's `featureType` string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "standard" => Some(FeatureKind::Standard),
            "usagebased" => Some(FeatureKind::UsageBased),
            "limits" | "limit" => Some(FeatureKind::Limits),
            "ai" => Some(FeatureKind::Ai),
            _ => None,
        }
    }

    /// Usage-based and limit-based features are priced per unit
    pub fn is_countable(&self) -> bool {
        matches!(self, FeatureKind::UsageBased | FeatureKind::Limits)
    }

    /// Catalogue tab this kind is listed under
    pub fn category(&self) -> FeatureCategory {
        match self {
            FeatureKind::UsageBased | FeatureKind::Limits => FeatureCategory::Countable,
            FeatureKind::Standard => FeatureCategory::Standard,
            FeatureKind::Ai => FeatureCategory::Ai,
        }
    }
}

impl Serialize for FeatureKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeatureKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Unknown kinds carry no pricing rule of their own
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .and_then(FeatureKind::from_str)
            .unwrap_or_default())
    }
}

/// Catalogue grouping used by the custom plan builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureCategory {
    Countable,
    Standard,
    #[serde(rename = "AI")]
    Ai,
}

impl FeatureCategory {
    /// All categories in tab order
    pub const ALL: [FeatureCategory; 3] = [
        FeatureCategory::Countable,
        FeatureCategory::Standard,
        FeatureCategory::Ai,
    ];
}

/// Per-unit pricing data for countable features
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CountableData {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub id: i64,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub feature_id: i64,

    /// Default usage / limit quantity
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub usage_count: Decimal,

    /// Unit label, e.g. "API call"
    #[serde(default)]
    pub condition: String,

    /// Price per unit
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub count_price: Decimal,

    /// `sum`, `max` or `avg`; display only
    #[serde(default)]
    pub event_aggregation_method: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CountableData {
    /// Human label for the aggregation method, if any
    pub fn aggregation_label(&self) -> Option<String> {
        match self.event_aggregation_method.as_deref().map(str::trim) {
            None | Some("") | Some("-") => None,
            Some("sum") => Some("Total usage".to_string()),
            Some("max") => Some("Peak usage".to_string()),
            Some("avg") => Some("Average usage".to_string()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Feature entity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "featureType", default)]
    pub kind: FeatureKind,

    /// Flat monthly price, per seat
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub base_price: Decimal,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub project_id: i64,

    #[serde(default)]
    pub countable_data: Option<CountableData>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Feature {
    /// Unit pricing data, only for countable kinds
    pub fn unit_pricing(&self) -> Option<&CountableData> {
        if self.kind.is_countable() {
            self.countable_data.as_ref()
        } else {
            None
        }
    }

    /// Description if present and not blank
    pub fn display_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_feature_kind_parsing() {
        assert_eq!(FeatureKind::from_str("Usage Based"), Some(FeatureKind::UsageBased));
        assert_eq!(FeatureKind::from_str("usage_based"), Some(FeatureKind::UsageBased));
        assert_eq!(FeatureKind::from_str("Limits"), Some(FeatureKind::Limits));
        assert_eq!(FeatureKind::from_str("AI"), Some(FeatureKind::Ai));
        assert_eq!(FeatureKind::from_str("Standard"), Some(FeatureKind::Standard));
        assert_eq!(FeatureKind::from_str("Bundle"), None);
    }

    #[test]
    fn test_feature_deserializes_backend_shape() {
        let feature: Feature = serde_json::from_value(json!({
            "id": 4,
            "name": "API Calls",
            "featureType": "Usage Based",
            "basePrice": 0,
            "projectId": 1,
            "countableData": {
                "id": 9,
                "featureId": 4,
                "usageCount": 1000,
                "condition": "call",
                "countPrice": 0.01,
                "eventAggregationMethod": "sum"
            }
        }))
        .unwrap();

        assert_eq!(feature.kind, FeatureKind::UsageBased);
        let data = feature.unit_pricing().unwrap();
        assert_eq!(data.count_price, dec!(0.01));
        assert_eq!(data.usage_count, dec!(1000));
        assert_eq!(data.aggregation_label().as_deref(), Some("Total usage"));
    }

    #[test]
    fn test_unknown_kind_falls_back_to_standard() {
        let feature: Feature = serde_json::from_value(json!({
            "name": "Mystery",
            "featureType": "Something else",
            "basePrice": null
        }))
        .unwrap();
        assert_eq!(feature.kind, FeatureKind::Standard);
        assert_eq!(feature.base_price, Decimal::ZERO);
    }

    #[test]
    fn test_standard_feature_has_no_unit_pricing() {
        let feature = Feature {
            name: "SSO".to_string(),
            kind: FeatureKind::Standard,
            countable_data: Some(CountableData::default()),
            ..Default::default()
        };
        assert!(feature.unit_pricing().is_none());
        assert_eq!(feature.kind.category(), FeatureCategory::Standard);
    }

    #[test]
    fn test_aggregation_labels() {
        let mut data = CountableData::default();
        assert_eq!(data.aggregation_label(), None);
        data.event_aggregation_method = Some("-".to_string());
        assert_eq!(data.aggregation_label(), None);
        data.event_aggregation_method = Some("max".to_string());
        assert_eq!(data.aggregation_label().as_deref(), Some("Peak usage"));
        data.event_aggregation_method = Some("p95".to_string());
        assert_eq!(data.aggregation_label().as_deref(), Some("p95"));
    }
}
