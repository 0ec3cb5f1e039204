//! Selection types for the custom plan builder
//!
//! Seat counts and duration tiers are closed menus; both are typed so an
//! out-of-menu value cannot be represented.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::AppError;

/// Seat menu offered by the builder
pub const SEAT_OPTIONS: [u32; 6] = [1, 5, 10, 25, 50, 100];

/// Number of seats, restricted to [`SEAT_OPTIONS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SeatCount(u32);

impl SeatCount {
    /// One seat
    pub const ONE: SeatCount = SeatCount(1);

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    /// Every selectable seat count, ascending
    pub fn options() -> impl Iterator<Item = SeatCount> {
        SEAT_OPTIONS.iter().map(|n| SeatCount(*n))
    }
}

impl Default for SeatCount {
    fn default() -> Self {
        SeatCount::ONE
    }
}

impl TryFrom<u32> for SeatCount {
    type Error = AppError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if SEAT_OPTIONS.contains(&value) {
            Ok(SeatCount(value))
        } else {
            Err(AppError::InvalidSeatCount(value))
        }
    }
}

impl From<SeatCount> for u32 {
    fn from(seats: SeatCount) -> Self {
        seats.0
    }
}

impl fmt::Display for SeatCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commitment term for a custom plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DurationTier {
    #[default]
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "9months")]
    NineMonths,
    #[serde(rename = "12months")]
    TwelveMonths,
}

impl DurationTier {
    /// All tiers in menu order
    pub const ALL: [DurationTier; 5] = [
        DurationTier::Month,
        DurationTier::ThreeMonths,
        DurationTier::SixMonths,
        DurationTier::NineMonths,
        DurationTier::TwelveMonths,
    ];

    /// Number of months billed
    pub fn months(&self) -> u32 {
        match self {
            DurationTier::Month => 1,
            DurationTier::ThreeMonths => 3,
            DurationTier::SixMonths => 6,
            DurationTier::NineMonths => 9,
            DurationTier::TwelveMonths => 12,
        }
    }

    /// Key into the project's month-group discount map
    pub fn month_group_key(&self) -> Option<&'static str> {
        match self {
            DurationTier::ThreeMonths => Some("3"),
            DurationTier::SixMonths => Some("6"),
            DurationTier::NineMonths => Some("9"),
            DurationTier::Month | DurationTier::TwelveMonths => None,
        }
    }

    /// Wire name, e.g. `3months`
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationTier::Month => "month",
            DurationTier::ThreeMonths => "3months",
            DurationTier::SixMonths => "6months",
            DurationTier::NineMonths => "9months",
            DurationTier::TwelveMonths => "12months",
        }
    }

    /// Parse from the wire name
    pub fn from_str(s: &str) -> Option<Self> {
        DurationTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for DurationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of the custom-plan-subscribe event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPlanSubscription {
    /// Selected feature names, in selection order
    pub features: Vec<String>,

    pub seats: SeatCount,

    pub duration: DurationTier,

    /// Entered usage / limit amounts by feature name
    pub usage_amounts: BTreeMap<String, Decimal>,
}
