//! Domain models for Cuprice
//!
//! This module contains the shared-project payload (project, features,
//! plans, theme) and the typed selection values of the custom plan builder.

pub mod feature;
pub mod lenient;
pub mod plan;
pub mod project;
pub mod selection;
pub mod theme;

pub use feature::{CountableData, Feature, FeatureCategory, FeatureKind};
pub use plan::{Plan, PlanFeature};
pub use project::Project;
pub use selection::{CustomPlanSubscription, DurationTier, SeatCount, SEAT_OPTIONS};
pub use theme::{LegacyTheme, ThemeSettings};
