//! Pricing services for Cuprice
//!
//! This crate turns a loaded project plus the buyer's selections into priced,
//! themed output. Everything except the widget controller is synchronous and
//! side-effect free.
//!
//! # Services
//!
//! - `pricing` - Plan price resolver and custom plan quote
//! - `catalog` - Plan cards, feature listings, duration and annual menus
//! - `selection` - Custom plan builder with the duration-tier guard
//! - `theme` - Theme precedence resolution and colour normalisation
//! - `css` - Scoping of seller-supplied custom CSS
//! - `widget` - Fetch-and-render controller with host callbacks
//! - `hooks` - Host hook implementations

pub mod catalog;
pub mod css;
pub mod hooks;
pub mod pricing;
pub mod selection;
pub mod theme;
pub mod widget;

pub use catalog::{AnnualToggle, DurationOption, FeatureListing, PageHeader, PlanCard};
pub use css::scope_custom_css;
pub use hooks::TracingHooks;
pub use pricing::{quote_custom_plan, resolve_plan_price, CustomPlanQuote, PlanPrice};
pub use selection::{parse_usage_input, CustomPlanBuilder, SelectionState};
pub use theme::{resolve_project_theme, resolve_theme, ResolvedTheme};
pub use widget::{PricingWidget, WidgetState};

/// Display constants
pub mod constants {
    /// Class applied twice to the widget root to out-rank host styles
    pub const SCOPE_CLASS: &str = "cuprice-pricing-container";

    /// Error state heading
    pub const NOT_FOUND_TITLE: &str = "Project Not Found";

    /// Error state body
    pub const NOT_FOUND_MESSAGE: &str =
        "The shared project you're looking for doesn't exist or has been removed.";

    /// Page title used when the project has no name
    pub const DEFAULT_TITLE: &str = "Flexible pricing plan for your startup";

    /// Page subtitle used when the project has no description
    pub const DEFAULT_SUBTITLE: &str = "Your customers can select their relevant plan or they can build their own plan based on what they need!";

    /// Months in an annual term
    pub const MONTHS_PER_YEAR: u32 = 12;

    /// Largest accepted border radius, in pixels
    pub const MAX_BORDER_RADIUS: i64 = 50;
}
