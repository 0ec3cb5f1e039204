//! Host hook implementations

use cuprice_core::models::{CustomPlanSubscription, Plan};
use cuprice_core::traits::PricingHooks;
use tracing::info;

/// Hooks that record every event as a structured log line
///
/// Used by the HTTP server, where the host application consumes events from
/// the log stream rather than from in-process callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

impl PricingHooks for TracingHooks {
    fn on_plan_select(&self, plan: &Plan) {
        info!(
            plan_id = plan.id,
            plan_name = %plan.name,
            is_free = plan.is_free,
            "Plan selected"
        );
    }

    fn on_custom_plan_open(&self) {
        info!("Custom plan builder opened");
    }

    fn on_custom_plan_subscribe(&self, subscription: &CustomPlanSubscription) {
        info!(
            features = ?subscription.features,
            seats = subscription.seats.get(),
            duration = %subscription.duration,
            usage_amounts = ?subscription.usage_amounts,
            "Custom plan subscribed"
        );
    }
}
