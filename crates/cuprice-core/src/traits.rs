//! Common traits for data loading and host callbacks
//!
//! Defines the two seams of the widget: where project data comes from and
//! how selection events reach the host application.

use crate::error::AppError;
use crate::models::{CustomPlanSubscription, Plan, Project};
use async_trait::async_trait;
use std::sync::Arc;

/// Identifies which shared project to load and from where
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShareRequest {
    /// Opaque share identifier
    pub share_id: String,

    /// Base URL override; `None` uses the source's configured origin
    pub api_url: Option<String>,
}

impl ShareRequest {
    pub fn new(share_id: impl Into<String>) -> Self {
        Self {
            share_id: share_id.into(),
            api_url: None,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }
}

/// Read-only source of shared projects
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Fetch the project for a share identifier
    ///
    /// Any failure (network, non-success status, undecodable body) is an
    /// error; callers do not retry.
    async fn fetch_project(&self, request: &ShareRequest) -> Result<Project, AppError>;
}

#[async_trait]
impl<T: ProjectSource + ?Sized> ProjectSource for Arc<T> {
    async fn fetch_project(&self, request: &ShareRequest) -> Result<Project, AppError> {
        (**self).fetch_project(request).await
    }
}

/// Callback hooks fired towards the host application
///
/// All methods default to no-ops so hosts only implement what they need.
pub trait PricingHooks: Send + Sync {
    /// A predefined plan was picked
    fn on_plan_select(&self, _plan: &Plan) {}

    /// The custom plan builder was opened
    fn on_custom_plan_open(&self) {}

    /// A custom plan was confirmed
    fn on_custom_plan_subscribe(&self, _subscription: &CustomPlanSubscription) {}
}

/// Hooks that ignore every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl PricingHooks for NoopHooks {}

impl<T: PricingHooks + ?Sized> PricingHooks for Arc<T> {
    fn on_plan_select(&self, plan: &Plan) {
        (**self).on_plan_select(plan);
    }

    fn on_custom_plan_open(&self) {
        (**self).on_custom_plan_open();
    }

    fn on_custom_plan_subscribe(&self, subscription: &CustomPlanSubscription) {
        (**self).on_custom_plan_subscribe(subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_request_builder() {
        let request = ShareRequest::new("abc123").with_api_url("https://pricing.example.com");
        assert_eq!(request.share_id, "abc123");
        assert_eq!(request.api_url.as_deref(), Some("https://pricing.example.com"));
        assert_eq!(ShareRequest::new("x").api_url, None);
    }

    #[test]
    fn test_noop_hooks_accept_events() {
        let hooks: Arc<dyn PricingHooks> = Arc::new(NoopHooks);
        hooks.on_custom_plan_open();
        hooks.on_plan_select(&Plan::default());
    }
}
