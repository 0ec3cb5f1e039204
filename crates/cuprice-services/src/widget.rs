//! Pricing widget controller
//!
//! Owns the one asynchronous operation of the widget, the project fetch, and
//! everything that reacts to it: theme resolution, the annual toggle, the
//! custom plan session and the host callbacks.
//!
//! Loads are numbered. A response is applied only if no newer load started
//! while it was in flight, so a slow response for an old share identifier
//! can never overwrite a newer project.

use cuprice_core::models::{CustomPlanSubscription, Plan, Project};
use cuprice_core::traits::{PricingHooks, ProjectSource, ShareRequest};
use cuprice_core::{AppError, AppResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{plan_cards, PlanCard};
use crate::constants::NOT_FOUND_TITLE;
use crate::pricing::CustomPlanQuote;
use crate::selection::CustomPlanBuilder;
use crate::theme::{resolve_project_theme, ResolvedTheme};

/// Display state of the widget
#[derive(Debug, Clone)]
pub enum WidgetState {
    /// Nothing requested yet
    Idle,
    Loading,
    Ready(Arc<Project>),
    /// Fetch failed; carries the fixed user-facing message
    Error(String),
}

impl WidgetState {
    pub fn is_ready(&self) -> bool {
        matches!(self, WidgetState::Ready(_))
    }

    pub fn project(&self) -> Option<&Arc<Project>> {
        match self {
            WidgetState::Ready(project) => Some(project),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: WidgetState,
    request: Option<ShareRequest>,
    theme: ResolvedTheme,
    is_annual: bool,
    custom_plan: Option<CustomPlanBuilder>,
}

impl Inner {
    fn apply_project(&mut self, project: Project) {
        let project = Arc::new(project);

        self.theme = resolve_project_theme(&project);
        if !project.annual_discount_enabled {
            self.is_annual = false;
        }
        if let Some(builder) = self.custom_plan.as_mut() {
            builder.replace_project(project.clone());
        }
        self.state = WidgetState::Ready(project);
    }

    fn ready_project(&self) -> AppResult<Arc<Project>> {
        self.state.project().cloned().ok_or(AppError::NotLoaded)
    }
}

/// Fetch-and-render controller for one embedded pricing page
pub struct PricingWidget<S: ProjectSource, H: PricingHooks> {
    source: S,
    hooks: H,
    generation: AtomicU64,
    inner: RwLock<Inner>,
}

impl<S: ProjectSource, H: PricingHooks> PricingWidget<S, H> {
    pub fn new(source: S, hooks: H) -> Self {
        Self {
            source,
            hooks,
            generation: AtomicU64::new(0),
            inner: RwLock::new(Inner {
                state: WidgetState::Idle,
                request: None,
                theme: ResolvedTheme::default(),
                is_annual: false,
                custom_plan: None,
            }),
        }
    }

    /// Fetch the project for `request` and apply it
    ///
    /// Returns false when the response was discarded because a newer load
    /// started in the meantime. Failures are not retried.
    #[instrument(skip(self), fields(share_id = %request.share_id))]
    pub async fn load(&self, request: ShareRequest) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut inner = self.inner.write();
            inner.state = WidgetState::Loading;
            inner.request = Some(request.clone());
        }

        let result = self.source.fetch_project(&request).await;

        let mut inner = self.inner.write();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding stale project response");
            return false;
        }

        match result {
            Ok(project) => {
                info!(
                    project_id = project.id,
                    plans = project.pricing_plans.len(),
                    features = project.features.len(),
                    "Project loaded"
                );
                inner.apply_project(project);
            }
            Err(e) => {
                warn!("Failed to load project: {}", e);
                inner.state = WidgetState::Error(NOT_FOUND_TITLE.to_string());
                inner.custom_plan = None;
            }
        }
        true
    }

    /// Load only if the share identifier or base URL changed
    ///
    /// Returns true if a load was performed and applied.
    pub async fn mount(&self, request: ShareRequest) -> bool {
        let unchanged = {
            let inner = self.inner.read();
            inner.request.as_ref() == Some(&request)
                && matches!(inner.state, WidgetState::Ready(_) | WidgetState::Loading)
        };

        if unchanged {
            return false;
        }
        self.load(request).await
    }

    pub fn state(&self) -> WidgetState {
        self.inner.read().state.clone()
    }

    pub fn project(&self) -> Option<Arc<Project>> {
        self.inner.read().state.project().cloned()
    }

    pub fn theme(&self) -> ResolvedTheme {
        self.inner.read().theme.clone()
    }

    pub fn is_annual(&self) -> bool {
        self.inner.read().is_annual
    }

    /// Switch between monthly and annual pricing
    ///
    /// Annual is only honoured when the loaded project enables it. Returns
    /// the resulting toggle state.
    pub fn set_annual(&self, annual: bool) -> bool {
        let mut inner = self.inner.write();
        let allowed = inner
            .state
            .project()
            .is_some_and(|p| p.annual_discount_enabled);

        inner.is_annual = annual && allowed;
        inner.is_annual
    }

    /// Visible plans in display order
    pub fn visible_plans(&self) -> Vec<Plan> {
        self.project()
            .map(|p| p.visible_plans().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Cards for the current toggle state; empty until a project is ready
    pub fn plan_cards(&self) -> Vec<PlanCard> {
        let inner = self.inner.read();
        match inner.state.project() {
            Some(project) => plan_cards(project, inner.is_annual),
            None => Vec::new(),
        }
    }

    /// Pick a predefined plan and notify the host
    #[instrument(skip(self))]
    pub fn select_plan(&self, plan_id: i64) -> AppResult<Plan> {
        let plan = {
            let inner = self.inner.read();
            let project = inner.ready_project()?;
            project
                .find_plan(plan_id)
                .filter(|p| p.is_visible)
                .cloned()
                .ok_or(AppError::PlanNotFound(plan_id))?
        };

        self.hooks.on_plan_select(&plan);
        Ok(plan)
    }

    /// Open a fresh custom plan session and notify the host
    pub fn open_custom_plan(&self) -> AppResult<()> {
        {
            let mut inner = self.inner.write();
            let project = inner.ready_project()?;
            inner.custom_plan = Some(CustomPlanBuilder::new(project));
        }

        self.hooks.on_custom_plan_open();
        Ok(())
    }

    /// Discard the custom plan session
    pub fn close_custom_plan(&self) {
        self.inner.write().custom_plan = None;
    }

    pub fn is_custom_plan_open(&self) -> bool {
        self.inner.read().custom_plan.is_some()
    }

    /// Edit the open custom plan session
    pub fn with_custom_plan<R>(&self, f: impl FnOnce(&mut CustomPlanBuilder) -> R) -> AppResult<R> {
        let mut inner = self.inner.write();
        let builder = inner.custom_plan.as_mut().ok_or(AppError::CustomPlanClosed)?;
        Ok(f(builder))
    }

    pub fn custom_plan_quote(&self) -> AppResult<CustomPlanQuote> {
        let inner = self.inner.read();
        inner
            .custom_plan
            .as_ref()
            .ok_or(AppError::CustomPlanClosed)?
            .quote()
    }

    /// Confirm the custom plan
    ///
    /// With features selected, closes the session, notifies the host and
    /// returns the payload. An empty selection has nothing to subscribe: the
    /// session stays open and `None` is returned.
    #[instrument(skip(self))]
    pub fn subscribe_custom_plan(&self) -> AppResult<Option<CustomPlanSubscription>> {
        let subscription = {
            let mut inner = self.inner.write();
            let builder = inner.custom_plan.as_ref().ok_or(AppError::CustomPlanClosed)?;

            match builder.subscription() {
                Some(subscription) => {
                    inner.custom_plan = None;
                    subscription
                }
                None => {
                    debug!("Custom plan has no features, nothing to subscribe");
                    return Ok(None);
                }
            }
        };

        self.hooks.on_custom_plan_subscribe(&subscription);
        Ok(Some(subscription))
    }
}
