//! Pricing handlers
//!
//! Every request loads the shared project fresh through the configured
//! [`ProjectSource`] and prices it for the caller. Nothing is cached between
//! requests.

use crate::dto::{
    ApiResponse, PlanSelectionResponse, PricingPageQuery, PricingPageResponse, QuoteRequest,
    QuoteResponse, SourceParams, SubscriptionResponse,
};
use actix_web::{web, HttpResponse};
use cuprice_core::config::normalize_base_url;
use cuprice_core::traits::{PricingHooks, ProjectSource, ShareRequest};
use cuprice_core::AppError;
use cuprice_services::catalog::{duration_options, feature_catalogue, plan_cards, seat_options};
use cuprice_services::{AnnualToggle, CustomPlanBuilder, PageHeader, PlanCard, PricingWidget};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

type Widget = PricingWidget<Arc<dyn ProjectSource>, Arc<dyn PricingHooks>>;

/// Shared state of the pricing handlers
///
/// Callers may only redirect the project fetch to base URLs on the
/// allowlist; with an empty allowlist every `api_url` override is refused.
#[derive(Clone)]
pub struct PricingState {
    source: Arc<dyn ProjectSource>,
    hooks: Arc<dyn PricingHooks>,
    allowed_api_urls: Vec<String>,
}

impl PricingState {
    /// Create state from a project source and the hooks to notify
    pub fn new(source: Arc<dyn ProjectSource>, hooks: Arc<dyn PricingHooks>) -> Self {
        Self {
            source,
            hooks,
            allowed_api_urls: Vec::new(),
        }
    }

    /// Accept these base URLs as `api_url` overrides
    pub fn with_allowed_api_urls<I, T>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.allowed_api_urls = urls
            .into_iter()
            .map(|url| normalize_base_url(url.as_ref()))
            .filter(|url| !url.is_empty())
            .collect();
        self
    }

    fn check_api_url(&self, api_url: &str) -> Result<(), AppError> {
        if self.allowed_api_urls.contains(&normalize_base_url(api_url)) {
            Ok(())
        } else {
            warn!(api_url, "Rejected api_url override outside the allowlist");
            Err(AppError::Validation(format!(
                "api_url {} is not an allowed origin",
                api_url
            )))
        }
    }

    /// Load a widget for one request; fails with 404 when the project
    /// could not be shown
    async fn load(&self, share_id: &str, api_url: Option<String>) -> Result<Widget, AppError> {
        let mut request = ShareRequest::new(share_id);
        if let Some(api_url) = api_url {
            self.check_api_url(&api_url)?;
            request = request.with_api_url(api_url);
        }

        let widget = PricingWidget::new(self.source.clone(), self.hooks.clone());

        widget.load(request).await;

        if widget.state().is_ready() {
            Ok(widget)
        } else {
            Err(AppError::ProjectNotFound(share_id.to_string()))
        }
    }
}

fn validation_error(e: validator::ValidationErrors) -> AppError {
    warn!("Validation failed: {}", e);
    AppError::Validation(e.to_string())
}

/// Get the rendered pricing page
///
/// GET /api/v1/pricing/{share_id}
#[instrument(skip(state, query))]
pub async fn get_pricing_page(
    state: web::Data<PricingState>,
    path: web::Path<String>,
    query: web::Query<PricingPageQuery>,
) -> Result<HttpResponse, AppError> {
    let share_id = path.into_inner();
    let query = query.into_inner();
    query.validate().map_err(validation_error)?;

    let widget = state.load(&share_id, query.api_url).await?;
    let project = widget.project().ok_or(AppError::NotLoaded)?;
    let is_annual = widget.set_annual(query.annual);
    let theme = widget.theme();

    debug!(project_id = project.id, is_annual, "Rendering pricing page");

    let response = PricingPageResponse {
        project_id: project.id,
        currency: project.currency.clone(),
        currency_symbol: project.currency_symbol(),
        header: PageHeader::build(&project, &theme),
        annual_toggle: AnnualToggle::build(&project, is_annual),
        plans: plan_cards(&project, is_annual),
        features: feature_catalogue(&project, query.category),
        duration_options: duration_options(&project),
        seat_options: seat_options(),
        css_variables: theme
            .css_variables()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        root_style: theme.root_style(),
        theme,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Price a custom plan without confirming it
///
/// POST /api/v1/pricing/{share_id}/quote
#[instrument(skip(state, query, req))]
pub async fn quote_custom_plan(
    state: web::Data<PricingState>,
    path: web::Path<String>,
    query: web::Query<SourceParams>,
    req: web::Json<QuoteRequest>,
) -> Result<HttpResponse, AppError> {
    let share_id = path.into_inner();
    let query = query.into_inner();
    query.validate().map_err(validation_error)?;
    req.validate().map_err(validation_error)?;

    let widget = state.load(&share_id, query.api_url).await?;
    let project = widget.project().ok_or(AppError::NotLoaded)?;

    let mut builder = CustomPlanBuilder::new(project);
    req.apply(&mut builder)?;

    let response = QuoteResponse::try_from(&builder)?;
    debug!(
        features = response.quote.feature_count,
        total = %response.quote.total,
        "Custom plan quoted"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Confirm a custom plan and notify the host
///
/// POST /api/v1/pricing/{share_id}/subscribe
#[instrument(skip(state, query, req))]
pub async fn subscribe_custom_plan(
    state: web::Data<PricingState>,
    path: web::Path<String>,
    query: web::Query<SourceParams>,
    req: web::Json<QuoteRequest>,
) -> Result<HttpResponse, AppError> {
    let share_id = path.into_inner();
    let query = query.into_inner();
    query.validate().map_err(validation_error)?;
    req.validate().map_err(validation_error)?;

    let widget = state.load(&share_id, query.api_url).await?;
    widget.open_custom_plan()?;
    widget.with_custom_plan(|builder| req.apply(builder))??;
    let quote = widget.with_custom_plan(|builder| QuoteResponse::try_from(&*builder))??;

    let subscription = widget
        .subscribe_custom_plan()?
        .ok_or(AppError::NothingToSubscribe)?;

    info!(
        share_id = %share_id,
        features = subscription.features.len(),
        total = %quote.quote.total,
        "Custom plan subscribed"
    );

    let response = SubscriptionResponse { subscription, quote };
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(response, "Custom plan subscribed")))
}

/// Pick a predefined plan and notify the host
///
/// POST /api/v1/pricing/{share_id}/plans/{plan_id}/select
#[instrument(skip(state, query))]
pub async fn select_plan(
    state: web::Data<PricingState>,
    path: web::Path<(String, i64)>,
    query: web::Query<PricingPageQuery>,
) -> Result<HttpResponse, AppError> {
    let (share_id, plan_id) = path.into_inner();
    let query = query.into_inner();
    query.validate().map_err(validation_error)?;

    let widget = state.load(&share_id, query.api_url).await?;
    let is_annual = widget.set_annual(query.annual);
    let plan = widget.select_plan(plan_id)?;
    let project = widget.project().ok_or(AppError::NotLoaded)?;

    info!(share_id = %share_id, plan_id, "Plan selected");

    let response = PlanSelectionResponse {
        plan: PlanCard::build(&plan, &project, is_annual),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Configure pricing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pricing")
            .route("/{share_id}", web::get().to(get_pricing_page))
            .route("/{share_id}/quote", web::post().to(quote_custom_plan))
            .route("/{share_id}/subscribe", web::post().to(subscribe_custom_plan))
            .route(
                "/{share_id}/plans/{plan_id}/select",
                web::post().to(select_plan),
            ),
    );
}
