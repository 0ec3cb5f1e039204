//! Unified error handling for Cuprice
//!
//! This module provides a single error type covering fetch failures, lookups,
//! input validation and configuration, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Fetch Errors ====================
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Failed to load shared project: {0}")]
    Fetch(String),

    // ==================== Lookup Errors ====================
    #[error("Plan not found: {0}")]
    PlanNotFound(i64),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    // ==================== Selection Errors ====================
    #[error("Invalid seat count: {0} (allowed: 1, 5, 10, 25, 50, 100)")]
    InvalidSeatCount(u32),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Nothing to subscribe: no features selected")]
    NothingToSubscribe,

    #[error("Custom plan builder is not open")]
    CustomPlanClosed,

    #[error("Project is not loaded")]
    NotLoaded,

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::InvalidInput(_)
            | AppError::InvalidSeatCount(_)
            | AppError::InvalidDuration(_)
            | AppError::UnknownFeature(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::ProjectNotFound(_) | AppError::PlanNotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::CustomPlanClosed | AppError::NotLoaded => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            AppError::NothingToSubscribe => StatusCode::UNPROCESSABLE_ENTITY,

            // 502 Bad Gateway
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ProjectNotFound(_) => "project_not_found",
            AppError::Fetch(_) => "fetch_error",
            AppError::PlanNotFound(_) => "plan_not_found",
            AppError::UnknownFeature(_) => "unknown_feature",
            AppError::InvalidSeatCount(_) => "invalid_seat_count",
            AppError::InvalidDuration(_) => "invalid_duration",
            AppError::NothingToSubscribe => "nothing_to_subscribe",
            AppError::CustomPlanClosed => "custom_plan_closed",
            AppError::NotLoaded => "not_loaded",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether this error means the shared project could not be shown.
    ///
    /// The widget makes no distinction between transient and permanent
    /// failures: both render the "not found" state.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::ProjectNotFound(_) | AppError::Fetch(_) | AppError::Serialization(_)
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
