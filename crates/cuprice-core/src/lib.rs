//! Cuprice Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Cuprice pricing widget. It includes:
//!
//! - Domain models (Project, Feature, Plan, theme settings, selection types)
//! - The `ProjectSource` and `PricingHooks` seams used by the widget
//! - Currency symbols and price formatting
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod currency;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
