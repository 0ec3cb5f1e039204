//! API layer for Cuprice
//!
//! HTTP handlers that serve a shared project's priced pricing page and
//! custom plan quotes as JSON for a host front-end.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::ApiResponse;

// Re-export handler configuration functions and shared state
pub use handlers::{configure_health, configure_pricing, PricingState};
