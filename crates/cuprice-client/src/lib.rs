//! Project sources for Cuprice
//!
//! Implementations of [`cuprice_core::traits::ProjectSource`]:
//!
//! - `HttpProjectSource` - fetches `GET {api_url}/api/share/{share_id}` with
//!   reqwest, honouring a per-request base URL override
//! - `InMemoryProjectSource` - serves preloaded projects, optionally after a
//!   fixed delay; used for embedding and tests

pub mod http;
pub mod memory;

pub use http::HttpProjectSource;
pub use memory::InMemoryProjectSource;
