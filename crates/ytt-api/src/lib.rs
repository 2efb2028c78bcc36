//! Axum HTTP API server for YouTube transcripts.
//!
//! This crate provides:
//! - `POST /get_transcript` backed by [`TranscriptService`]
//! - Per-client sliding-window rate limiting
//! - Health, static page and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod service;
pub mod state;

pub use config::{ApiConfig, RateLimitConfig};
pub use error::{ApiError, ApiResult};
pub use rate_limit::{Admission, RateLimiter, SlidingWindowLimiter};
pub use routes::create_router;
pub use service::{TranscriptError, TranscriptService};
pub use state::AppState;
