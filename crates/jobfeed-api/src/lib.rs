//! Axum HTTP API server for the Workday job feed.
//!
//! This crate provides:
//! - `GET /api/jobs` backed by the Workday recruiting proxy
//! - Wide-open CORS with direct preflight handling
//! - Liveness probes and optional Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
