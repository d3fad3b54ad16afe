//! Workday recruiting REST API client.
//!
//! This crate provides:
//! - OAuth refresh-token exchange with a cached, single-flight bearer token
//! - Bounded single-page fetches with response envelope normalization
//! - Multi-page aggregation with explicit stopping conditions
//! - Observability (tracing spans, metrics)
//!
//! Failures are never retried here: every error propagates to the caller
//! unchanged, and a retry layer, if one is ever wanted, belongs above this
//! crate.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod token_cache;

pub use client::WorkdayClient;
pub use config::WorkdayConfig;
pub use envelope::Envelope;
pub use error::{WorkdayError, WorkdayResult};
pub use token_cache::TokenCache;
