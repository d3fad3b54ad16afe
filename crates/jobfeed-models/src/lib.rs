//! Shared data models for the jobfeed backend.
//!
//! This crate provides the value types passed between the Workday client
//! and the HTTP API:
//! - Opaque job postings
//! - Single-page and multi-page (aggregation) requests
//! - Normalized page results and page-limit constants

pub mod page;
pub mod posting;

// Re-export common types
pub use page::{AggregationRequest, Page, PageRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use posting::JobPosting;
