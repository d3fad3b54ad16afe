//! Job feed handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use jobfeed_models::{
    AggregationRequest, JobPosting, PageRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};

use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// Types
// ============================================================================

/// Query parameters for the job feed endpoint.
#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    /// Number of postings to return. Values above the upstream page cap
    /// switch the request into aggregation mode.
    #[serde(default)]
    pub limit: Option<u32>,

    /// Zero-based offset into the upstream feed.
    #[serde(default)]
    pub offset: Option<u32>,

    /// Keep only postings advertised on this job site.
    #[serde(rename = "jobSite", default)]
    pub job_site: Option<String>,

    /// Fetch every posting up to the configured cap when truthy.
    #[serde(default)]
    pub all: Option<String>,
}

/// Job feed response.
#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub data: Vec<JobPosting>,
    pub total: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/jobs
///
/// Serve a page of job postings from the Workday feed.
///
/// Query parameters:
/// - `limit`: page size (default 50). Values above the upstream cap of 100
///   are served by aggregating multiple upstream pages.
/// - `offset`: upstream cursor offset (default 0)
/// - `jobSite`: keep only postings for this job site; empty means no filter
/// - `all`: `true` or `1` fetches everything up to `JOBS_FETCH_ALL_CAP`
///
/// Returns:
/// - 200: `{ "data": [...], "total": N }`
/// - 500: `{ "error": ..., "details": ... }` on any upstream failure
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> ApiResult<Json<JobsResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let job_site = query.job_site.filter(|s| !s.is_empty());
    let fetch_all = query.all.as_deref().map(is_truthy).unwrap_or(false);

    info!(
        limit = limit,
        offset = offset,
        job_site = ?job_site,
        fetch_all = fetch_all,
        "Job feed request"
    );

    let page = if fetch_all || limit > MAX_PAGE_LIMIT {
        let max_jobs = if fetch_all {
            state.config.fetch_all_cap
        } else {
            limit.min(state.config.fetch_all_cap)
        };

        let request = AggregationRequest {
            max_jobs,
            page_size: MAX_PAGE_LIMIT,
            initial_offset: offset,
            job_site_id: job_site,
        };
        state.workday.aggregate(&request).await?
    } else {
        let request = PageRequest {
            limit,
            offset,
            job_site_id: job_site,
        };
        state.workday.fetch_page(&request).await?
    };

    Ok(Json(JobsResponse {
        data: page.items,
        total: page.total,
    }))
}

/// Values accepted as "yes" for the `all` flag.
fn is_truthy(value: &str) -> bool {
    matches!(value, "true" | "1")
}
