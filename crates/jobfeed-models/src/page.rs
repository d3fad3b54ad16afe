//! Page and aggregation request/result types.

use crate::JobPosting;

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Hard per-page cap enforced by the upstream API.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A bounded request for a single upstream page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Page size; clamped to `MAX_PAGE_LIMIT` before the request is sent.
    pub limit: u32,

    /// Zero-based offset into the upstream corpus.
    pub offset: u32,

    /// Keep only postings advertised on this job site.
    pub job_site_id: Option<String>,
}

impl PageRequest {
    /// Unfiltered page request.
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit,
            offset,
            job_site_id: None,
        }
    }

    /// Restrict the page to a single job site.
    pub fn with_job_site(mut self, site_id: impl Into<String>) -> Self {
        self.job_site_id = Some(site_id.into());
        self
    }
}

/// One normalized page (or aggregation) of postings.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Postings, after any site filtering.
    pub items: Vec<JobPosting>,

    /// Best-known total for the request: the post-filter count when a site
    /// filter was applied, otherwise the upstream-declared total when one
    /// was reported, otherwise the item count.
    pub total: u64,

    /// Total the upstream itself declared, when it did. Always counts the
    /// unfiltered corpus.
    pub declared_total: Option<u64>,

    /// Pre-filter item count. The only number valid for advancing the
    /// upstream offset cursor.
    pub fetched: usize,
}

/// A logical request for up to `max_jobs` postings across several pages.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRequest {
    /// Upper bound on returned postings.
    pub max_jobs: u32,

    /// Upstream page size to request; clamped to `MAX_PAGE_LIMIT`.
    pub page_size: u32,

    /// Offset of the first upstream page.
    pub initial_offset: u32,

    /// Keep only postings advertised on this job site.
    pub job_site_id: Option<String>,
}

impl AggregationRequest {
    /// Aggregate up to `max_jobs` postings starting at offset 0, using the
    /// largest page size the upstream accepts.
    pub fn new(max_jobs: u32) -> Self {
        Self {
            max_jobs,
            page_size: MAX_PAGE_LIMIT,
            initial_offset: 0,
            job_site_id: None,
        }
    }

    /// Restrict the aggregation to a single job site.
    pub fn with_job_site(mut self, site_id: impl Into<String>) -> Self {
        self.job_site_id = Some(site_id.into());
        self
    }
}
