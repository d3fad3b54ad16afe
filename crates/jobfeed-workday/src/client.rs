//! Workday REST API client.
//!
//! Retry-free client for the recruiting jobPostings feed:
//! - Token caching with refresh margin
//! - HTTP client tuning (pooling, timeouts)
//! - Envelope normalization and optional site filtering
//! - Observability (tracing spans, metrics)

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};

use jobfeed_models::{AggregationRequest, JobPosting, Page, PageRequest, MAX_PAGE_LIMIT};

use crate::config::WorkdayConfig;
use crate::envelope::{declared_total, Envelope};
use crate::error::{WorkdayError, WorkdayResult};
use crate::metrics::record_request;
use crate::token_cache::TokenCache;

/// Extra pages beyond the naive `max_jobs / page_size` estimate, absorbing
/// shrinkage when site filtering drops items from fetched pages.
const PAGE_BUDGET_SLACK: u32 = 2;

// =============================================================================
// Client
// =============================================================================

/// Client for the Workday recruiting jobPostings feed.
pub struct WorkdayClient {
    http: Client,
    config: WorkdayConfig,
    base_url: String,
    token_cache: Arc<TokenCache>,
}

impl Clone for WorkdayClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            base_url: self.base_url.clone(),
            token_cache: Arc::clone(&self.token_cache),
        }
    }
}

impl WorkdayClient {
    /// Create a new Workday client.
    pub fn new(config: WorkdayConfig) -> WorkdayResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("jobfeed-workday/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(WorkdayError::Network)?;

        let base_url = config.endpoint.trim_end_matches('/').to_string();
        let token_cache = Arc::new(TokenCache::new(http.clone(), config.clone()));

        Ok(Self {
            http,
            config,
            base_url,
            token_cache,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> WorkdayResult<Self> {
        let config = WorkdayConfig::from_env()?;
        Self::new(config)
    }

    /// Build the jobPostings URL for one page.
    fn page_url(&self, limit: u32, offset: u32, job_site_id: Option<&str>) -> String {
        let mut url = format!(
            "{}/jobPostings?limit={}&offset={}",
            self.base_url, limit, offset
        );

        // Not every tenant honors the server-side filter, so it is opt-in;
        // client-side filtering applies on top either way.
        if self.config.upstream_site_filter {
            if let Some(site_id) = job_site_id {
                url.push_str("&jobSite=");
                url.push_str(&urlencoding::encode(site_id));
            }
        }

        url
    }

    // =========================================================================
    // Page Fetching
    // =========================================================================

    /// Fetch one page of postings and normalize its shape.
    ///
    /// The body is read as text first so a non-JSON response can be carried
    /// in the error; a parse failure is a `MalformedResponseBody`, never an
    /// empty page. When `job_site_id` is set, items are filtered to that
    /// site and `total` is the post-filter count; otherwise `total` prefers
    /// the upstream-declared value.
    pub async fn fetch_page(&self, request: &PageRequest) -> WorkdayResult<Page> {
        let limit = request.limit.clamp(1, MAX_PAGE_LIMIT);
        let url = self.page_url(limit, request.offset, request.job_site_id.as_deref());

        self.execute_request("fetch_page", async {
            let token = self.token_cache.get_token().await?;
            let response = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .header(header::ACCEPT, "application/json")
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;

            if !status.is_success() {
                return Err(WorkdayError::UpstreamRequest {
                    status: status.as_u16(),
                    body,
                });
            }

            let json: Value = match serde_json::from_str(&body) {
                Ok(json) => json,
                Err(_) => return Err(WorkdayError::MalformedResponseBody { body }),
            };

            let declared = declared_total(&json);
            let envelope = Envelope::from_body(json);
            let kind = envelope.kind();

            if matches!(envelope, Envelope::Unknown) {
                warn!(%url, "Unrecognized jobPostings envelope, treating as empty");
            }

            let raw_items = envelope.into_items();
            let fetched = raw_items.len();

            let items: Vec<JobPosting> = match request.job_site_id.as_deref() {
                Some(site_id) => raw_items
                    .into_iter()
                    .filter(|posting| posting.matches_site(site_id))
                    .collect(),
                None => raw_items,
            };

            let total = if request.job_site_id.is_some() {
                items.len() as u64
            } else {
                declared.unwrap_or(items.len() as u64)
            };

            debug!(
                envelope = kind,
                offset = request.offset,
                limit,
                fetched,
                returned = items.len(),
                "Fetched jobPostings page"
            );

            Ok(Page {
                items,
                total,
                declared_total: declared,
                fetched,
            })
        })
        .await
    }

    // =========================================================================
    // Aggregation
    // =========================================================================

    /// Collect up to `max_jobs` postings, paging the upstream as needed.
    ///
    /// Stops at the first of: enough postings collected, an empty page, the
    /// upstream-declared total reached, a short page, or the page budget
    /// spent. The offset always advances by the pre-filter item count, so
    /// it stays aligned with the upstream cursor even when filtering
    /// shrinks pages. A failed page fetch aborts the whole aggregation;
    /// partial results are never returned.
    pub async fn aggregate(&self, request: &AggregationRequest) -> WorkdayResult<Page> {
        let max_jobs = request.max_jobs.max(1);
        let page_size = request.page_size.clamp(1, MAX_PAGE_LIMIT);
        let max_pages = max_jobs.div_ceil(page_size) + PAGE_BUDGET_SLACK;

        let mut collected: Vec<JobPosting> = Vec::new();
        let mut offset = request.initial_offset;
        let mut known_total: Option<u64> = None;
        let mut fetched_total = 0usize;
        let mut pages_fetched = 0u32;

        while (collected.len() as u32) < max_jobs && pages_fetched < max_pages {
            let remaining = max_jobs - collected.len() as u32;
            let page_request = PageRequest {
                limit: page_size.min(remaining),
                offset,
                job_site_id: request.job_site_id.clone(),
            };

            let page = self.fetch_page(&page_request).await?;
            pages_fetched += 1;
            fetched_total += page.fetched;

            // Upstream exhausted.
            if page.fetched == 0 {
                break;
            }

            collected.extend(page.items);

            if known_total.is_none() {
                known_total = page.declared_total;
            }

            // Reached the corpus size the upstream reported. Both sides are
            // in pre-filter cursor space.
            let cursor_end = offset as u64 + page.fetched as u64;
            if known_total.is_some_and(|total| cursor_end >= total) {
                break;
            }

            // A short page means the upstream ran out of postings.
            if (page.fetched as u32) < page_request.limit {
                break;
            }

            offset = offset.saturating_add(page.fetched as u32);
        }

        collected.truncate(max_jobs as usize);

        let total = match (&request.job_site_id, known_total) {
            // Upstream totals count the unfiltered corpus; a filtered feed
            // reports what it actually holds.
            (Some(_), _) => collected.len() as u64,
            (None, Some(declared)) => declared,
            (None, None) => collected.len() as u64,
        };

        debug!(
            pages = pages_fetched,
            fetched = fetched_total,
            collected = collected.len(),
            total,
            "Aggregated jobPostings"
        );

        Ok(Page {
            items: collected,
            total,
            declared_total: known_total,
            fetched: fetched_total,
        })
    }

    // =========================================================================
    // Instrumentation
    // =========================================================================

    /// Run one upstream call inside a tracing span, recording metrics.
    async fn execute_request<T, F>(&self, operation: &str, fut: F) -> WorkdayResult<T>
    where
        F: std::future::Future<Output = WorkdayResult<T>>,
    {
        let span = info_span!("workday_request", operation = %operation);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }
}

// =============================================================================
// Tests
// =============================================================================
