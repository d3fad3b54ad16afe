//! Opaque job posting records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single job posting as returned by the upstream recruiting API.
///
/// Postings are forwarded to callers unmodified. The proxy itself only
/// ever inspects the nested `jobSite.id`, used for site filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPosting(pub Value);

impl JobPosting {
    /// Identifier of the job site this posting is advertised on, if any.
    pub fn job_site_id(&self) -> Option<&str> {
        self.0.get("jobSite")?.get("id")?.as_str()
    }

    /// Whether this posting is advertised on the given job site.
    pub fn matches_site(&self, site_id: &str) -> bool {
        self.job_site_id() == Some(site_id)
    }

    /// Borrow the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for JobPosting {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
