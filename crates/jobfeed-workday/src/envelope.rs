//! Response envelope normalization.
//!
//! The jobPostings endpoint returns one of three shapes depending on tenant
//! and API version: a bare array, `{"data": [...]}`, or
//! `{"jobPostings": [...]}`. Shapes are checked in that priority order, and
//! anything unrecognized normalizes to an empty page rather than an error.

use jobfeed_models::JobPosting;
use serde_json::Value;

/// A classified response envelope, with its postings extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Bare JSON array of postings.
    Array(Vec<JobPosting>),
    /// `{"data": [...]}` wrapper.
    Data(Vec<JobPosting>),
    /// `{"jobPostings": [...]}` wrapper.
    JobPostings(Vec<JobPosting>),
    /// Unrecognized shape; carries no postings.
    Unknown,
}

impl Envelope {
    /// Classify a parsed response body.
    ///
    /// A wrapper key only counts when its value is an array, so a body like
    /// `{"data": "oops", "jobPostings": [...]}` still finds its postings.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Array(items) => Envelope::Array(into_postings(items)),
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = map.remove("data") {
                    Envelope::Data(into_postings(items))
                } else if let Some(Value::Array(items)) = map.remove("jobPostings") {
                    Envelope::JobPostings(into_postings(items))
                } else {
                    Envelope::Unknown
                }
            }
            _ => Envelope::Unknown,
        }
    }

    /// Postings carried by the envelope.
    pub fn into_items(self) -> Vec<JobPosting> {
        match self {
            Envelope::Array(items) | Envelope::Data(items) | Envelope::JobPostings(items) => items,
            Envelope::Unknown => Vec::new(),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Array(_) => "array",
            Envelope::Data(_) => "data",
            Envelope::JobPostings(_) => "jobPostings",
            Envelope::Unknown => "unknown",
        }
    }
}

/// Total the upstream declared for the whole corpus, when present and
/// numeric. `total` wins over `count`.
pub fn declared_total(body: &Value) -> Option<u64> {
    let map = body.as_object()?;
    map.get("total")
        .and_then(Value::as_u64)
        .or_else(|| map.get("count").and_then(Value::as_u64))
}

fn into_postings(items: Vec<Value>) -> Vec<JobPosting> {
    items.into_iter().map(JobPosting::from).collect()
}
