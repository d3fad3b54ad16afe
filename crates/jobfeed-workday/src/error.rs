//! Workday client error types.

use thiserror::Error;

/// Result type for Workday operations.
pub type WorkdayResult<T> = Result<T, WorkdayError>;

/// Errors that can occur while talking to the Workday REST API.
///
/// None of these are retried internally. `Upstream*` variants carry the
/// upstream status and raw body so operators can diagnose tenant issues
/// from the error alone.
#[derive(Debug, Error)]
pub enum WorkdayError {
    /// Required configuration is missing; no network call was attempted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The token exchange returned a non-success status.
    #[error("Token exchange failed with status {status}: {body}")]
    UpstreamAuth { status: u16, body: String },

    /// The token exchange succeeded but the body had no usable access token.
    #[error("Token response missing access_token: {body}")]
    MalformedAuthResponse { body: String },

    /// The job postings endpoint returned a non-success status.
    #[error("Job postings request failed with status {status}: {body}")]
    UpstreamRequest { status: u16, body: String },

    /// The job postings body was not valid JSON.
    #[error("Invalid JSON in job postings response: {body}")]
    MalformedResponseBody { body: String },

    /// Transport-level failure (connect, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl WorkdayError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Upstream HTTP status associated with the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            WorkdayError::UpstreamAuth { status, .. }
            | WorkdayError::UpstreamRequest { status, .. } => Some(*status),
            _ => None,
        }
    }
}
