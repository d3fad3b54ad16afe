//! Workday client configuration.

use std::time::Duration;

use crate::error::{WorkdayError, WorkdayResult};

/// Workday REST API configuration.
///
/// Credentials and URLs come from the environment and are validated up
/// front: a missing or empty required variable is a hard error, never a
/// silent default.
#[derive(Debug, Clone)]
pub struct WorkdayConfig {
    /// OAuth token endpoint URL
    pub token_url: String,
    /// Recruiting REST API base endpoint (tenant URL)
    pub endpoint: String,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Long-lived refresh token used for the token exchange
    pub refresh_token: String,
    /// Also pass the jobSite filter upstream, for tenants that honor it
    pub upstream_site_filter: bool,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl WorkdayConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkdayResult<Self> {
        let timeout_secs: u64 = std::env::var("WORKDAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("WORKDAY_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            token_url: require_env("WORKDAY_TOKEN_URL")?,
            endpoint: require_env("WORKDAY_REST_API_ENDPOINT")?,
            client_id: require_env("WORKDAY_CLIENT_ID")?,
            client_secret: require_env("WORKDAY_CLIENT_SECRET")?,
            refresh_token: require_env("WORKDAY_REFRESH_TOKEN")?,
            upstream_site_filter: std::env::var("WORKDAY_UPSTREAM_JOBSITE_FILTER")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }
}

/// Read a required variable, rejecting empty values.
fn require_env(name: &str) -> WorkdayResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(WorkdayError::configuration(format!("{} must be set", name))),
    }
}
