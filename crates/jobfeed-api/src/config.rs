//! API configuration.

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Upper bound on postings returned by a fetch-everything request
    pub fetch_all_cap: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            fetch_all_cap: 1000,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            fetch_all_cap: std::env::var("JOBS_FETCH_ALL_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000)
                .max(1),
        }
    }
}
