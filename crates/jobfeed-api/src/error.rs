//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use jobfeed_workday::WorkdayError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Workday error: {0}")]
    Workday(#[from] WorkdayError),
}

impl ApiError {
    /// Stable client-facing summary for each failure category. The raw
    /// upstream detail goes in the `details` field, never here.
    fn summary(&self) -> &'static str {
        match self {
            ApiError::Workday(e) => match e {
                WorkdayError::Configuration(_) => "Missing Workday configuration",
                WorkdayError::UpstreamAuth { .. } => "Failed to get Workday access token",
                WorkdayError::MalformedAuthResponse { .. } => {
                    "No access_token in Workday token response"
                }
                WorkdayError::UpstreamRequest { .. } => "Failed to fetch Workday jobs",
                WorkdayError::MalformedResponseBody { .. } => {
                    "Invalid JSON from Workday jobs endpoint"
                }
                WorkdayError::Network(_) => "Failed to reach Workday",
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = match &self {
            ApiError::Workday(e) => e.to_string(),
        };

        let body = ErrorResponse {
            error: self.summary().to_string(),
            details,
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
