//! Application state.

use std::sync::Arc;

use jobfeed_workday::{WorkdayClient, WorkdayResult};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub workday: Arc<WorkdayClient>,
}

impl AppState {
    /// Create new application state, building the Workday client from the
    /// environment. Fails fast when credentials are missing.
    pub fn new(config: ApiConfig) -> WorkdayResult<Self> {
        let workday = WorkdayClient::from_env()?;
        Ok(Self {
            config,
            workday: Arc::new(workday),
        })
    }

    /// Create state around an already-built Workday client.
    pub fn with_client(config: ApiConfig, workday: WorkdayClient) -> Self {
        Self {
            config,
            workday: Arc::new(workday),
        }
    }
}
