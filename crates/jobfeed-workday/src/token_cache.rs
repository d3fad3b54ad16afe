//! Token caching for Workday authentication.
//!
//! Provides a thread-safe, async-aware token cache with:
//! - Refresh margin so a token is never presented close to expiry
//! - Single-flight pattern to prevent thundering herd on refresh
//!
//! There is no fallback to a stale token: a failed exchange propagates its
//! error and leaves the cache exactly as it was.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::WorkdayConfig;
use crate::error::{WorkdayError, WorkdayResult};
use crate::metrics::record_token_refresh;

// =============================================================================
// Constants
// =============================================================================

/// Refresh margin: refresh the token 300 seconds before expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// Token TTL assumed when the exchange response omits `expires_in`.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(3600);

// =============================================================================
// Token Cache
// =============================================================================

/// Body of a successful token exchange.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Cached token with expiration tracking.
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Check if the token is still valid with the refresh margin applied.
    fn is_valid(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Thread-safe token cache with single-flight refresh.
pub struct TokenCache {
    http: Client,
    config: WorkdayConfig,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    /// Create a new token cache sharing the given connection pool.
    pub fn new(http: Client, config: WorkdayConfig) -> Self {
        Self {
            http,
            config,
            cache: RwLock::new(None),
        }
    }

    /// Get a valid access token, refreshing if necessary.
    ///
    /// This method implements the single-flight pattern:
    /// - Fast path: return the cached token while it is still valid
    /// - Slow path: acquire the write lock and refresh (double-check first)
    pub async fn get_token(&self) -> WorkdayResult<String> {
        // Fast path: check read lock first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        // Slow path: acquire write lock and refresh
        let mut cache = self.cache.write().await;

        // Double-check: another task may have refreshed while we waited
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid() {
                return Ok(cached.access_token.clone());
            }
        }

        self.refresh_token(&mut cache).await
    }

    /// Refresh the token, updating the cache.
    ///
    /// The cache is overwritten only after a fully successful exchange.
    async fn refresh_token(&self, cache: &mut Option<CachedToken>) -> WorkdayResult<String> {
        match self.exchange_refresh_token().await {
            Ok((access_token, ttl)) => {
                *cache = Some(CachedToken {
                    access_token: access_token.clone(),
                    expires_at: Instant::now() + ttl,
                });

                record_token_refresh("ok");
                debug!(ttl_secs = ttl.as_secs(), "Refreshed Workday access token");
                Ok(access_token)
            }
            Err(e) => {
                // Previous cache entry, if any, stays as-is.
                record_token_refresh("error");
                Err(e)
            }
        }
    }

    /// POST the form-encoded refresh-token grant and parse the result.
    async fn exchange_refresh_token(&self) -> WorkdayResult<(String, Duration)> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(WorkdayError::UpstreamAuth {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = match serde_json::from_str(&body) {
            Ok(token) => token,
            Err(_) => return Err(WorkdayError::MalformedAuthResponse { body }),
        };

        if token.access_token.is_empty() {
            return Err(WorkdayError::MalformedAuthResponse { body });
        }

        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(TOKEN_DEFAULT_TTL);

        Ok((token.access_token, ttl))
    }
}

// =============================================================================
// Tests
// =============================================================================
