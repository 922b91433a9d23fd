//! Resilient dual-endpoint HTTP client.
//!
//! Every upstream call in the crate goes through this client. A request
//! is attempted against the primary base URL; on a network error, a
//! timeout, or a non-success status, the identical path is retried once
//! against the fallback base. The fallback's outcome is returned verbatim
//! — there is no third attempt. Timeouts are enforced per attempt.

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::types::SurgeError;

/// HTTP GET client with primary → fallback failover.
pub struct FallbackClient {
    http: Client,
    primary_base: String,
    fallback_base: String,
    default_timeout: Duration,
}

impl FallbackClient {
    pub fn new(cfg: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent("SURGE/0.1.0 (momentum-scanner)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            primary_base: cfg.primary_base.trim_end_matches('/').to_string(),
            fallback_base: cfg.fallback_base.trim_end_matches('/').to_string(),
            default_timeout: Duration::from_millis(cfg.timeout_ms),
        })
    }

    /// Compose `base` and `path`. Absolute URLs are used verbatim.
    fn build_url(base: &str, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// GET `path` with the configured default timeout.
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.get_with_timeout(path, self.default_timeout).await
    }

    /// GET `path`, trying the primary base first and the fallback second.
    ///
    /// Returns whatever the fallback attempt yields (success or error
    /// status) when the primary attempt fails or responds non-success.
    /// If the fallback attempt itself errors, the call fails with
    /// [`SurgeError::BothEndpointsFailed`] wrapping the final reason.
    pub async fn get_with_timeout(&self, path: &str, timeout: Duration) -> Result<Response> {
        let primary_url = Self::build_url(&self.primary_base, path);

        match self.attempt(&primary_url, timeout).await {
            Ok(resp) if resp.status().is_success() => {
                debug!(url = %primary_url, status = %resp.status(), "Primary fetch ok");
                return Ok(resp);
            }
            Ok(resp) => {
                warn!(
                    url = %primary_url,
                    status = %resp.status(),
                    "Primary returned non-success, trying fallback"
                );
            }
            Err(e) => {
                warn!(url = %primary_url, error = %e, "Primary fetch failed, trying fallback");
            }
        }

        let fallback_url = Self::build_url(&self.fallback_base, path);

        match self.attempt(&fallback_url, timeout).await {
            Ok(resp) => {
                debug!(url = %fallback_url, status = %resp.status(), "Fallback fetch complete");
                Ok(resp)
            }
            Err(e) => Err(SurgeError::BothEndpointsFailed(e.to_string()).into()),
        }
    }

    async fn attempt(&self, url: &str, timeout: Duration) -> Result<Response, reqwest::Error> {
        self.http.get(url).timeout(timeout).send().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
