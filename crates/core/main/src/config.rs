//! Hub configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-request timeout for upstream calls.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for the hub.
///
/// One HTTP client is built from this and shared by all three platform
/// adapters, so the timeout and user agent apply uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Per-request timeout for all upstream calls (default: 15s).
    pub timeout: Duration,
    /// User agent sent with every upstream call. The source-hosting
    /// platform rejects requests without one.
    pub user_agent: String,
    /// Override for the deployment platform base URL (tests, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vercel_base_url: Option<String>,
    /// Override for the source-hosting platform base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_base_url: Option<String>,
}

impl HubConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Points the deployment platform adapter at a custom base URL.
    pub fn with_vercel_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.vercel_base_url = Some(base_url.into());
        self
    }

    /// Points the source-hosting platform adapter at a custom base URL.
    pub fn with_github_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.github_base_url = Some(base_url.into());
        self
    }

    /// Builds the shared HTTP client carrying the timeout and user agent.
    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("webhub/{}", env!("CARGO_PKG_VERSION")),
            vercel_base_url: None,
            github_base_url: None,
        }
    }
}
