//! Core trait and contract types for WebHub.
//!
//! `CredentialStore` is the one injectable seam: the store exclusively
//! owns credential lifetime, adapters borrow a credential per call and
//! never persist it. The request/response contract types shared by every
//! platform adapter live here too.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::{ApiFailure, HubError, HubResult};
use crate::types::{Credential, CredentialEvent, Platform};

/// Capacity of the credential change channel. Tokens change rarely;
/// a lagging subscriber only misses events it can recover by re-reading
/// the store.
pub const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Trait for credential stores.
///
/// Implementations persist one credential per platform in local key-value
/// storage and broadcast a [`CredentialEvent`] on every successful
/// mutation, with no debounce. Storage faults are reported as
/// [`HubError::Storage`], never a panic; the dashboard must keep running
/// when persistence is unavailable.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Gets the stored credential for a platform, if connected.
    async fn get(&self, platform: Platform) -> HubResult<Option<Credential>>;

    /// Stores a credential, overwriting any existing one.
    ///
    /// Records the connected timestamp and broadcasts a connected event.
    async fn set(&self, platform: Platform, token: String) -> HubResult<Credential>;

    /// Removes the credential for a platform.
    ///
    /// Returns `false` when nothing was stored. Broadcasts a disconnected
    /// event on successful removal.
    async fn delete(&self, platform: Platform) -> HubResult<bool>;

    /// Lists all stored credentials.
    async fn list(&self) -> HubResult<Vec<Credential>> {
        let mut all = Vec::new();
        for platform in Platform::ALL {
            if let Some(credential) = self.get(platform).await? {
                all.push(credential);
            }
        }
        Ok(all)
    }

    /// Subscribes to credential change events.
    fn subscribe(&self) -> broadcast::Receiver<CredentialEvent>;

    // ==================== Backend Project URL ====================
    //
    // The backend platform is self-hosted per project, so its base URL is
    // stored alongside the credentials rather than baked into an adapter.

    /// Gets the persisted backend project URL, if set.
    async fn get_project_url(&self) -> HubResult<Option<String>>;

    /// Persists the backend project URL.
    ///
    /// Implementations store the URL with any trailing slash removed
    /// (see [`normalize_project_url`]).
    async fn set_project_url(&self, url: String) -> HubResult<()>;

    /// Removes the persisted backend project URL.
    async fn delete_project_url(&self) -> HubResult<bool>;
}

/// Strips the trailing slash a pasted project URL usually carries.
pub fn normalize_project_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// The raw output of one adapter operation: the upstream payload,
/// untouched, plus the HTTP status it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// The HTTP status code (always 2xx; failures are `ApiFailure`).
    pub status: u16,
    /// The upstream JSON payload.
    pub body: Value,
}

impl ApiResponse {
    /// True for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of one adapter operation.
pub type ApiResult = Result<ApiResponse, ApiFailure>;

/// Parameters for an analytics fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsQuery {
    /// The project to fetch analytics for.
    pub project_id: String,
    /// Range start as epoch milliseconds.
    pub from_ms: i64,
    /// Range end as epoch milliseconds.
    pub to_ms: i64,
    /// Optional team scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

impl AnalyticsQuery {
    /// Creates a query for a project over an epoch-millisecond range.
    pub fn new(project_id: impl Into<String>, from_ms: i64, to_ms: i64) -> Self {
        Self {
            project_id: project_id.into(),
            from_ms,
            to_ms,
            team_id: None,
        }
    }

    /// Scopes the query to a team.
    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    /// Checks the required parameters, before any network call.
    pub fn validate(&self) -> HubResult<()> {
        if self.project_id.trim().is_empty() {
            return Err(HubError::invalid_request("project id is required"));
        }
        if self.from_ms >= self.to_ms {
            return Err(HubError::invalid_request(
                "date range start must precede its end",
            ));
        }
        Ok(())
    }
}

/// Standard pagination parameters for listing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Items per page.
    pub per_page: u32,
    /// 1-based page number.
    pub page: u32,
}

impl PageRequest {
    /// A request for the first `per_page` items.
    pub fn first(per_page: u32) -> Self {
        Self { per_page, page: 1 }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: 10,
            page: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_query_validate() {
        assert!(AnalyticsQuery::new("prj_1", 0, 1000).validate().is_ok());

        let err = AnalyticsQuery::new("", 0, 1000).validate().unwrap_err();
        assert!(matches!(err, HubError::InvalidRequest { .. }));

        let err = AnalyticsQuery::new("prj_1", 1000, 1000)
            .validate()
            .unwrap_err();
        assert!(matches!(err, HubError::InvalidRequest { .. }));
    }

    #[test]
    fn test_page_request_default() {
        let page = PageRequest::default();
        assert_eq!(page.per_page, 10);
        assert_eq!(page.page, 1);
        assert_eq!(PageRequest::first(12).per_page, 12);
    }

    #[test]
    fn test_normalize_project_url() {
        assert_eq!(
            normalize_project_url("https://db.example.co/"),
            "https://db.example.co"
        );
        assert_eq!(
            normalize_project_url("https://db.example.co"),
            "https://db.example.co"
        );
    }

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse {
            status: 201,
            body: serde_json::json!({}),
        };
        assert!(response.is_success());
    }
}
