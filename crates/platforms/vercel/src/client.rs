//! Deployment platform HTTP adapter.

use reqwest::Client;
use webhub_core::error::ApiFailure;
use webhub_core::traits::{AnalyticsQuery, ApiResponse, ApiResult};
use webhub_core::types::Credential;

/// Default base URL for the deployment platform API.
pub const DEFAULT_BASE_URL: &str = "https://api.vercel.com";

/// HTTP adapter for the deployment platform.
///
/// Stateless: every operation borrows the credential for that one call
/// and nothing is cached between calls, so a disconnect/reconnect can
/// never leave a stale token in play. Operations return the raw upstream
/// payload plus its status; any non-2xx answer or transport failure comes
/// back as a typed [`ApiFailure`], never a panic. No retries are
/// attempted here.
#[derive(Debug, Clone)]
pub struct VercelAdapter {
    base_url: String,
    http_client: Client,
}

impl VercelAdapter {
    /// Creates an adapter against the production API.
    ///
    /// The client should already carry the shared timeout and user agent.
    pub fn new(http_client: Client) -> Self {
        Self::with_base_url(http_client, DEFAULT_BASE_URL)
    }

    /// Creates an adapter against a custom base URL (tests, proxies).
    pub fn with_base_url(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    /// Fetches raw analytics for a project over a date range.
    pub async fn fetch_analytics(
        &self,
        credential: &Credential,
        query: &AnalyticsQuery,
    ) -> ApiResult {
        self.send(credential, &self.analytics_url(query)).await
    }

    /// Lists the projects visible to the credential.
    pub async fn list_projects(&self, credential: &Credential) -> ApiResult {
        let url = format!("{}/v9/projects", self.base_url);
        self.send(credential, &url).await
    }

    /// Lists recent deployments for a project, newest first.
    pub async fn list_deployments(
        &self,
        credential: &Credential,
        project_id: &str,
        limit: u32,
    ) -> ApiResult {
        self.send(credential, &self.deployments_url(project_id, limit))
            .await
    }

    /// Fetches only the most recent deployment for a project.
    pub async fn latest_deployment(
        &self,
        credential: &Credential,
        project_id: &str,
    ) -> ApiResult {
        self.list_deployments(credential, project_id, 1).await
    }

    fn analytics_url(&self, query: &AnalyticsQuery) -> String {
        let mut url = format!(
            "{}/v1/analytics?projectId={}&from={}&to={}",
            self.base_url, query.project_id, query.from_ms, query.to_ms
        );
        if let Some(team_id) = &query.team_id {
            url.push_str(&format!("&teamId={team_id}"));
        }
        url
    }

    fn deployments_url(&self, project_id: &str, limit: u32) -> String {
        format!(
            "{}/v6/deployments?projectId={}&limit={}",
            self.base_url, project_id, limit
        )
    }

    async fn send(&self, credential: &Credential, url: &str) -> ApiResult {
        tracing::debug!("GET {url}");
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&credential.token)
            .send()
            .await?;
        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiFailure::status(status, body));
        }

        let body = response.json().await?;
        Ok(ApiResponse { status, body })
    }
}
