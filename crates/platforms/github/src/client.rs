//! Source-hosting platform HTTP adapter.

use reqwest::Client;
use webhub_core::error::ApiFailure;
use webhub_core::traits::{ApiResponse, ApiResult, PageRequest};
use webhub_core::types::Credential;

/// Default base URL for the source-hosting platform API.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Media type pinning the upstream API version.
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// HTTP adapter for the source-hosting platform.
///
/// Stateless like the other adapters: the credential is borrowed per
/// call, responses come back raw, and failures are typed values. The
/// upstream rejects requests without a `User-Agent`, so the shared
/// client must carry one.
#[derive(Debug, Clone)]
pub struct GitHubAdapter {
    base_url: String,
    http_client: Client,
}

impl GitHubAdapter {
    /// Creates an adapter against the production API.
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

    /// Fetches the authenticated user's profile.
    pub async fn fetch_profile(&self, credential: &Credential) -> ApiResult {
        let url = format!("{}/user", self.base_url);
        self.send(credential, &url).await
    }

    /// Lists issues involving the authenticated user, in any state.
    ///
    /// The listing mixes in pull requests; the normalizer filters them
    /// out.
    pub async fn list_issues(&self, credential: &Credential, page: &PageRequest) -> ApiResult {
        self.send(credential, &self.issues_url(page)).await
    }

    /// Searches pull requests authored by the authenticated user, newest
    /// first.
    pub async fn search_pull_requests(
        &self,
        credential: &Credential,
        page: &PageRequest,
    ) -> ApiResult {
        self.send(credential, &self.pull_requests_url(page)).await
    }

    /// Lists repositories owned by the authenticated user, most recently
    /// updated first.
    pub async fn list_repositories(
        &self,
        credential: &Credential,
        page: &PageRequest,
    ) -> ApiResult {
        self.send(credential, &self.repositories_url(page)).await
    }

    /// Lists deployments recorded against one repository.
    pub async fn list_repo_deployments(
        &self,
        credential: &Credential,
        full_name: &str,
        per_page: u32,
    ) -> ApiResult {
        let url = format!(
            "{}/repos/{}/deployments?per_page={}",
            self.base_url, full_name, per_page
        );
        self.send(credential, &url).await
    }

    fn issues_url(&self, page: &PageRequest) -> String {
        format!(
            "{}/issues?filter=all&state=all&per_page={}&page={}",
            self.base_url, page.per_page, page.page
        )
    }

    fn pull_requests_url(&self, page: &PageRequest) -> String {
        format!(
            "{}/search/issues?q=is:pr+author:@me&sort=created&order=desc&per_page={}&page={}",
            self.base_url, page.per_page, page.page
        )
    }

    fn repositories_url(&self, page: &PageRequest) -> String {
        format!(
            "{}/user/repos?type=owner&sort=updated&per_page={}&page={}",
            self.base_url, page.per_page, page.page
        )
    }

    async fn send(&self, credential: &Credential, url: &str) -> ApiResult {
        tracing::debug!("GET {url}");
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&credential.token)
            .header("Accept", ACCEPT_HEADER)
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
