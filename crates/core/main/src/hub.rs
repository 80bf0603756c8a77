//! The aggregation facade.
//!
//! `Hub` orchestrates the three platform adapters over one injected
//! credential store. The facade owns request policy: validation and
//! credential pre-checks happen before any network call, upstream
//! failures map into the `HubError` taxonomy, combined views degrade
//! per panel instead of failing whole, and refreshable views carry
//! latest-request-wins sequencing.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use webhub_core::analytics::UnifiedAnalyticsResult;
use webhub_core::error::{HubError, HubResult};
use webhub_core::records::{
    AuthUser, Issue, Project, PullRequest, Repository, SourceProfile, TableInfo, TableRows,
};
use webhub_core::traits::{AnalyticsQuery, ApiResponse, ApiResult, CredentialStore, PageRequest};
use webhub_core::types::{ConnectionStatus, Credential, CredentialEvent, Platform};
use webhub_platform_github as github;
use webhub_platform_supabase as supabase;
use webhub_platform_vercel as vercel;

use crate::config::HubConfig;
use crate::sequencer::ViewSequencer;

// ==================== Panels ====================

/// One panel's outcome in a combined view.
pub type PanelResult<T> = Result<T, HubError>;

/// The three-platform combined view.
///
/// Each panel fails independently; a missing credential or an upstream
/// outage degrades that panel and leaves the others intact.
#[derive(Debug)]
pub struct DashboardOverview {
    /// Projects with their latest deployments.
    pub deployment: PanelResult<Vec<Project>>,
    /// Profile, issues, pull requests, and repositories.
    pub source: PanelResult<SourceOverview>,
    /// Discovered tables and registered auth users.
    pub backend: PanelResult<BackendOverview>,
}

/// The source-hosting panel.
#[derive(Debug)]
pub struct SourceOverview {
    pub profile: SourceProfile,
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
    pub repositories: Vec<Repository>,
}

/// The backend panel.
///
/// The auth listing needs the elevated service-role key, so its failure
/// is carried separately and tables still render without it.
#[derive(Debug)]
pub struct BackendOverview {
    pub project_url: String,
    pub tables: Vec<TableInfo>,
    pub auth_users: PanelResult<Vec<AuthUser>>,
}

// ==================== Builder ====================

/// Builder for [`Hub`].
#[derive(Default)]
pub struct HubBuilder {
    store: Option<Arc<dyn CredentialStore>>,
    config: HubConfig,
}

impl HubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credential store.
    pub fn store(mut self, store: impl CredentialStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets an already shared credential store.
    pub fn shared_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: HubConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the hub, constructing the shared HTTP client and the
    /// three platform adapters.
    pub fn build(self) -> HubResult<Hub> {
        let store = self
            .store
            .ok_or_else(|| HubError::invalid_request("a credential store is required"))?;
        let http_client = self.config.build_http_client().map_err(|err| {
            HubError::invalid_request(format!("invalid HTTP client configuration: {err}"))
        })?;

        let HubConfig {
            vercel_base_url,
            github_base_url,
            ..
        } = self.config;
        let vercel = match vercel_base_url {
            Some(base) => vercel::VercelAdapter::with_base_url(http_client.clone(), base),
            None => vercel::VercelAdapter::new(http_client.clone()),
        };
        let github = match github_base_url {
            Some(base) => github::GitHubAdapter::with_base_url(http_client.clone(), base),
            None => github::GitHubAdapter::new(http_client.clone()),
        };
        let supabase = supabase::SupabaseAdapter::new(http_client);

        Ok(Hub {
            store,
            vercel,
            github,
            supabase,
            analytics_seq: ViewSequencer::new(),
            overview_seq: ViewSequencer::new(),
        })
    }
}

// ==================== Hub ====================

/// The aggregation facade over the three platforms.
pub struct Hub {
    store: Arc<dyn CredentialStore>,
    vercel: vercel::VercelAdapter,
    github: github::GitHubAdapter,
    supabase: supabase::SupabaseAdapter,
    analytics_seq: ViewSequencer,
    overview_seq: ViewSequencer,
}

// The store is a trait object without a `Debug` bound, so Debug is manual.
impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("vercel", &self.vercel)
            .field("github", &self.github)
            .field("supabase", &self.supabase)
            .field("analytics_seq", &self.analytics_seq)
            .field("overview_seq", &self.overview_seq)
            .finish_non_exhaustive()
    }
}

impl Hub {
    /// Starts building a hub.
    pub fn builder() -> HubBuilder {
        HubBuilder::new()
    }

    // ==================== Connections ====================

    /// Connects a platform by storing its credential.
    pub async fn connect(
        &self,
        platform: Platform,
        token: impl Into<String>,
    ) -> HubResult<Credential> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(HubError::invalid_request("token must not be empty"));
        }
        self.store.set(platform, token).await
    }

    /// Disconnects a platform. Returns `false` when it was not
    /// connected.
    pub async fn disconnect(&self, platform: Platform) -> HubResult<bool> {
        self.store.delete(platform).await
    }

    /// Connection state for every platform, in panel order.
    pub async fn connection_status(&self) -> HubResult<Vec<ConnectionStatus>> {
        let connected = self.store.list().await?;
        Ok(Platform::ALL
            .into_iter()
            .map(|platform| {
                let stored = connected
                    .iter()
                    .find(|credential| credential.platform == platform);
                ConnectionStatus {
                    platform,
                    connected: stored.is_some(),
                    connected_at: stored.map(|credential| credential.connected_at),
                }
            })
            .collect())
    }

    /// Subscribes to credential change events.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<CredentialEvent> {
        self.store.subscribe()
    }

    /// Persists the backend project URL (trailing slash stripped).
    pub async fn set_project_url(&self, url: impl Into<String>) -> HubResult<()> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(HubError::invalid_request("project URL must not be empty"));
        }
        self.store.set_project_url(url).await
    }

    /// The persisted backend project URL, if set.
    pub async fn project_url(&self) -> HubResult<Option<String>> {
        self.store.get_project_url().await
    }

    // ==================== Analytics ====================

    /// Unified analytics for one deployment-platform project.
    ///
    /// Validates the query and checks the credential before any network
    /// call. Sequenced: when a newer analytics call is issued while this
    /// one is in flight, this one resolves to [`HubError::Superseded`]
    /// instead of handing the caller a stale result.
    pub async fn analytics(&self, query: &AnalyticsQuery) -> HubResult<UnifiedAnalyticsResult> {
        query.validate()?;
        let ticket = self.analytics_seq.begin();
        let credential = self.credential(Platform::Deployment).await?;

        let outcome = match checked(
            Platform::Deployment,
            self.vercel.fetch_analytics(&credential, query).await,
        ) {
            Ok(response) => vercel::normalize_analytics(&response.body),
            Err(err) => Err(err),
        };

        if !self.analytics_seq.is_current(ticket) {
            return Err(HubError::Superseded);
        }
        outcome
    }

    // ==================== Platform Panels ====================

    /// Deployment-platform projects, each with its latest deployment.
    ///
    /// The per-project deployment lookups fan out concurrently; a failed
    /// lookup leaves that project's deployment unset rather than failing
    /// the listing.
    pub async fn deployment_overview(&self) -> HubResult<Vec<Project>> {
        let credential = self.credential(Platform::Deployment).await?;
        let response = checked(
            Platform::Deployment,
            self.vercel.list_projects(&credential).await,
        )?;
        let mut projects = vercel::normalize_projects(&response.body)?;

        let mut lookups = JoinSet::new();
        for (index, project) in projects.iter().enumerate() {
            if project.id.is_empty() {
                continue;
            }
            let adapter = self.vercel.clone();
            let credential = credential.clone();
            let project_id = project.id.clone();
            lookups.spawn(async move {
                (
                    index,
                    adapter.latest_deployment(&credential, &project_id).await,
                )
            });
        }
        while let Some(joined) = lookups.join_next().await {
            let Ok((index, outcome)) = joined else { continue };
            if let Ok(response) = outcome {
                projects[index].latest_deployment = vercel::latest_deployment(&response.body);
            }
        }

        Ok(projects)
    }

    /// Source-hosting panel: profile, issues, pull requests, and
    /// repositories, fetched concurrently.
    pub async fn source_overview(&self, page: &PageRequest) -> HubResult<SourceOverview> {
        let credential = self.credential(Platform::SourceHosting).await?;

        let (profile, issues, pulls, repos) = tokio::join!(
            self.github.fetch_profile(&credential),
            self.github.list_issues(&credential, page),
            self.github.search_pull_requests(&credential, page),
            self.github.list_repositories(&credential, page),
        );

        let profile = github::normalize_profile(&checked(Platform::SourceHosting, profile)?.body)?;
        let issues = github::normalize_issues(&checked(Platform::SourceHosting, issues)?.body)?;
        let pull_requests =
            github::normalize_pull_requests(&checked(Platform::SourceHosting, pulls)?.body)?;
        let mut repositories =
            github::normalize_repositories(&checked(Platform::SourceHosting, repos)?.body)?;

        self.attach_repo_deployments(&credential, &mut repositories)
            .await;

        Ok(SourceOverview {
            profile,
            issues,
            pull_requests,
            repositories,
        })
    }

    /// Backend panel: discovered tables plus registered auth users.
    ///
    /// Requires the project URL to be set. Table discovery prefers the
    /// SQL RPC and falls back to the REST root when the RPC is absent or
    /// misshapen. The auth listing's failure is carried inside the panel
    /// so tables still render without the service-role key.
    pub async fn backend_overview(&self) -> HubResult<BackendOverview> {
        let credential = self.credential(Platform::Backend).await?;
        let project_url = self.require_project_url().await?;

        let tables = self.backend_tables(&credential, &project_url).await?;
        let auth_users = match self
            .supabase
            .list_auth_users(&credential, &project_url)
            .await
        {
            Ok(response) => supabase::normalize_auth_users(&response.body),
            Err(failure) => Err(match HubError::from_api_failure(Platform::Backend, failure) {
                HubError::Unauthorized { platform, .. } => HubError::unauthorized(
                    platform,
                    "listing auth users requires the service-role key, not the anon key",
                ),
                other => other,
            }),
        };

        Ok(BackendOverview {
            project_url,
            tables,
            auth_users,
        })
    }

    /// Rows from one backend table.
    pub async fn table_rows(&self, table: &str, limit: u32) -> HubResult<TableRows> {
        if table.trim().is_empty() {
            return Err(HubError::invalid_request("table name is required"));
        }
        let credential = self.credential(Platform::Backend).await?;
        let project_url = self.require_project_url().await?;
        let response = checked(
            Platform::Backend,
            self.supabase
                .fetch_table_rows(&credential, &project_url, table, limit)
                .await,
        )?;
        supabase::normalize_table_rows(&response.body, table, limit)
    }

    // ==================== Combined View ====================

    /// The three-platform combined view.
    ///
    /// All panels are issued concurrently and fail independently; the
    /// only error this returns is [`HubError::Superseded`], when a newer
    /// overview call was issued while this one was in flight.
    pub async fn overview(&self) -> HubResult<DashboardOverview> {
        let ticket = self.overview_seq.begin();
        let page = PageRequest::default();

        let (deployment, source, backend) = tokio::join!(
            self.deployment_overview(),
            self.source_overview(&page),
            self.backend_overview(),
        );

        if !self.overview_seq.is_current(ticket) {
            return Err(HubError::Superseded);
        }

        Ok(DashboardOverview {
            deployment,
            source,
            backend,
        })
    }

    // ==================== Internals ====================

    /// Attaches each repository's most recent deployment. Failures are
    /// tolerated per repository.
    async fn attach_repo_deployments(
        &self,
        credential: &Credential,
        repositories: &mut [Repository],
    ) {
        let mut lookups = JoinSet::new();
        for (index, repository) in repositories.iter().enumerate() {
            if repository.full_name.is_empty() {
                continue;
            }
            let adapter = self.github.clone();
            let credential = credential.clone();
            let full_name = repository.full_name.clone();
            lookups.spawn(async move {
                (
                    index,
                    adapter
                        .list_repo_deployments(&credential, &full_name, 1)
                        .await,
                )
            });
        }
        while let Some(joined) = lookups.join_next().await {
            let Ok((index, outcome)) = joined else { continue };
            if let Ok(response) = outcome {
                repositories[index].latest_deployment =
                    github::normalize_repo_deployments(&response.body)
                        .into_iter()
                        .next();
            }
        }
    }

    async fn backend_tables(
        &self,
        credential: &Credential,
        project_url: &str,
    ) -> HubResult<Vec<TableInfo>> {
        match self.supabase.list_tables(credential, project_url).await {
            Ok(response) => match supabase::normalize_tables(&response.body) {
                Ok(tables) => return Ok(tables),
                Err(err) => {
                    tracing::warn!(
                        "Table RPC returned an unexpected shape ({}), trying the schema root",
                        err
                    );
                }
            },
            Err(failure) => {
                tracing::warn!("Table RPC failed ({}), trying the schema root", failure);
            }
        }

        let response = checked(
            Platform::Backend,
            self.supabase.fetch_rest_root(credential, project_url).await,
        )?;
        supabase::tables_from_rest_root(&response.body)
    }

    async fn require_project_url(&self) -> HubResult<String> {
        self.store.get_project_url().await?.ok_or_else(|| {
            HubError::invalid_request("backend project URL is not set; store it before reading backend data")
        })
    }

    async fn credential(&self, platform: Platform) -> HubResult<Credential> {
        self.store.get(platform).await?.ok_or_else(|| {
            HubError::unauthorized(
                platform,
                format!("{} is not connected", platform.display_name()),
            )
        })
    }
}

fn checked(platform: Platform, outcome: ApiResult) -> HubResult<ApiResponse> {
    outcome.map_err(|failure| HubError::from_api_failure(platform, failure))
}
