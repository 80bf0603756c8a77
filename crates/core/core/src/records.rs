//! Pass-through resource records.
//!
//! Thin shapes mirroring upstream objects with only field-name
//! normalization applied. Unlike the analytics model these are not
//! aggregated or restructured; normalizers fill them defensively and
//! leave the underlying objects recognizable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The authenticated user on the source-hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Login handle.
    pub login: String,
    /// Display name, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Public repository count.
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub public_gists: u64,
}

/// An issue on the source-hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Upstream numeric id.
    pub id: u64,
    pub title: String,
    /// "open" or "closed" as reported upstream.
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Link to the issue in the upstream UI.
    pub html_url: String,
    /// Repository name, derived from the upstream repository URL.
    pub repository: String,
    /// Author login, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A pull request on the source-hosting platform.
///
/// The upstream search API returns pull requests as issue-shaped objects,
/// so the record is the same shape.
pub type PullRequest = Issue;

/// A repository owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    /// "owner/name" form.
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub private: bool,
    pub html_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub stargazers_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// The most recent deployment recorded upstream, fetched separately.
    /// Absent when the repository has none or its fetch failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_deployment: Option<RepoDeployment>,
}

/// A deployment recorded against a repository on the source-hosting
/// platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoDeployment {
    pub id: u64,
    /// Commit sha, truncated for display.
    pub sha: String,
    /// Branch or tag the deployment was created from.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Target environment, e.g. "production".
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A project on the deployment platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Detected framework, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Linked source repository in "org/repo" form, when linked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// The most recent deployment, fetched separately per project.
    /// Absent when the project has none or its fetch failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_deployment: Option<Deployment>,
}

/// A deployment on the deployment platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Upstream deployment uid.
    pub uid: String,
    /// Deployment URL, when assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Lifecycle state, e.g. "READY" or "ERROR".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A table discovered on the backend platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_name: String,
    pub table_schema: String,
}

/// Rows fetched from one backend table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRows {
    /// The table the rows came from.
    pub table: String,
    /// Column names, taken from the first row's keys.
    pub columns: Vec<String>,
    /// Raw rows as reported upstream.
    pub rows: Vec<Value>,
    /// Row limit the fetch was issued with.
    pub limit: u32,
}

/// A user registered with the backend platform's auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}
