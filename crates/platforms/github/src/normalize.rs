//! Normalizers for the source-hosting platform.
//!
//! These are pass-through mappings: upstream objects keep their meaning
//! and only field names and nesting are flattened into the shared
//! records. Missing fields become defaults; a normalizer fails only when
//! the payload is fundamentally not the expected shape.

use serde_json::Value;
use webhub_core::error::{HubError, HubResult};
use webhub_core::fields::{datetime_field, first_count, first_text};
use webhub_core::records::{Issue, PullRequest, RepoDeployment, Repository, SourceProfile};

/// Display length for commit shas.
const SHORT_SHA_LEN: usize = 7;

/// Maps the authenticated user's profile payload.
pub fn normalize_profile(body: &Value) -> HubResult<SourceProfile> {
    let login = first_text(body, &["login"])
        .ok_or_else(|| HubError::malformed("profile payload has no login"))?;
    Ok(SourceProfile {
        login: login.to_string(),
        name: first_text(body, &["name"]).map(str::to_string),
        company: first_text(body, &["company"]).map(str::to_string),
        location: first_text(body, &["location"]).map(str::to_string),
        public_repos: first_count(body, &["public_repos"]),
        followers: first_count(body, &["followers"]),
        following: first_count(body, &["following"]),
        public_gists: first_count(body, &["public_gists"]),
    })
}

/// Maps an issue listing.
///
/// The issues endpoint reports pull requests as issue rows too; rows are
/// passed through as delivered, PR-flagged or not.
pub fn normalize_issues(body: &Value) -> HubResult<Vec<Issue>> {
    let rows = body
        .as_array()
        .ok_or_else(|| HubError::malformed("issue listing is not an array"))?;
    Ok(rows.iter().map(normalize_issue).collect())
}

/// Maps a pull-request search payload.
///
/// The search endpoint wraps results in an `items` array and shapes each
/// pull request like an issue.
pub fn normalize_pull_requests(body: &Value) -> HubResult<Vec<PullRequest>> {
    let rows = body
        .get("items")
        .and_then(Value::as_array)
        .or_else(|| body.as_array())
        .ok_or_else(|| HubError::malformed("pull request search has no items array"))?;
    Ok(rows.iter().map(normalize_issue).collect())
}

fn normalize_issue(row: &Value) -> Issue {
    Issue {
        id: first_count(row, &["id"]),
        title: first_text(row, &["title"]).unwrap_or_default().to_string(),
        state: first_text(row, &["state"]).unwrap_or_default().to_string(),
        created_at: datetime_field(row, "created_at"),
        html_url: first_text(row, &["html_url"]).unwrap_or_default().to_string(),
        repository: repository_of(row),
        author: row
            .get("user")
            .and_then(|user| user.get("login"))
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// "owner/repo" derived from the row's API repository URL.
fn repository_of(row: &Value) -> String {
    let Some(url) = first_text(row, &["repository_url"]) else {
        return String::new();
    };
    let mut segments = url.rsplit('/');
    match (segments.next(), segments.next()) {
        (Some(repo), Some(owner)) if !repo.is_empty() && !owner.is_empty() => {
            format!("{owner}/{repo}")
        }
        _ => url.to_string(),
    }
}

/// Maps a repository listing payload.
pub fn normalize_repositories(body: &Value) -> HubResult<Vec<Repository>> {
    let rows = body
        .as_array()
        .ok_or_else(|| HubError::malformed("repository listing is not an array"))?;
    Ok(rows.iter().map(normalize_repository).collect())
}

fn normalize_repository(row: &Value) -> Repository {
    Repository {
        id: first_count(row, &["id"]),
        name: first_text(row, &["name"]).unwrap_or_default().to_string(),
        full_name: first_text(row, &["full_name"])
            .unwrap_or_default()
            .to_string(),
        description: first_text(row, &["description"]).map(str::to_string),
        private: row.get("private").and_then(Value::as_bool).unwrap_or(false),
        html_url: first_text(row, &["html_url"]).unwrap_or_default().to_string(),
        language: first_text(row, &["language"]).map(str::to_string),
        stargazers_count: first_count(row, &["stargazers_count"]),
        updated_at: datetime_field(row, "updated_at"),
        latest_deployment: None,
    }
}

/// Maps a repository deployment listing.
///
/// Lenient like the deployment-platform listing: a foreign shape yields
/// no deployments, and per-repository attachment tolerates that.
pub fn normalize_repo_deployments(body: &Value) -> Vec<RepoDeployment> {
    body.as_array()
        .map(|rows| rows.iter().map(normalize_repo_deployment).collect())
        .unwrap_or_default()
}

fn normalize_repo_deployment(row: &Value) -> RepoDeployment {
    let sha: String = first_text(row, &["sha"])
        .unwrap_or_default()
        .chars()
        .take(SHORT_SHA_LEN)
        .collect();
    RepoDeployment {
        id: first_count(row, &["id"]),
        sha,
        ref_name: first_text(row, &["ref"]).unwrap_or_default().to_string(),
        environment: first_text(row, &["environment"])
            .unwrap_or_default()
            .to_string(),
        created_at: datetime_field(row, "created_at"),
    }
}
