//! # WebHub GitHub Platform
//!
//! Adapter and normalizers for the source-hosting platform.
//!
//! ## Features
//!
//! - Raw API access for the profile, issues, pull requests,
//!   repositories, and per-repository deployments
//! - Pass-through normalizers that flatten upstream objects into the
//!   shared records without reshaping them
//!
//! ## Example
//!
//! ```rust,ignore
//! use webhub_platform_github::{normalize_profile, GitHubAdapter};
//!
//! let adapter = GitHubAdapter::new(http_client);
//! let response = adapter.fetch_profile(&credential).await?;
//! let profile = normalize_profile(&response.body)?;
//! println!("signed in as {}", profile.login);
//! ```

mod client;
mod normalize;

pub use client::{GitHubAdapter, DEFAULT_BASE_URL};
pub use normalize::{
    normalize_issues, normalize_profile, normalize_pull_requests, normalize_repo_deployments,
    normalize_repositories,
};
