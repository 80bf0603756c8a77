//! # WebHub Core
//!
//! This crate provides the foundational types and traits for the WebHub
//! integration layer. It defines the platform and credential types, the
//! unified analytics model and pass-through resource records, the error
//! taxonomy, and the `CredentialStore` trait that storage adapters
//! implement.

pub mod analytics;
pub mod error;
pub mod fields;
pub mod records;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate root
pub use analytics::{
    AnalyticsSeriesPoint, AnalyticsTotals, CountryBreakdown, DeviceBreakdown, DeviceCategory,
    PageBreakdown, UnifiedAnalyticsResult, VisitorCount, VISITOR_ESTIMATE_FACTOR,
};
pub use error::{ApiFailure, HubError, HubResult};
pub use records::{
    AuthUser, Deployment, Issue, Project, PullRequest, RepoDeployment, Repository, SourceProfile,
    TableInfo, TableRows,
};
pub use traits::{AnalyticsQuery, ApiResponse, ApiResult, CredentialStore, PageRequest};
pub use types::{ConnectionState, ConnectionStatus, Credential, CredentialEvent, Platform};
