//! # WebHub Vercel Platform
//!
//! Adapter and normalizers for the deployment platform.
//!
//! ## Features
//!
//! - Raw API access for analytics, projects, and deployments
//! - Payload-shape detection across upstream analytics API versions
//! - A normalizer that folds either shape into the unified analytics
//!   result consumed by the dashboard
//!
//! ## Example
//!
//! ```rust,ignore
//! use webhub_platform_vercel::{normalize_analytics, VercelAdapter};
//!
//! let adapter = VercelAdapter::new(http_client);
//! let response = adapter.fetch_analytics(&credential, &query).await?;
//! let analytics = normalize_analytics(&response.body)?;
//! println!("{} visitors", analytics.total.visitors);
//! ```

mod client;
mod normalize;
mod payload;

pub use client::{VercelAdapter, DEFAULT_BASE_URL};
pub use normalize::{
    latest_deployment, normalize_analytics, normalize_deployments, normalize_projects,
};
pub use payload::{AnalyticsPayload, AnalyticsSections};
