//! # WebHub
//!
//! A unified integration layer over the deployment, source-hosting, and
//! backend platforms a project dashboard talks to.
//!
//! Credentials live in an injected [`CredentialStore`]; the [`Hub`]
//! facade validates requests, checks credentials before any network
//! call, normalizes upstream payloads into shared models, and degrades
//! combined views per panel instead of failing them whole.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use webhub::prelude::*;
//! use webhub_adapter_memory::MemoryCredentialStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), HubError> {
//!     let hub = Hub::builder()
//!         .store(MemoryCredentialStore::new())
//!         .config(HubConfig::default())
//!         .build()?;
//!
//!     hub.connect(Platform::Deployment, "v1:token").await?;
//!
//!     let overview = hub.overview().await?;
//!     if let Ok(projects) = &overview.deployment {
//!         println!("{} projects", projects.len());
//!     }
//!     Ok(())
//! }
//! ```

// Re-export core types
pub use webhub_core::*;

pub mod config;
pub mod hub;
pub mod sequencer;

pub use config::HubConfig;
pub use hub::{BackendOverview, DashboardOverview, Hub, HubBuilder, PanelResult, SourceOverview};
pub use sequencer::ViewSequencer;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::HubConfig;
    pub use crate::hub::{BackendOverview, DashboardOverview, Hub, HubBuilder, SourceOverview};
    pub use webhub_core::error::{HubError, HubResult};
    pub use webhub_core::traits::{AnalyticsQuery, CredentialStore, PageRequest};
    pub use webhub_core::types::{
        ConnectionState, ConnectionStatus, Credential, CredentialEvent, Platform,
    };
}
