//! # WebHub Memory Store
//!
//! An in-memory credential store for WebHub, primarily intended
//! for testing and development purposes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webhub_adapter_memory::MemoryCredentialStore;
//!
//! let store = MemoryCredentialStore::new();
//! let hub = Hub::builder()
//!     .store(store)
//!     .build();
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use webhub_core::error::HubResult;
use webhub_core::traits::{normalize_project_url, CredentialStore, CHANGE_CHANNEL_CAPACITY};
use webhub_core::types::{Credential, CredentialEvent, Platform};

/// In-memory storage keyed by platform.
type Store<T> = Arc<RwLock<HashMap<Platform, T>>>;

/// In-memory credential store for WebHub.
///
/// Holds everything in memory and is suitable for testing and
/// development. Data is lost when the process exits.
#[derive(Debug, Clone)]
pub struct MemoryCredentialStore {
    credentials: Store<Credential>,
    project_url: Arc<RwLock<Option<String>>>,
    changes: broadcast::Sender<CredentialEvent>,
}

impl MemoryCredentialStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            credentials: Arc::new(RwLock::new(HashMap::new())),
            project_url: Arc::new(RwLock::new(None)),
            changes,
        }
    }

    /// Clears all stored data.
    pub async fn clear(&self) {
        self.credentials.write().await.clear();
        *self.project_url.write().await = None;
    }

    /// Returns the number of credentials stored.
    pub async fn credential_count(&self) -> usize {
        self.credentials.read().await.len()
    }

    fn announce(&self, event: CredentialEvent) {
        // A send error only means there are no subscribers.
        let _ = self.changes.send(event);
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, platform: Platform) -> HubResult<Option<Credential>> {
        let credentials = self.credentials.read().await;
        Ok(credentials.get(&platform).cloned())
    }

    async fn set(&self, platform: Platform, token: String) -> HubResult<Credential> {
        let credential = Credential::new(platform, token);
        self.credentials
            .write()
            .await
            .insert(platform, credential.clone());
        self.announce(CredentialEvent::connected(platform));
        Ok(credential)
    }

    async fn delete(&self, platform: Platform) -> HubResult<bool> {
        let removed = self.credentials.write().await.remove(&platform);
        if removed.is_some() {
            self.announce(CredentialEvent::disconnected(platform));
        }
        Ok(removed.is_some())
    }

    async fn list(&self) -> HubResult<Vec<Credential>> {
        let credentials = self.credentials.read().await;
        Ok(Platform::ALL
            .iter()
            .filter_map(|platform| credentials.get(platform).cloned())
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<CredentialEvent> {
        self.changes.subscribe()
    }

    async fn get_project_url(&self) -> HubResult<Option<String>> {
        Ok(self.project_url.read().await.clone())
    }

    async fn set_project_url(&self, url: String) -> HubResult<()> {
        *self.project_url.write().await = Some(normalize_project_url(&url));
        Ok(())
    }

    async fn delete_project_url(&self) -> HubResult<bool> {
        Ok(self.project_url.write().await.take().is_some())
    }
}
