//! # WebHub File Store
//!
//! A credential store backed by a single JSON document on disk. This is
//! the durable local key-value storage the dashboard uses between
//! sessions: one entry per connected platform plus the separately kept
//! backend project URL.
//!
//! Reads are served from memory; every successful mutation is written
//! through to disk before its change event is broadcast. A store file
//! that cannot be parsed is treated as empty rather than taking the
//! dashboard down.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webhub_adapter_file::FileCredentialStore;
//!
//! let store = FileCredentialStore::open("~/.webhub/connections.json")?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use webhub_core::error::{HubError, HubResult};
use webhub_core::traits::{normalize_project_url, CredentialStore, CHANGE_CHANNEL_CAPACITY};
use webhub_core::types::{Credential, CredentialEvent, Platform};

/// On-disk document: one connection entry per platform plus the backend
/// project URL.
#[derive(Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    connections: HashMap<Platform, StoredConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_url: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
struct StoredConnection {
    token: String,
    connected_at: DateTime<Utc>,
}

/// Credential store persisted as a JSON file.
#[derive(Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    state: Arc<RwLock<StoreDocument>>,
    changes: broadcast::Sender<CredentialEvent>,
}

// The document holds tokens; Debug shows the path only.
impl fmt::Debug for FileCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCredentialStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileCredentialStore {
    /// Opens a store at the given path, loading any existing document.
    ///
    /// A missing file starts the store empty. An unparseable file also
    /// starts the store empty, with a warning; the next mutation
    /// overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> HubResult<Self> {
        let path = path.into();
        let document = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(document) => document,
                Err(err) => {
                    tracing::warn!(
                        "Credential file {} is unreadable ({}), starting empty",
                        path.display(),
                        err
                    );
                    StoreDocument::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => StoreDocument::default(),
            Err(err) => {
                return Err(HubError::storage(format!(
                    "read {}: {err}",
                    path.display()
                )));
            }
        };

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            state: Arc::new(RwLock::new(document)),
            changes,
        })
    }

    /// The path the store persists to.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn persist(&self, document: &StoreDocument) -> HubResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| HubError::storage(format!("create {}: {err}", parent.display())))?;
            }
        }
        let json = serde_json::to_string_pretty(document)
            .map_err(|err| HubError::storage(err.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|err| HubError::storage(format!("write {}: {err}", self.path.display())))
    }

    fn announce(&self, event: CredentialEvent) {
        // A send error only means there are no subscribers.
        let _ = self.changes.send(event);
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, platform: Platform) -> HubResult<Option<Credential>> {
        let state = self.state.read().await;
        Ok(state.connections.get(&platform).map(|entry| Credential {
            platform,
            token: entry.token.clone(),
            connected_at: entry.connected_at,
        }))
    }

    async fn set(&self, platform: Platform, token: String) -> HubResult<Credential> {
        let credential = Credential::new(platform, token);
        let mut state = self.state.write().await;

        // Persist the updated document before committing it, so a write
        // failure leaves memory and disk agreeing.
        let mut next = state.clone();
        next.connections.insert(
            platform,
            StoredConnection {
                token: credential.token.clone(),
                connected_at: credential.connected_at,
            },
        );
        self.persist(&next)?;
        *state = next;

        self.announce(CredentialEvent::connected(platform));
        Ok(credential)
    }

    async fn delete(&self, platform: Platform) -> HubResult<bool> {
        let mut state = self.state.write().await;
        if !state.connections.contains_key(&platform) {
            return Ok(false);
        }

        let mut next = state.clone();
        next.connections.remove(&platform);
        self.persist(&next)?;
        *state = next;

        self.announce(CredentialEvent::disconnected(platform));
        Ok(true)
    }

    async fn list(&self) -> HubResult<Vec<Credential>> {
        let state = self.state.read().await;
        Ok(Platform::ALL
            .iter()
            .filter_map(|&platform| {
                state.connections.get(&platform).map(|entry| Credential {
                    platform,
                    token: entry.token.clone(),
                    connected_at: entry.connected_at,
                })
            })
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<CredentialEvent> {
        self.changes.subscribe()
    }

    async fn get_project_url(&self) -> HubResult<Option<String>> {
        Ok(self.state.read().await.project_url.clone())
    }

    async fn set_project_url(&self, url: String) -> HubResult<()> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.project_url = Some(normalize_project_url(&url));
        self.persist(&next)?;
        *state = next;
        Ok(())
    }

    async fn delete_project_url(&self) -> HubResult<bool> {
        let mut state = self.state.write().await;
        if state.project_url.is_none() {
            return Ok(false);
        }
        let mut next = state.clone();
        next.project_url = None;
        self.persist(&next)?;
        *state = next;
        Ok(true)
    }
}
