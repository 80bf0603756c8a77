//! Core data types for WebHub.
//!
//! This module defines the `Platform` identifier and the `Credential`
//! record that the credential store owns. Everything else in the system
//! borrows credentials per call; nothing outside the store holds one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one of the three integrated external platforms.
///
/// At most one credential exists per platform; absence means
/// "not connected."
///
/// # Example
///
/// ```rust
/// use webhub_core::Platform;
///
/// let platform: Platform = "deployment".parse().unwrap();
/// assert_eq!(platform, Platform::Deployment);
/// assert_eq!(platform.as_str(), "deployment");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// The deployment/hosting platform (projects, deployments, analytics).
    Deployment,
    /// The source-hosting/issue-tracking platform.
    SourceHosting,
    /// The backend-as-a-service platform (self-hosted per project).
    #[serde(rename = "baas")]
    Backend,
}

impl Platform {
    /// All platforms, in dashboard panel order.
    pub const ALL: [Platform; 3] = [
        Platform::Deployment,
        Platform::SourceHosting,
        Platform::Backend,
    ];

    /// Returns the stable identifier used as a storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Deployment => "deployment",
            Platform::SourceHosting => "source-hosting",
            Platform::Backend => "baas",
        }
    }

    /// Returns a human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Deployment => "Deployment",
            Platform::SourceHosting => "Source Hosting",
            Platform::Backend => "Backend",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deployment" => Ok(Platform::Deployment),
            "source-hosting" => Ok(Platform::SourceHosting),
            "baas" => Ok(Platform::Backend),
            other => Err(UnknownPlatform {
                value: other.to_string(),
            }),
        }
    }
}

/// Error returned when parsing an unrecognized platform identifier.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown platform: {value}")]
pub struct UnknownPlatform {
    /// The unrecognized identifier.
    pub value: String,
}

/// A stored credential for one platform.
///
/// Created on a successful connect action, overwritten on reconnect,
/// deleted on explicit disconnect. Never expires automatically.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    /// The platform this credential authorizes.
    pub platform: Platform,

    /// The opaque bearer token.
    pub token: String,

    /// When the platform was connected (or last reconnected).
    pub connected_at: DateTime<Utc>,
}

impl Credential {
    /// Creates a credential connected as of now.
    pub fn new(platform: Platform, token: impl Into<String>) -> Self {
        Self {
            platform,
            token: token.into(),
            connected_at: Utc::now(),
        }
    }
}

// Debug must not leak the token into logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("platform", &self.platform)
            .field("token", &"<redacted>")
            .field("connected_at", &self.connected_at)
            .finish()
    }
}

/// Whether a platform currently holds a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// A credential is stored for the platform.
    Connected,
    /// No credential is stored for the platform.
    Disconnected,
}

/// Broadcast to subscribers on every successful credential mutation.
///
/// There is no debounce: tokens change rarely, so every write is
/// announced immediately and consumers re-fetch on receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialEvent {
    /// The platform whose credential changed.
    pub platform: Platform,
    /// The state after the mutation.
    pub state: ConnectionState,
}

impl CredentialEvent {
    /// Event for a stored or overwritten credential.
    pub fn connected(platform: Platform) -> Self {
        Self {
            platform,
            state: ConnectionState::Connected,
        }
    }

    /// Event for a removed credential.
    pub fn disconnected(platform: Platform) -> Self {
        Self {
            platform,
            state: ConnectionState::Disconnected,
        }
    }
}

/// Per-platform connection summary reported by the facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// The platform described.
    pub platform: Platform,
    /// Whether a credential is currently stored.
    pub connected: bool,
    /// When the credential was stored, if connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
}
