//! Error types for WebHub.
//!
//! Two layers, matching the propagation policy: `ApiFailure` is the typed
//! value a platform adapter returns for HTTP-level trouble (adapters never
//! panic on upstream failures), and `HubError` is the facade-level taxonomy
//! consumers see. Normalizers absorb field-level inconsistencies silently
//! and may only raise `MalformedResponse` for a fundamentally wrong payload
//! shape.

use thiserror::Error;

use crate::types::Platform;

/// An HTTP-level failure from one adapter call.
///
/// Carried as a value so the facade can decide partial vs. total failure.
#[derive(Debug, Error)]
pub enum ApiFailure {
    /// The upstream answered with a non-2xx status.
    #[error("Upstream returned status {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The upstream error body, truncated for display.
        body: String,
    },

    /// The request never produced a response (DNS, connect, TLS).
    #[error("Network error: {message}")]
    Network { message: String },

    /// A 2xx response carried a body that was not JSON.
    #[error("Undecodable response body: {message}")]
    Decode { message: String },

    /// The client-side timeout expired before a response arrived.
    #[error("Request timed out")]
    Timeout,
}

impl ApiFailure {
    /// Creates a status failure from a response's status and body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

/// The main error type for WebHub operations.
#[derive(Debug, Error)]
pub enum HubError {
    // ==================== Request Errors ====================
    /// A required parameter was missing or invalid; no network call was made.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The credential is absent, expired, or rejected by the upstream.
    #[error("Unauthorized for {platform}: {message}")]
    Unauthorized {
        platform: Platform,
        message: String,
    },

    /// The requested resource does not exist upstream.
    #[error("Not found: {message}")]
    NotFound { message: String },

    // ==================== Upstream Errors ====================
    /// The upstream could not be reached or answered with a 5xx.
    #[error("{platform} unavailable: {message}")]
    UpstreamUnavailable {
        platform: Platform,
        message: String,
    },

    /// The upstream answered with some other non-2xx status.
    #[error("Upstream error ({status}): {message}")]
    UpstreamError { status: u16, message: String },

    /// The client-side timeout expired.
    #[error("Request to {platform} timed out")]
    Timeout { platform: Platform },

    /// The payload was not of the expected top-level shape.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    // ==================== Local Errors ====================
    /// The credential store could not persist or read state.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// The result was discarded because a newer request superseded it.
    #[error("Superseded by a newer request")]
    Superseded,
}

impl HubError {
    /// Creates a new invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new unauthorized error for a platform.
    pub fn unauthorized(platform: Platform, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            platform,
            message: message.into(),
        }
    }

    /// Creates a new not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Creates a new storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Maps an adapter failure into the facade taxonomy.
    ///
    /// 401/403 become `Unauthorized` (the consumer should prompt
    /// re-connection of that platform), 404 becomes `NotFound`, network
    /// failures and 5xx become `UpstreamUnavailable`, and anything else
    /// keeps its status as `UpstreamError`.
    pub fn from_api_failure(platform: Platform, failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Status { status, body } if status == 401 || status == 403 => {
                Self::Unauthorized {
                    platform,
                    message: body,
                }
            }
            ApiFailure::Status { status, body } if status == 404 => Self::NotFound {
                message: if body.is_empty() {
                    format!("{platform} resource not found")
                } else {
                    body
                },
            },
            ApiFailure::Status { status, body } if status >= 500 => Self::UpstreamUnavailable {
                platform,
                message: format!("status {status}: {body}"),
            },
            ApiFailure::Status { status, body } => Self::UpstreamError {
                status,
                message: body,
            },
            ApiFailure::Network { message } => Self::UpstreamUnavailable { platform, message },
            ApiFailure::Decode { message } => Self::MalformedResponse { message },
            ApiFailure::Timeout => Self::Timeout { platform },
        }
    }

    /// Returns the platform an error is scoped to, when it is.
    ///
    /// Consumers use this to target the retry/reconnect affordance at the
    /// failed panel instead of the whole dashboard.
    pub fn platform(&self) -> Option<Platform> {
        match self {
            Self::Unauthorized { platform, .. }
            | Self::UpstreamUnavailable { platform, .. }
            | Self::Timeout { platform } => Some(*platform),
            _ => None,
        }
    }

    /// Returns true if this error calls for user action (vs internal).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. } | Self::Unauthorized { .. } | Self::NotFound { .. }
        )
    }

    /// Returns an HTTP status code appropriate for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::Unauthorized { .. } => 401,
            Self::NotFound { .. } => 404,
            Self::Superseded => 409,
            Self::UpstreamUnavailable { .. }
            | Self::UpstreamError { .. }
            | Self::MalformedResponse { .. } => 502,
            Self::Timeout { .. } => 504,
            Self::Storage { .. } => 500,
        }
    }
}

/// A Result type alias using HubError.
pub type HubResult<T> = Result<T, HubError>;

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse {
            message: err.to_string(),
        }
    }
}
