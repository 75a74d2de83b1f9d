//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Network, auth, rejection, and server faults are distinct kinds on
/// purpose: only auth failures tear the session down, and only network
/// failures participate in endpoint failover.
#[derive(Error, Debug)]
pub enum Error {
    /// No response received from any backend endpoint candidate.
    #[error("Backend unreachable: {0}")]
    Network(String),

    /// Authentication failed and the session was torn down.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The backend rejected the request (4xx) with a structured message.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend faulted (5xx).
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether this error is a network-level failure (no response received)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether this error is a backend fault (5xx)
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Response envelope used by every backend endpoint:
/// `{"success": true, "data": ..., "message": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful envelope
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Create a failed envelope
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Unwrap the payload, turning `success: false` or a missing body
    /// into a rejection error carrying the backend's message.
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(Error::Rejected {
                status: 200,
                message: self
                    .message
                    .unwrap_or_else(|| "Request failed".to_string()),
            });
        }
        self.data.ok_or_else(|| Error::Rejected {
            status: 200,
            message: "Response missing data".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok() {
        let env: ApiEnvelope<i32> = ApiEnvelope::ok(42);
        assert!(env.success);
        assert_eq!(env.into_data().unwrap(), 42);
    }

    #[test]
    fn test_envelope_fail() {
        let env: ApiEnvelope<i32> = ApiEnvelope::fail("nope");
        let err = env.into_data().unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_envelope_missing_data() {
        let env: ApiEnvelope<i32> = ApiEnvelope {
            success: true,
            data: None,
            message: None,
        };
        assert!(env.into_data().is_err());
    }

    #[test]
    fn test_error_kinds() {
        assert!(Error::Network("down".into()).is_network());
        assert!(Error::Server {
            status: 503,
            message: "unavailable".into()
        }
        .is_server());
        assert!(!Error::Auth("expired".into()).is_network());
    }
}
