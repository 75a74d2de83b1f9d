//! HTTP transport port
//!
//! Defines the interface the gateway uses to put a single request on the
//! wire. The gateway owns credentials, failover, and retries; a transport
//! owns exactly one dispatch attempt. Keeping the seam here lets tests
//! script responses without a network.

use std::time::Duration;

use serde_json::Value as JsonValue;

/// HTTP method subset used by the backend contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Request body variants
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(JsonValue),
    /// Multipart file upload (document endpoint)
    Multipart(FilePart),
}

/// A file part for multipart uploads
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name (the backend expects "file")
    pub field: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// One fully-resolved dispatch attempt: absolute URL, credential already
/// decided by the gateway.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: RequestBody,
    pub timeout: Duration,
}

/// A response that made it back from the server, whatever the status
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as UTF-8, lossy (error messages only)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Network-level failure: no response was received at all. These are the
/// only failures that trigger endpoint failover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout,
    Connect,
    Other(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Timeout => f.write_str("connection timed out"),
            TransportError::Connect => f.write_str("unable to connect"),
            TransportError::Other(msg) => f.write_str(msg),
        }
    }
}

/// Puts one request on the wire
pub trait HttpTransport: Send + Sync {
    fn execute(
        &self,
        request: &TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}
