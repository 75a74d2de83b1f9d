//! Reqwest-backed HTTP transport
//!
//! One dispatch attempt per call; the gateway layers failover and retry
//! on top. Timeouts and connection failures map to the network-level
//! error kind so the gateway can tell them apart from HTTP statuses.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client};

use crate::ports::{
    HttpTransport, Method, RequestBody, TransportError, TransportRequest, TransportResponse,
};

/// Blocking reqwest transport
#[derive(Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport. `timeout` caps every request unless the request
    /// itself carries a tighter one.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(
        &self,
        request: &TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        builder = builder
            .timeout(request.timeout)
            .header("Accept", "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(part) => {
                let file_part = multipart::Part::bytes(part.bytes.clone())
                    .file_name(part.file_name.clone())
                    .mime_str(&part.mime_type)
                    .map_err(|e| TransportError::Other(format!("invalid mime type: {}", e)))?;
                let form = multipart::Form::new().part(part.field.clone(), file_part);
                builder.multipart(form)
            }
        };

        let response = builder.send().map_err(map_request_error)?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| TransportError::Other(format!("failed to read response body: {}", e)))?
            .to_vec();

        Ok(TransportResponse { status, body })
    }
}

/// Map reqwest errors to the transport error kinds the gateway's
/// failover logic distinguishes.
fn map_request_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect
    } else {
        TransportError::Other(error.to_string())
    }
}
