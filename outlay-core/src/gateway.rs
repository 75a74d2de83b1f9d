//! Session-aware request gateway
//!
//! Single choke point for every call to the backend. Owns bearer-token
//! attachment, endpoint failover, and session-expiry recovery:
//!
//! - Protected paths get `Authorization: Bearer <token>` from the stored
//!   session; a missing token is logged and dispatch proceeds (the server
//!   stays authoritative).
//! - Network-level failures advance the active endpoint candidate (never
//!   wrapping) and retry the same request until candidates are exhausted.
//! - A 401 on a protected, non-refresh path triggers exactly one token
//!   refresh and one resend; any further auth failure forces logout.
//!
//! The active-endpoint index and the refresh lock are instance state, so
//! the retry bounds hold per gateway and are testable in isolation.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::domain::result::{ApiEnvelope, Error, Result};
use crate::domain::Session;
use crate::ports::{
    keys, HttpTransport, KeyValueStore, Method, Notifier, RequestBody, TransportRequest,
    TransportResponse,
};

/// Paths that never carry a credential
const PUBLIC_PATHS: &[&str] = &["/auth/login", "/auth/register"];

/// The refresh endpoint is excluded from the 401-refresh cycle to keep
/// the retry from recursing.
const REFRESH_PATH: &str = "/auth/refresh-token";

const UNAVAILABLE_MSG: &str =
    "Backend services are currently unavailable. Please try again later.";
const SESSION_EXPIRED_MSG: &str = "Your session has expired. Please login again.";

/// A logical request against the backend, relative to whichever endpoint
/// candidate is active at dispatch time.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn post(path: impl Into<String>, body: JsonValue) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Json(body),
        }
    }

    pub fn put(path: impl Into<String>, body: JsonValue) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Json(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    fn is_public(&self) -> bool {
        PUBLIC_PATHS.iter().any(|p| self.path.ends_with(p))
    }

    fn is_refresh(&self) -> bool {
        self.path.ends_with(REFRESH_PATH)
    }
}

/// A successful (2xx) backend response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Deserialize the raw body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserialize the `{success, data, message}` envelope and unwrap it
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<T> {
        let envelope: ApiEnvelope<T> = serde_json::from_slice(&self.body)?;
        envelope.into_data()
    }
}

/// Body of the refresh endpoint: `{"token": "..."}`
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Callback invoked after a forced logout, in place of the presentation
/// layer's navigation-to-login.
pub type SessionExpiredHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Session-aware request gateway
pub struct ApiGateway {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    endpoints: Vec<String>,
    /// Index of the active endpoint candidate. Advances on network
    /// failure, never wraps; exhaustion surfaces to the caller.
    active: Mutex<usize>,
    /// Serializes token refreshes so a storm of 401s issues one refresh.
    refresh_lock: Mutex<()>,
    timeout: Duration,
    on_session_expired: Option<SessionExpiredHandler>,
}

impl ApiGateway {
    pub fn new(
        endpoints: Vec<String>,
        timeout: Duration,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::config("at least one backend endpoint is required"));
        }

        let endpoints = endpoints
            .into_iter()
            .map(|e| e.trim_end_matches('/').to_string())
            .collect();

        Ok(Self {
            transport,
            store,
            notifier,
            endpoints,
            active: Mutex::new(0),
            refresh_lock: Mutex::new(()),
            timeout,
            on_session_expired: None,
        })
    }

    /// Install a handler invoked with the reason whenever a forced logout
    /// occurs.
    pub fn with_session_expired_handler(mut self, handler: SessionExpiredHandler) -> Self {
        self.on_session_expired = Some(handler);
        self
    }

    /// Base URL of the endpoint candidate currently in use
    pub fn active_endpoint(&self) -> String {
        self.endpoints[*lock(&self.active)].clone()
    }

    // ------------------------------------------------------------------
    // Session state
    // ------------------------------------------------------------------

    /// Load the stored session, if any. A corrupt stored value is treated
    /// as no session.
    pub fn session(&self) -> Result<Option<Session>> {
        let Some(raw) = self.store.get(keys::USER)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                log::warn!("Stored session is unreadable, ignoring it: {}", e);
                Ok(None)
            }
        }
    }

    /// Persist a session (login, registration, token refresh)
    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.store
            .set(keys::USER, &serde_json::to_string(session)?)
    }

    /// Remove the session without any notification (explicit logout)
    pub fn clear_session(&self) -> Result<()> {
        self.store.remove(keys::USER)?;
        self.store.remove(keys::LAST_LOGIN)?;
        Ok(())
    }

    /// Unconditionally clear the session and signal the presentation
    /// layer. Idempotent; safe to call with no session present.
    pub fn force_logout(&self, reason: &str) {
        log::info!("Forcing logout: {}", reason);
        if let Err(e) = self.clear_session() {
            log::warn!("Failed to clear session during forced logout: {}", e);
        }
        self.notifier.error(reason);
        if let Some(handler) = &self.on_session_expired {
            handler(reason);
        }
    }

    fn token(&self) -> Option<String> {
        self.session().ok().flatten().map(|s| s.token)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Send a request through the full interceptor pipeline: credential
    /// attachment, endpoint failover, and the single refresh-then-resend
    /// cycle on 401.
    pub fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let bearer = self.bearer_for(&request);
        self.send_inner(request, bearer, false)
    }

    /// Convenience wrappers
    pub fn get(&self, path: impl Into<String>) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path))
    }

    pub fn post(&self, path: impl Into<String>, body: JsonValue) -> Result<ApiResponse> {
        self.send(ApiRequest::post(path, body))
    }

    pub fn put(&self, path: impl Into<String>, body: JsonValue) -> Result<ApiResponse> {
        self.send(ApiRequest::put(path, body))
    }

    pub fn delete(&self, path: impl Into<String>) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path))
    }

    fn bearer_for(&self, request: &ApiRequest) -> Option<String> {
        if request.is_public() {
            return None;
        }
        let token = self.token();
        if token.is_none() {
            // Intentionally non-fatal: the backend rejects unauthenticated
            // calls itself.
            log::warn!(
                "No auth token available for protected endpoint: {}",
                request.path
            );
        }
        token
    }

    fn send_inner(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
        auth_retried: bool,
    ) -> Result<ApiResponse> {
        let response = self.dispatch_with_failover(&request, bearer.clone())?;

        match response.status {
            status if (200..300).contains(&status) => Ok(ApiResponse {
                status,
                body: response.body,
            }),
            401 if !request.is_public() && !request.is_refresh() && !auth_retried => {
                log::debug!("401 on {}, attempting token refresh", request.path);
                let new_token = self.refresh_token(bearer.as_deref())?;
                self.send_inner(request, Some(new_token), true)
            }
            401 if request.is_public() => Err(Error::Rejected {
                status: 401,
                message: extract_message(&response, 401),
            }),
            401 => {
                // Refresh already happened (or this IS the refresh path);
                // escalate instead of looping.
                self.force_logout(SESSION_EXPIRED_MSG);
                Err(Error::Auth("authentication rejected after retry".into()))
            }
            status if (400..500).contains(&status) => Err(Error::Rejected {
                status,
                message: extract_message(&response, status),
            }),
            status => Err(Error::Server {
                status,
                message: extract_message(&response, status),
            }),
        }
    }

    /// Dispatch against the active candidate, advancing on network-level
    /// failure until success or exhaustion. The index only moves forward,
    /// so a request never revisits a candidate and the total attempt
    /// count is bounded by the candidate list length.
    fn dispatch_with_failover(
        &self,
        request: &ApiRequest,
        bearer: Option<String>,
    ) -> Result<TransportResponse> {
        loop {
            let idx = *lock(&self.active);
            let base = &self.endpoints[idx];
            let transport_request = TransportRequest {
                method: request.method,
                url: format!("{}{}", base, request.path),
                query: request.query.clone(),
                bearer: bearer.clone(),
                body: request.body.clone(),
                timeout: self.timeout,
            };

            log::debug!("{} {}", request.method.as_str(), transport_request.url);

            match self.transport.execute(&transport_request) {
                Ok(response) => return Ok(response),
                Err(err) => {
                    let mut active = lock(&self.active);
                    if *active > idx {
                        // Another request already failed over; retry
                        // against the newer candidate.
                        continue;
                    }
                    if idx + 1 < self.endpoints.len() {
                        *active = idx + 1;
                        log::warn!(
                            "Endpoint {} unreachable ({}), switching to fallback {}",
                            base,
                            err,
                            self.endpoints[idx + 1]
                        );
                        continue;
                    }
                    drop(active);
                    self.notifier.error(UNAVAILABLE_MSG);
                    return Err(Error::Network(err.to_string()));
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Token refresh
    // ------------------------------------------------------------------

    /// Attempt a token refresh, presenting the current token. Exactly one
    /// attempt against the active endpoint; any failure forces logout.
    ///
    /// Refreshes are serialized: a caller that reaches the lock after a
    /// concurrent request already rotated the token observes the change
    /// and skips its own refresh call.
    ///
    /// `stale` is the token the failing request was sent with, if any.
    fn refresh_token(&self, stale: Option<&str>) -> Result<String> {
        let _guard = lock(&self.refresh_lock);

        let stored = self.token();
        if let (Some(old), Some(current)) = (stale, stored.as_deref()) {
            if old != current {
                log::debug!("Token already refreshed by a concurrent request");
                return Ok(current.to_string());
            }
        }

        let Some(current) = stored else {
            log::warn!("No token available for refresh, forcing logout");
            self.force_logout(SESSION_EXPIRED_MSG);
            return Err(Error::Auth("no token available for refresh".into()));
        };

        let idx = *lock(&self.active);
        let transport_request = TransportRequest {
            method: Method::Post,
            url: format!("{}{}", self.endpoints[idx], REFRESH_PATH),
            query: Vec::new(),
            bearer: Some(current),
            body: RequestBody::Json(serde_json::json!({})),
            timeout: self.timeout,
        };

        let failure = |gateway: &Self, message: String| -> Result<String> {
            log::warn!("Token refresh failed: {}", message);
            gateway.force_logout(SESSION_EXPIRED_MSG);
            Err(Error::Auth(message))
        };

        let response = match self.transport.execute(&transport_request) {
            Ok(response) => response,
            Err(err) => return failure(self, format!("refresh request failed: {}", err)),
        };

        if !response.is_success() {
            return failure(
                self,
                format!("refresh rejected with status {}", response.status),
            );
        }

        let parsed: RefreshResponse = match serde_json::from_slice(&response.body) {
            Ok(parsed) => parsed,
            Err(e) => return failure(self, format!("unreadable refresh response: {}", e)),
        };

        let Some(new_token) = parsed.token else {
            return failure(self, "no token received in refresh response".into());
        };

        // Persist the rotated credential before resending anything.
        if let Some(session) = self.session()? {
            self.save_session(&session.with_token(new_token.clone()))?;
        }
        log::debug!("Token refreshed successfully");

        Ok(new_token)
    }
}

/// Recover a usable guard from a poisoned lock; gateway state stays
/// consistent because every critical section is a plain index/flag write.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Pull the backend's `message` field out of an error body, falling back
/// to a generic status line.
fn extract_message(response: &TransportResponse, status: u16) -> String {
    serde_json::from_slice::<JsonValue>(&response.body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}
