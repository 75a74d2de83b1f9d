//! Auth service - login, registration, and session lifecycle

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::domain::result::{Error, Result};
use crate::domain::{Session, UserProfile};
use crate::gateway::ApiGateway;
use crate::ports::{keys, KeyValueStore};

/// Login/register response: token and profile at the top level,
/// alongside the envelope fields.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

/// Auth service for session lifecycle management
pub struct AuthService {
    gateway: Arc<ApiGateway>,
    store: Arc<dyn KeyValueStore>,
}

impl AuthService {
    pub fn new(gateway: Arc<ApiGateway>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { gateway, store }
    }

    /// Log in with email and password. On success the session (token +
    /// profile) is persisted and the last-login timestamp updated.
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response = self.gateway.post(
            "/auth/login",
            json!({"email": email, "password": password}),
        )?;

        self.establish_session(response.json()?)
    }

    /// Register a new account; behaves like login on success
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        let response = self.gateway.post(
            "/auth/register",
            json!({"name": name, "email": email, "password": password}),
        )?;

        self.establish_session(response.json()?)
    }

    fn establish_session(&self, auth: AuthResponse) -> Result<Session> {
        let Some(token) = auth.token else {
            return Err(Error::Auth(
                "no authentication token received from server".into(),
            ));
        };

        let session = Session {
            token,
            refresh_token: None,
            profile: auth.user.unwrap_or_default(),
        };

        self.gateway.save_session(&session)?;
        self.store.set(
            keys::LAST_LOGIN,
            &Utc::now().timestamp_millis().to_string(),
        )?;

        Ok(session)
    }

    /// Fetch the authoritative profile for the current session
    pub fn me(&self) -> Result<UserProfile> {
        self.gateway.get("/auth/me")?.envelope()
    }

    /// Log out: the local session is cleared first so logout works even
    /// when the backend is unreachable; the server-side call is
    /// best-effort.
    pub fn logout(&self) -> Result<()> {
        self.gateway.clear_session()?;
        if let Err(e) = self.gateway.post("/auth/logout", json!({})) {
            log::debug!("Server-side logout failed (ignored): {}", e);
        }
        Ok(())
    }

    /// The currently stored session, if any
    pub fn current_session(&self) -> Result<Option<Session>> {
        self.gateway.session()
    }

    /// Unix milliseconds of the last successful login
    pub fn last_login(&self) -> Result<Option<i64>> {
        Ok(self
            .store
            .get(keys::LAST_LOGIN)?
            .and_then(|v| v.parse().ok()))
    }
}
