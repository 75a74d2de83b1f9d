//! End-to-end gateway tests against the mock backend server
//!
//! Run with: cargo test --test gateway_test -- --nocapture
//!
//! These exercise the real reqwest transport: bearer attachment, endpoint
//! failover over actual TCP, and the refresh-once session recovery.

use std::net::TcpListener;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use outlay_core::adapters::{MemoryStore, MockApiServer, MockConfig, ReqwestTransport};
use outlay_core::gateway::ApiGateway;
use outlay_core::ports::{keys, KeyValueStore, Notifier};
use outlay_core::services::AuthService;
use outlay_core::{Error, Session, UserProfile};

struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            errors: Mutex::new(Vec::new()),
        })
    }

    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, _message: &str) {}
    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
    fn info(&self, _message: &str) {}
}

/// A base URL that refuses connections: bind a port, then drop the
/// listener before anyone dials it.
fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

fn gateway_for(
    endpoints: Vec<String>,
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
) -> Arc<ApiGateway> {
    let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap());
    Arc::new(
        ApiGateway::new(endpoints, Duration::from_secs(5), transport, store, notifier).unwrap(),
    )
}

fn seed_session(store: &MemoryStore, token: &str) {
    let session = Session::new(
        token,
        UserProfile {
            id: None,
            name: "Test".into(),
            email: "test@example.com".into(),
        },
    );
    store
        .set(keys::USER, &serde_json::to_string(&session).unwrap())
        .unwrap();
}

#[test]
fn test_login_persists_session_and_token_is_attached() {
    let server = MockApiServer::start(MockConfig::default()).unwrap();
    let store = Arc::new(MemoryStore::new());
    let gateway = gateway_for(
        vec![server.base_url()],
        store.clone(),
        RecordingNotifier::new(),
    );
    let auth = AuthService::new(gateway.clone(), store.clone());

    let session = auth.login("ada@example.com", "pw").unwrap();
    assert_eq!(session.token, "tok_login_1");
    assert_eq!(session.profile.email, "ada@example.com");
    assert!(auth.last_login().unwrap().is_some());

    // A protected call now carries the stored token.
    gateway.get("/budgets").unwrap();

    let requests = server.requests();
    let budgets_request = requests
        .iter()
        .find(|r| r.path.ends_with("/budgets"))
        .unwrap();
    assert_eq!(budgets_request.bearer.as_deref(), Some("tok_login_1"));

    // The login request itself was anonymous.
    let login_request = requests
        .iter()
        .find(|r| r.path.ends_with("/auth/login"))
        .unwrap();
    assert_eq!(login_request.bearer, None);
}

#[test]
fn test_expired_token_is_refreshed_and_request_resent() {
    let server = MockApiServer::start(MockConfig {
        expired_tokens: vec!["tok_stale".to_string()],
        ..Default::default()
    })
    .unwrap();
    let store = Arc::new(MemoryStore::new());
    seed_session(&store, "tok_stale");
    let gateway = gateway_for(
        vec![server.base_url()],
        store.clone(),
        RecordingNotifier::new(),
    );

    gateway.get("/budgets").unwrap();

    assert_eq!(server.refresh_count(), 1);
    // The rotated token was persisted for later requests.
    let stored: Session = serde_json::from_str(&store.get(keys::USER).unwrap().unwrap()).unwrap();
    assert_eq!(stored.token, "tok_refreshed_1");

    // Original with stale token, refresh, resend with fresh token.
    let paths: Vec<String> = server.requests().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths.len(), 3);
    assert!(paths[1].ends_with("/auth/refresh-token"));
    assert_eq!(
        server.requests()[2].bearer.as_deref(),
        Some("tok_refreshed_1")
    );
}

#[test]
fn test_rejected_refresh_forces_logout() {
    let server = MockApiServer::start(MockConfig {
        expired_tokens: vec!["tok_stale".to_string()],
        reject_refresh: true,
        ..Default::default()
    })
    .unwrap();
    let store = Arc::new(MemoryStore::new());
    seed_session(&store, "tok_stale");
    let notifier = RecordingNotifier::new();
    let gateway = gateway_for(vec![server.base_url()], store.clone(), notifier.clone());

    let err = gateway.get("/budgets").unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
    assert!(store.get(keys::USER).unwrap().is_none());
    assert!(notifier
        .errors()
        .iter()
        .any(|m| m.contains("session has expired")));
}

#[test]
fn test_failover_to_live_endpoint() {
    let server = MockApiServer::start(MockConfig::default()).unwrap();
    let store = Arc::new(MemoryStore::new());
    seed_session(&store, "tok");
    let gateway = gateway_for(
        vec![dead_endpoint(), server.base_url()],
        store,
        RecordingNotifier::new(),
    );

    // First dispatch hits the dead endpoint, fails at the network level,
    // and retries transparently against the fallback.
    gateway.get("/budgets").unwrap();
    assert_eq!(server.requests().len(), 1);

    // The index stays on the fallback for subsequent requests.
    gateway.get("/expenses").unwrap();
    assert_eq!(server.requests().len(), 2);
}

#[test]
fn test_exhausted_failover_surfaces_network_error() {
    let store = Arc::new(MemoryStore::new());
    seed_session(&store, "tok");
    let notifier = RecordingNotifier::new();
    let gateway = gateway_for(
        vec![dead_endpoint(), dead_endpoint()],
        store,
        notifier.clone(),
    );

    let err = gateway.get("/budgets").unwrap_err();

    assert!(err.is_network());
    assert!(notifier
        .errors()
        .iter()
        .any(|m| m.contains("currently unavailable")));
}

#[test]
fn test_concurrent_401s_trigger_a_single_refresh() {
    let server = MockApiServer::start(MockConfig {
        expired_tokens: vec!["tok_stale".to_string()],
        ..Default::default()
    })
    .unwrap();
    let store = Arc::new(MemoryStore::new());
    seed_session(&store, "tok_stale");
    let gateway = gateway_for(
        vec![server.base_url()],
        store,
        RecordingNotifier::new(),
    );

    let barrier = Arc::new(Barrier::new(3));
    let mut handles = vec![];

    for _ in 0..3 {
        let gateway = gateway.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            gateway.get("/budgets").map(|_| ())
        }));
    }

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    // Refreshes are serialized and waiters observe the rotated token, so
    // a storm of stale requests produces exactly one refresh call.
    assert_eq!(server.refresh_count(), 1);
}

#[test]
fn test_logout_clears_session_locally_even_offline() {
    let store = Arc::new(MemoryStore::new());
    seed_session(&store, "tok");
    let gateway = gateway_for(
        vec![dead_endpoint()],
        store.clone(),
        RecordingNotifier::new(),
    );
    let auth = AuthService::new(gateway, store.clone());

    auth.logout().unwrap();

    assert!(store.get(keys::USER).unwrap().is_none());
    assert!(store.get(keys::LAST_LOGIN).unwrap().is_none());
}
