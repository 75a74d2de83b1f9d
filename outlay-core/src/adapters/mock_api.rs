//! Mock backend API server for testing
//!
//! A minimal HTTP server that simulates the expense-tracker backend,
//! allowing end-to-end testing of the gateway and services without a
//! deployed backend. Implements the same response envelope as the real
//! API (`{success, data, message}`), bearer auth, the refresh-token
//! endpoint, and in-memory budget/expense state.
//!
//! Fault injection is driven by `MockConfig`: expired tokens, rejected
//! refreshes, blanket auth failure, and a fail-after-N budget-create
//! fault used to exercise partial plan generation.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value as JsonValue};

/// Configuration for mock behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Reject every protected request with 401 regardless of token
    pub fail_auth: bool,
    /// Tokens the server treats as expired (401, refreshable)
    pub expired_tokens: Vec<String>,
    /// Reject refresh attempts with 401
    pub reject_refresh: bool,
    /// Budget creates start failing with 500 after this many succeed
    pub fail_budget_creates_after: Option<usize>,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

/// One observed request, for test assertions
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub bearer: Option<String>,
}

#[derive(Debug, Default)]
struct ServerState {
    budgets: Vec<JsonValue>,
    expenses: Vec<JsonValue>,
    next_id: u64,
    budget_creates: usize,
    refreshes: usize,
    requests: Vec<RecordedRequest>,
}

/// Mock backend server for testing
pub struct MockApiServer {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<ServerState>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockApiServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_flag = running.clone();
        let state = Arc::new(Mutex::new(ServerState::default()));
        let state_handle = state.clone();

        // Non-blocking accept so the server thread can observe shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_flag.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let st = state_handle.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &st);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL including the /api prefix the client expects
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    /// Requests observed so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Budgets currently held by the server
    pub fn budgets(&self) -> Vec<JsonValue> {
        self.state.lock().unwrap().budgets.clone()
    }

    /// Number of refresh calls the server has served
    pub fn refresh_count(&self) -> usize {
        self.state.lock().unwrap().refreshes
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, state: &Arc<Mutex<ServerState>>) {
    let Some((method, path, bearer, body)) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"message":"Invalid request"}"#);
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let path_without_query = path.split('?').next().unwrap_or(&path).to_string();

    {
        let mut st = state.lock().unwrap();
        st.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            bearer: bearer.clone(),
        });
    }

    let public = path_without_query.ends_with("/auth/login")
        || path_without_query.ends_with("/auth/register");
    let refresh = path_without_query.ends_with("/auth/refresh-token");

    // Auth checks for protected endpoints
    if !public {
        if config.fail_auth {
            send_response(&mut stream, 401, "Unauthorized", r#"{"message":"Invalid token"}"#);
            return;
        }
        let Some(token) = &bearer else {
            send_response(&mut stream, 401, "Unauthorized", r#"{"message":"No token provided"}"#);
            return;
        };
        if !refresh && config.expired_tokens.iter().any(|t| t == token) {
            send_response(&mut stream, 401, "Unauthorized", r#"{"message":"Token expired"}"#);
            return;
        }
    }

    match (method.as_str(), path_without_query.as_str()) {
        ("POST", p) if p.ends_with("/auth/login") => {
            let email = body
                .get("email")
                .and_then(|v| v.as_str())
                .unwrap_or("user@example.com")
                .to_string();
            let reply = json!({
                "success": true,
                "token": "tok_login_1",
                "user": {"name": "Mock User", "email": email}
            });
            send_json(&mut stream, 200, &reply);
        }
        ("POST", p) if p.ends_with("/auth/register") => {
            let email = body
                .get("email")
                .and_then(|v| v.as_str())
                .unwrap_or("user@example.com")
                .to_string();
            let name = body
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Mock User")
                .to_string();
            let reply = json!({
                "success": true,
                "token": "tok_register_1",
                "user": {"name": name, "email": email}
            });
            send_json(&mut stream, 200, &reply);
        }
        ("POST", p) if p.ends_with("/auth/refresh-token") => {
            if config.reject_refresh {
                send_response(&mut stream, 401, "Unauthorized", r#"{"message":"Refresh denied"}"#);
                return;
            }
            let n = {
                let mut st = state.lock().unwrap();
                st.refreshes += 1;
                st.refreshes
            };
            send_json(&mut stream, 200, &json!({"token": format!("tok_refreshed_{}", n)}));
        }
        ("GET", p) if p.ends_with("/auth/me") => {
            send_json(
                &mut stream,
                200,
                &json!({"success": true, "data": {"name": "Mock User", "email": "user@example.com"}}),
            );
        }
        ("POST", p) if p.ends_with("/auth/logout") => {
            send_json(&mut stream, 200, &json!({"success": true, "data": {}}));
        }
        ("GET", p) if p.ends_with("/budgets") => {
            let budgets = state.lock().unwrap().budgets.clone();
            send_json(&mut stream, 200, &json!({"success": true, "data": budgets}));
        }
        ("POST", p) if p.ends_with("/budgets") => {
            let mut st = state.lock().unwrap();
            if let Some(limit) = config.fail_budget_creates_after {
                if st.budget_creates >= limit {
                    send_response(
                        &mut stream,
                        500,
                        "Internal Server Error",
                        r#"{"message":"Database write failed"}"#,
                    );
                    return;
                }
            }
            st.budget_creates += 1;
            st.next_id += 1;
            let mut budget = body;
            budget["id"] = json!(format!("b{}", st.next_id));
            st.budgets.push(budget.clone());
            drop(st);
            send_json(&mut stream, 201, &json!({"success": true, "data": budget}));
        }
        ("DELETE", p) if p.contains("/budgets/") => {
            let id = p.rsplit('/').next().unwrap_or("").to_string();
            let mut st = state.lock().unwrap();
            let before = st.budgets.len();
            st.budgets.retain(|b| b["id"] != json!(id.clone()));
            let found = st.budgets.len() < before;
            drop(st);
            if found {
                send_json(&mut stream, 200, &json!({"success": true, "data": {}}));
            } else {
                send_response(&mut stream, 404, "Not Found", r#"{"message":"Budget not found"}"#);
            }
        }
        ("GET", p) if p.ends_with("/expenses") => {
            let expenses = state.lock().unwrap().expenses.clone();
            send_json(&mut stream, 200, &json!({"success": true, "data": expenses}));
        }
        ("POST", p) if p.ends_with("/expenses") => {
            let mut st = state.lock().unwrap();
            st.next_id += 1;
            let mut expense = body;
            expense["id"] = json!(format!("e{}", st.next_id));
            st.expenses.push(expense.clone());
            drop(st);
            send_json(&mut stream, 201, &json!({"success": true, "data": expense}));
        }
        ("GET", p) if p.ends_with("/reports") => {
            let total: f64 = state
                .lock()
                .unwrap()
                .expenses
                .iter()
                .filter_map(|e| e["amount"].as_f64())
                .sum();
            send_json(
                &mut stream,
                200,
                &json!({"success": true, "data": {"totalExpenses": total}}),
            );
        }
        _ => {
            send_response(&mut stream, 404, "Not Found", r#"{"message":"Endpoint not found"}"#);
        }
    }
}

/// Read one HTTP request: method, path, bearer token, JSON body
fn read_request(stream: &mut TcpStream) -> Option<(String, String, Option<String>, JsonValue)> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    // Read until the header terminator, then until Content-Length bytes
    // of body have arrived.
    loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = find_header_end(&buffer) {
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_string();
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);

            if buffer.len() >= header_end + 4 + content_length {
                let body_bytes = &buffer[header_end + 4..header_end + 4 + content_length];
                return parse_request(&headers, body_bytes);
            }
        }
    }

    None
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_request(headers: &str, body: &[u8]) -> Option<(String, String, Option<String>, JsonValue)> {
    let first_line = headers.lines().next()?;
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let bearer = headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.eq_ignore_ascii_case("authorization") {
            value.trim().strip_prefix("Bearer ").map(String::from)
        } else {
            None
        }
    });

    let body = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(body).unwrap_or_else(|_| json!({}))
    };

    Some((method, path, bearer, body))
}

fn send_json(stream: &mut TcpStream, status: u16, body: &JsonValue) {
    let text = match status {
        200 => "OK",
        201 => "Created",
        _ => "OK",
    };
    send_response(stream, status, text, &body.to_string());
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
