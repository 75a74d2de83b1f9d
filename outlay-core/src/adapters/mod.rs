//! Adapter implementations of the ports
//!
//! Concrete wiring: reqwest for the HTTP transport, a JSON file for the
//! durable store, and a mock backend server for tests.

pub mod http;
pub mod json_store;
pub mod mock_api;

pub use http::ReqwestTransport;
pub use json_store::{JsonFileStore, MemoryStore};
pub use mock_api::{MockApiServer, MockConfig, RecordedRequest};
