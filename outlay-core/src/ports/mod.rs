//! Port definitions for external dependencies
//!
//! Traits at the seams: the HTTP wire, the durable store, and the
//! notification sink. Adapters provide the concrete implementations.

pub mod notifier;
pub mod store;
pub mod transport;

pub use notifier::{Notifier, NullNotifier};
pub use store::{keys, KeyValueStore};
pub use transport::{
    FilePart, HttpTransport, Method, RequestBody, TransportError, TransportRequest,
    TransportResponse,
};
