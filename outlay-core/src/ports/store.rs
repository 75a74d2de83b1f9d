//! Durable key-value store port
//!
//! The client keeps its session, last-login timestamp, and local
//! preferences in a string-keyed store. Values are JSON-encoded strings;
//! the store itself knows nothing about their shape.

use crate::domain::result::Result;

/// Well-known store keys
pub mod keys {
    /// Serialized `Session`
    pub const USER: &str = "user";
    /// Unix milliseconds of the last successful login
    pub const LAST_LOGIN: &str = "lastLogin";
    /// Serialized category weight map for plan generation
    pub const DEFAULT_CATEGORIES: &str = "defaultCategories";
    /// Preferred display currency code
    pub const DEFAULT_CURRENCY: &str = "defaultCurrency";
}

/// String-keyed durable storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}
