//! User notification port
//!
//! Transient, auto-dismissing notifications are an observable side effect
//! of the gateway and the allocation engine (network failure, forced
//! logout, successful mutations). The presentation layer decides how they
//! render; headless callers can plug in `NullNotifier`.

/// Sink for transient user-facing notifications
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
}

/// Discards all notifications
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn success(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
}
