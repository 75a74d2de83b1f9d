//! Terminal notifier - renders core notifications as colored lines

use outlay_core::ports::Notifier;

use crate::output;

/// Notifier implementation for terminal sessions
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn success(&self, message: &str) {
        output::success(message);
    }

    fn error(&self, message: &str) {
        output::error(message);
    }

    fn info(&self, message: &str) {
        output::info(message);
    }
}
