//! Driven port for user-visible notifications (toasts).

use std::fmt;

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Recoverable problem the user may act on.
    Warning,
    /// Failed operation.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Port for showing a notification to the user.
pub trait Notifier: Send + Sync {
    /// Show a notification with a title, body text, and severity.
    fn notify(&self, title: &str, message: &str, severity: Severity);
}
