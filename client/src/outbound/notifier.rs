//! Notification adapter that writes toasts to the tracing pipeline.

use tracing::{error, warn};

use crate::domain::ports::{Notifier, Severity};

/// [`Notifier`] for headless use: each notification becomes a log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Warning => warn!(title, message, "notification"),
            Severity::Error => error!(title, message, "notification"),
        }
    }
}
