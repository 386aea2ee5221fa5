//! Kind-to-notification lookup for user-facing error toasts.
//!
//! Two cases stay silent because the caller already shows them in context:
//! an expired session (the login redirect) and rejected credentials on the
//! login form (an inline field error).

use std::sync::Arc;

use super::error::{ApiError, ErrorKind};
use super::ports::{Notifier, Severity};

/// Where the failing call was made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorContext {
    /// Any screen other than the login form.
    #[default]
    General,
    /// The login form, which renders credential errors inline.
    Login,
}

/// Notification derived from an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Kind-specific title.
    pub title: &'static str,
    /// The error's message.
    pub message: String,
    /// Display severity.
    pub severity: Severity,
}

/// Map an error to the notification it should produce, if any.
///
/// # Examples
/// ```
/// use client::domain::{ApiError, ErrorContext, ErrorKind, notification_for};
///
/// let shown = notification_for(&ApiError::from_kind(ErrorKind::Forbidden), ErrorContext::General);
/// assert_eq!(shown.map(|n| n.title), Some("Access Denied"));
///
/// let silent = notification_for(&ApiError::from_kind(ErrorKind::Unauthorized), ErrorContext::General);
/// assert!(silent.is_none());
/// ```
pub fn notification_for(error: &ApiError, context: ErrorContext) -> Option<Notification> {
    let (title, severity) = match (error.kind(), context) {
        (ErrorKind::Unauthorized, _) | (ErrorKind::InvalidCredentials, ErrorContext::Login) => {
            return None;
        }
        (ErrorKind::InvalidCredentials, ErrorContext::General) => {
            ("Invalid Credentials", Severity::Error)
        }
        (ErrorKind::Forbidden, _) => ("Access Denied", Severity::Error),
        (ErrorKind::NotFound, _) => ("Not Found", Severity::Error),
        (ErrorKind::RateLimited, _) => ("Too Many Requests", Severity::Warning),
        (ErrorKind::ServerError, _) => ("Server Error", Severity::Error),
        (ErrorKind::NetworkError, _) => ("Connection Error", Severity::Error),
        (ErrorKind::ValidationError, _) => ("Validation Error", Severity::Warning),
        (ErrorKind::DuplicateResource, _) => ("Already Exists", Severity::Warning),
        (ErrorKind::Unknown, _) => ("Something Went Wrong", Severity::Error),
    };
    Some(Notification {
        title,
        message: error.message().to_owned(),
        severity,
    })
}

/// Sends error notifications to an injected [`Notifier`].
#[derive(Clone)]
pub struct ErrorPresenter {
    notifier: Arc<dyn Notifier>,
}

impl ErrorPresenter {
    /// Build a presenter over `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Notify the user about `error`; returns whether anything was shown.
    pub fn present(&self, error: &ApiError, context: ErrorContext) -> bool {
        match notification_for(error, context) {
            Some(notification) => {
                self.notifier.notify(
                    notification.title,
                    notification.message.as_str(),
                    notification.severity,
                );
                true
            }
            None => false,
        }
    }
}
