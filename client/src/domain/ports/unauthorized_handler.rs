//! Capability invoked when the server rejects the session.
//!
//! The request wrapper calls it after clearing the stored token, so the
//! embedding application decides how to send the user back to login.

/// Port notified when a request comes back `401 Unauthorized`.
#[cfg_attr(test, mockall::automock)]
pub trait UnauthorizedHandler: Send + Sync {
    /// React to an expired or rejected session.
    fn on_unauthorized(&self);
}

/// Handler that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUnauthorizedHandler;

impl UnauthorizedHandler for NoopUnauthorizedHandler {
    fn on_unauthorized(&self) {}
}
