//! Client-side error taxonomy.
//!
//! Every failure the client can produce, whether an HTTP status, a transport
//! fault, or a local validation problem, is normalised into one [`ApiError`]
//! before it reaches calling code. Callers branch on [`ErrorKind`] and never
//! on raw status codes.

use fetch_retry::Retryable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable machine-readable error kind describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The session token is missing, expired, or rejected.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The server throttled the caller.
    RateLimited,
    /// The server failed (5xx gateway or internal errors).
    ServerError,
    /// No response was received from the server.
    NetworkError,
    /// The request was rejected as malformed, locally or remotely.
    ValidationError,
    /// Login was refused for the supplied credentials.
    InvalidCredentials,
    /// The resource being created already exists.
    DuplicateResource,
    /// Anything the client cannot classify.
    Unknown,
}

impl ErrorKind {
    /// Resolve a server-provided error code into a kind.
    ///
    /// Codes compare case-insensitively and treat `-` and spaces as `_`.
    /// Unrecognised codes resolve to [`ErrorKind::Unknown`].
    ///
    /// # Examples
    /// ```
    /// use client::domain::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::from_code("VALIDATION_ERROR"), ErrorKind::ValidationError);
    /// assert_eq!(ErrorKind::from_code("duplicate-resource"), ErrorKind::DuplicateResource);
    /// assert_eq!(ErrorKind::from_code("teapot"), ErrorKind::Unknown);
    /// ```
    pub fn from_code(code: &str) -> Self {
        let normalised = code.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalised.as_str() {
            "UNAUTHORIZED" | "UNAUTHENTICATED" | "TOKEN_EXPIRED" => Self::Unauthorized,
            "FORBIDDEN" | "PERMISSION_DENIED" => Self::Forbidden,
            "NOT_FOUND" => Self::NotFound,
            "RATE_LIMITED" | "TOO_MANY_REQUESTS" => Self::RateLimited,
            "SERVER_ERROR" | "INTERNAL_ERROR" => Self::ServerError,
            "NETWORK_ERROR" => Self::NetworkError,
            "VALIDATION_ERROR" | "INVALID_REQUEST" => Self::ValidationError,
            "INVALID_CREDENTIALS" => Self::InvalidCredentials,
            "DUPLICATE_RESOURCE" | "ALREADY_EXISTS" | "CONFLICT" => Self::DuplicateResource,
            _ => Self::Unknown,
        }
    }

    /// Message used when neither the caller nor the server supplied one.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Unauthorized => "Your session has expired. Please log in again.",
            Self::Forbidden => "You do not have permission to perform this action.",
            Self::NotFound => "The requested resource was not found.",
            Self::RateLimited => "Too many requests. Please try again later.",
            Self::ServerError => "Server error. Please try again later.",
            Self::NetworkError => "Network error. Please check your connection.",
            Self::ValidationError => "The request was invalid.",
            Self::InvalidCredentials => "Invalid username or password.",
            Self::DuplicateResource => "This resource already exists.",
            Self::Unknown => "An unexpected error occurred.",
        }
    }
}

/// Normalised error record returned by every client operation.
///
/// ## Invariants
/// - `message` is never blank: blank inputs fall back to
///   [`ErrorKind::default_message`].
///
/// # Examples
/// ```
/// use client::domain::{ApiError, ErrorKind};
///
/// let err = ApiError::new(ErrorKind::NotFound, "  ");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.message(), "The requested resource was not found.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    /// Create an error, substituting the kind's default for a blank message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.default_message().to_owned()
        } else {
            message
        };
        Self {
            kind,
            message,
            details: None,
        }
    }

    /// Create an error carrying the kind's default message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    /// Stable machine-readable error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message suitable for display.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details, when the server provided any.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use client::domain::{ApiError, ErrorKind};
    /// use serde_json::json;
    ///
    /// let err = ApiError::new(ErrorKind::ValidationError, "bad")
    ///     .with_details(json!({ "field": "title" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach details only when present.
    pub(crate) fn with_optional_details(mut self, details: Option<Value>) -> Self {
        self.details = details;
        self
    }

    /// Convenience constructor for [`ErrorKind::ValidationError`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// Convenience constructor for [`ErrorKind::NetworkError`].
    pub fn network() -> Self {
        Self::from_kind(ErrorKind::NetworkError)
    }

    /// Convenience constructor for [`ErrorKind::Unknown`].
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl Retryable for ApiError {
    /// `Forbidden`, `InvalidCredentials` and `Unauthorized` are permanent.
    fn is_retryable(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::Forbidden | ErrorKind::InvalidCredentials | ErrorKind::Unauthorized
        )
    }
}
