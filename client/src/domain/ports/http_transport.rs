//! Driven port for sending HTTP requests.
//!
//! The domain owns the request and response shapes so the request wrapper
//! and its tests never depend on a concrete HTTP library.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// HTTP verbs used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully built outbound request.
///
/// Header names are stored lower-cased.
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: Url,
    /// Request headers keyed by lower-cased name.
    pub headers: BTreeMap<String, String>,
    /// Serialised JSON body, if any.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name.to_ascii_lowercase().as_str())
            .map(String::as_str)
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let shown = if name == "authorization" {
                    "<redacted>"
                } else {
                    value.as_str()
                };
                (name.as_str(), shown)
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// Response received from the server, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response with no headers.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
        }
    }

    /// Add a header; the name is stored lower-cased.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name.to_ascii_lowercase().as_str())
            .map(String::as_str)
    }

    /// Raw response body.
    pub fn body(&self) -> &[u8] {
        self.body.as_slice()
    }
}

/// Errors surfaced when no HTTP response could be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {message}")]
    Connect { message: String },
    /// The transport gave up waiting.
    #[error("request timed out: {message}")]
    Timeout { message: String },
    /// Any other transport failure, including unreadable bodies.
    #[error("transport failed: {message}")]
    Io { message: String },
}

impl TransportError {
    /// Construct [`Self::Connect`].
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Construct [`Self::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Construct [`Self::Io`].
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Port for sending one HTTP request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn response_headers_are_case_insensitive() {
        let response = HttpResponse::new(429, Vec::new()).with_header("Retry-After", "45");
        assert_eq!(response.header("retry-after"), Some("45"));
        assert_eq!(response.header("RETRY-AFTER"), Some("45"));
    }

    #[test]
    fn transport_errors_render_their_cause() {
        assert_eq!(
            TransportError::timeout("30s elapsed").to_string(),
            "request timed out: 30s elapsed"
        );
        assert!(matches!(
            TransportError::connect("refused"),
            TransportError::Connect { message } if message == "refused"
        ));
    }

    #[test]
    fn success_covers_only_2xx() {
        assert!(HttpResponse::new(204, Vec::new()).is_success());
        assert!(!HttpResponse::new(304, Vec::new()).is_success());
        assert!(!HttpResponse::new(199, Vec::new()).is_success());
    }

    #[test]
    fn debug_output_redacts_authorization() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: Url::parse("http://localhost/todos").expect("valid url"),
            headers: BTreeMap::from([(
                "authorization".to_owned(),
                "Bearer secret-token".to_owned(),
            )]),
            body: None,
        };
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
