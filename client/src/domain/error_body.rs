//! Shapes an error response body can take.
//!
//! Servers are expected, not required, to answer failures with `detail`
//! and/or `error: { code, message, details }`. Rather than probing an untyped
//! object, the body is parsed once into [`ErrorBody`], whose variants name
//! the fallback states explicitly. Parsing never fails.

use serde_json::{Map, Value};

/// Fields recognised in a JSON error body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredErrorBody {
    /// Human-readable `detail` string.
    pub detail: Option<String>,
    /// Machine-readable code from `error.code` (or a bare `error` string).
    pub code: Option<String>,
    /// Secondary message from `message` or `error.message`.
    pub message: Option<String>,
    /// Structured details from `error.details`, `details`, or a non-string
    /// `detail` such as a list of field errors.
    pub details: Option<Value>,
}

impl StructuredErrorBody {
    fn from_object(object: &Map<String, Value>) -> Self {
        let mut body = Self::default();
        let mut detail_value = None;

        match object.get("detail") {
            Some(Value::String(detail)) => body.detail = non_blank(detail),
            Some(Value::Null) | None => {}
            Some(other) => detail_value = Some(other.clone()),
        }
        body.message = object.get("message").and_then(Value::as_str).and_then(non_blank);

        let mut envelope_details = None;
        match object.get("error") {
            Some(Value::Object(envelope)) => {
                body.code = envelope.get("code").and_then(Value::as_str).and_then(non_blank);
                if body.message.is_none() {
                    body.message = envelope
                        .get("message")
                        .and_then(Value::as_str)
                        .and_then(non_blank);
                }
                envelope_details = envelope.get("details").filter(|v| !v.is_null()).cloned();
            }
            Some(Value::String(code)) => body.code = non_blank(code),
            _ => {}
        }

        body.details = envelope_details
            .or_else(|| object.get("details").filter(|v| !v.is_null()).cloned())
            .or(detail_value);
        body
    }

    fn is_empty(&self) -> bool {
        self.detail.is_none()
            && self.code.is_none()
            && self.message.is_none()
            && self.details.is_none()
    }
}

/// Parsed error response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// JSON object carrying at least one recognised field.
    Structured(StructuredErrorBody),
    /// Valid JSON without any recognised field.
    Opaque(Value),
    /// Empty or non-JSON body.
    Unparsed,
}

impl ErrorBody {
    /// Parse raw response bytes.
    ///
    /// # Examples
    /// ```
    /// use client::domain::ErrorBody;
    ///
    /// let body = ErrorBody::parse(br#"{"detail":"Title is required"}"#);
    /// assert_eq!(body.message(), Some("Title is required"));
    /// assert_eq!(ErrorBody::parse(b"<html>502</html>"), ErrorBody::Unparsed);
    /// ```
    pub fn parse(bytes: &[u8]) -> Self {
        let Ok(value) = serde_json::from_slice::<Value>(bytes) else {
            return Self::Unparsed;
        };
        let Value::Object(object) = &value else {
            return Self::Opaque(value);
        };
        let structured = StructuredErrorBody::from_object(object);
        if structured.is_empty() {
            Self::Opaque(value)
        } else {
            Self::Structured(structured)
        }
    }

    /// Preferred display message: `detail`, then `message`.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Structured(body) => body.detail.as_deref().or(body.message.as_deref()),
            Self::Opaque(_) | Self::Unparsed => None,
        }
    }

    /// Server error code, when one was supplied.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Structured(body) => body.code.as_deref(),
            Self::Opaque(_) | Self::Unparsed => None,
        }
    }

    /// Structured details, when any were supplied.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Structured(body) => body.details.as_ref(),
            Self::Opaque(_) | Self::Unparsed => None,
        }
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
