//! Conversion of non-success HTTP responses into [`ApiError`] records.
//!
//! This is the single place where status codes are interpreted. The mapping
//! is a pure function of the response, so feeding the same response twice
//! yields identical errors. Side effects for 401 live in the request wrapper.

use serde_json::json;

use super::error::{ApiError, ErrorKind};
use super::error_body::ErrorBody;
use super::ports::HttpResponse;

/// Header carrying the throttling window on 429 responses.
pub const RETRY_AFTER_HEADER: &str = "retry-after";
/// Retry window reported when a 429 omits `Retry-After`.
pub const DEFAULT_RETRY_AFTER: &str = "60";

/// Map a non-2xx response into exactly one [`ApiError`].
///
/// # Examples
/// ```
/// use client::domain::ports::HttpResponse;
/// use client::domain::{ErrorKind, map_error_response};
///
/// let response = HttpResponse::new(429, Vec::new()).with_header("Retry-After", "45");
/// let err = map_error_response(&response);
/// assert_eq!(err.kind(), ErrorKind::RateLimited);
/// assert!(err.message().contains("45"));
/// ```
pub fn map_error_response(response: &HttpResponse) -> ApiError {
    let body = ErrorBody::parse(response.body());
    match response.status() {
        401 => with_body_message(ErrorKind::Unauthorized, &body),
        403 => with_body_message(ErrorKind::Forbidden, &body)
            .with_optional_details(body.details().cloned()),
        404 => with_body_message(ErrorKind::NotFound, &body)
            .with_optional_details(body.details().cloned()),
        429 => rate_limited(response),
        500 | 502 | 503 | 504 => ApiError::from_kind(ErrorKind::ServerError),
        status => fallback(status, &body),
    }
}

fn with_body_message(kind: ErrorKind, body: &ErrorBody) -> ApiError {
    ApiError::new(kind, body.message().unwrap_or_default())
}

fn rate_limited(response: &HttpResponse) -> ApiError {
    let retry_after = response
        .header(RETRY_AFTER_HEADER)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_RETRY_AFTER);
    ApiError::new(
        ErrorKind::RateLimited,
        format!("Too many requests. Please try again in {retry_after} seconds."),
    )
    .with_details(json!({ "retry_after": retry_after }))
}

fn fallback(status: u16, body: &ErrorBody) -> ApiError {
    let kind = body.code().map_or(ErrorKind::Unknown, ErrorKind::from_code);
    let message = body
        .message()
        .map_or_else(|| format!("Request failed with status {status}"), str::to_owned);
    ApiError::new(kind, message).with_optional_details(body.details().cloned())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the status-to-kind table.

    use super::*;
    use rstest::rstest;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(status, body.as_bytes().to_vec())
    }

    #[rstest]
    #[case::unauthorized(401, ErrorKind::Unauthorized)]
    #[case::forbidden(403, ErrorKind::Forbidden)]
    #[case::not_found(404, ErrorKind::NotFound)]
    #[case::rate_limited(429, ErrorKind::RateLimited)]
    #[case::internal(500, ErrorKind::ServerError)]
    #[case::bad_gateway(502, ErrorKind::ServerError)]
    #[case::unavailable(503, ErrorKind::ServerError)]
    #[case::gateway_timeout(504, ErrorKind::ServerError)]
    #[case::teapot(418, ErrorKind::Unknown)]
    #[case::not_implemented(501, ErrorKind::Unknown)]
    fn maps_statuses_to_kinds(#[case] status: u16, #[case] expected: ErrorKind) {
        let err = map_error_response(&response(status, r#"{"detail": "from server"}"#));
        assert_eq!(err.kind(), expected);
    }

    #[rstest]
    #[case::with_header(Some("45"), "45")]
    #[case::missing_header(None, "60")]
    #[case::blank_header(Some("  "), "60")]
    fn rate_limit_message_carries_retry_after(
        #[case] header: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut response = response(429, "");
        if let Some(value) = header {
            response = response.with_header("Retry-After", value);
        }
        let err = map_error_response(&response);
        assert!(
            err.message().contains(expected),
            "message {:?} should mention {expected}",
            err.message()
        );
        assert_eq!(err.details(), Some(&json!({ "retry_after": expected })));
    }

    #[rstest]
    #[case(500)]
    #[case(503)]
    fn server_errors_suppress_body_details(#[case] status: u16) {
        let err = map_error_response(&response(
            status,
            r#"{"detail": "stack trace here", "error": {"details": {"trace": "x"}}}"#,
        ));
        assert_eq!(err.message(), ErrorKind::ServerError.default_message());
        assert!(err.details().is_none());
    }

    #[test]
    fn unknown_status_without_body_uses_generic_message() {
        let err = map_error_response(&response(418, "I'm a teapot"));
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.message(), "Request failed with status 418");
        assert!(err.details().is_none());
    }

    #[test]
    fn fallback_passes_body_details_through() {
        let err = map_error_response(&response(
            409,
            r#"{"detail": "Email taken", "error": {"code": "DUPLICATE_RESOURCE", "details": {"field": "email"}}}"#,
        ));
        assert_eq!(err.kind(), ErrorKind::DuplicateResource);
        assert_eq!(err.message(), "Email taken");
        assert_eq!(err.details(), Some(&json!({"field": "email"})));
    }

    #[test]
    fn forbidden_surfaces_server_message() {
        let err = map_error_response(&response(403, r#"{"detail": "Admins only"}"#));
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.message(), "Admins only");
    }

    #[test]
    fn unauthorized_defaults_message_when_body_missing() {
        let err = map_error_response(&response(401, ""));
        assert_eq!(err.message(), ErrorKind::Unauthorized.default_message());
    }

    #[rstest]
    #[case(401, "")]
    #[case(422, r#"{"detail": [{"msg": "field required"}], "error": {"code": "VALIDATION_ERROR"}}"#)]
    #[case(429, "")]
    #[case(502, "<html/>")]
    fn mapping_is_idempotent(#[case] status: u16, #[case] body: &str) {
        let response = response(status, body).with_header("Retry-After", "12");
        assert_eq!(map_error_response(&response), map_error_response(&response));
    }
}
