//! Authenticated request wrapper shared by every resource method.
//!
//! [`ApiClient`] is an explicit context object: construct one per session
//! with its own transport, key-value store, and unauthorized handler, then
//! pass it wherever requests are issued. Every outcome of a call is either
//! the decoded success body or an [`ApiError`]; raw statuses and transport
//! errors never escape this module.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use super::auth::AccessToken;
use super::error::{ApiError, ErrorKind};
use super::ports::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, KeyValueStore, UnauthorizedHandler,
};
use super::status_mapping::map_error_response;
use super::token_store::TokenStore;

const CONTENT_TYPE: &str = "content-type";
const AUTHORIZATION: &str = "authorization";
const JSON_MEDIA_TYPE: &str = "application/json";

/// One call against the API, relative to the client's base URL.
///
/// # Examples
/// ```
/// use client::domain::ApiRequest;
///
/// let request = ApiRequest::get("/search")
///     .with_query("q", "vaccination")
///     .with_header("X-Client", "cli");
/// assert_eq!(request.path(), "/search");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    body: Option<Value>,
}

impl ApiRequest {
    /// Start a request for `method` and a path relative to the base URL.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// `PUT` request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// `PATCH` request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attach a JSON body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialise `body` and attach it.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ValidationError`] when `body` cannot be
    /// represented as JSON.
    pub fn with_body<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(invalid_body)?;
        Ok(self.with_json(value))
    }

    /// Append a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add a caller header. Computed headers win on conflict.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Request method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path relative to the base URL.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }
}

/// Session-scoped API client.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl ApiClient {
    /// Build a client for `base_url`.
    ///
    /// # Examples
    /// ```rust,ignore
    /// let client = ApiClient::new(
    ///     Url::parse("http://localhost:8000/api")?,
    ///     Arc::new(ReqwestTransport::new()?),
    ///     Arc::new(MemoryKeyValueStore::default()),
    ///     Arc::new(NoopUnauthorizedHandler),
    /// );
    /// let todos = client.list_todos().await?;
    /// ```
    pub fn new(
        base_url: Url,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn KeyValueStore>,
        unauthorized: Arc<dyn UnauthorizedHandler>,
    ) -> Self {
        Self {
            base_url,
            transport,
            tokens: TokenStore::new(store),
            unauthorized,
        }
    }

    /// Base URL every endpoint path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Token store backing this client.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Current session token, if any.
    pub fn get_token(&self) -> Option<AccessToken> {
        self.tokens.get_token()
    }

    /// Replace or clear the session token.
    pub fn set_token(&self, token: Option<&AccessToken>) {
        self.tokens.set_token(token);
    }

    /// Whether a token is stored. It may still be rejected by the server.
    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    /// Perform `request` and decode a 2xx body as `T`.
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<_>`
    /// suit `204 No Content` endpoints.
    ///
    /// # Errors
    ///
    /// Every failure is an [`ApiError`]: status failures per
    /// [`map_error_response`], [`ErrorKind::NetworkError`] when no response
    /// arrived, [`ErrorKind::ValidationError`] for unusable paths or bodies,
    /// and [`ErrorKind::Unknown`] for undecodable success bodies. A 401 also
    /// clears the stored token and notifies the unauthorized handler.
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let http_request = self.build_request(request)?;
        self.execute(http_request).await
    }

    /// Resolve `request` into a wire request, capturing the current token.
    pub(crate) fn build_request(&self, request: ApiRequest) -> Result<HttpRequest, ApiError> {
        let ApiRequest {
            method,
            path,
            query,
            headers: caller_headers,
            body,
        } = request;

        let url = self.endpoint_url(&path, &query)?;
        let mut headers = caller_headers;
        headers.insert(CONTENT_TYPE.to_owned(), JSON_MEDIA_TYPE.to_owned());
        if let Some(token) = self.tokens.get_token() {
            headers.insert(AUTHORIZATION.to_owned(), token.bearer());
        }
        let body = body
            .map(|value| serde_json::to_vec(&value))
            .transpose()
            .map_err(invalid_body)?;

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Send an already built request and normalise the outcome.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<T, ApiError> {
        let method = request.method;
        let path = request.url.path().to_owned();
        debug!(%method, path = %path, "sending API request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%method, path = %path, error = %error, "API request got no response");
                return Err(ApiError::network());
            }
        };

        if response.is_success() {
            return decode_success(&response);
        }

        let error = map_error_response(&response);
        if response.status() == 401 {
            self.tokens.clear();
            self.unauthorized.on_unauthorized();
        }
        warn!(
            %method,
            path = %path,
            status = response.status(),
            kind = ?error.kind(),
            "API request failed"
        );
        Err(error)
    }

    fn endpoint_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim();
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        let mut url = Url::parse(&joined).map_err(|error| {
            ApiError::validation(format!("invalid endpoint path {path:?}: {error}"))
        })?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(name, value)| (name.as_str(), value.as_str())));
        }
        Ok(url)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

fn invalid_body(error: serde_json::Error) -> ApiError {
    ApiError::validation(format!("request body is not valid JSON: {error}"))
}

fn decode_success<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    let body = response.body();
    let decoded = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    decoded.map_err(|error| {
        ApiError::new(ErrorKind::Unknown, "The server returned an unexpected response.")
            .with_details(json!({
                "status": response.status(),
                "reason": error.to_string(),
            }))
    })
}
