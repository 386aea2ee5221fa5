//! Reqwest-backed HTTP transport adapter.
//!
//! This adapter owns wire details only: method and header translation,
//! transport error classification, and body collection. Status codes are
//! returned untouched for the domain to interpret.

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::domain::ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// [`HttpTransport`] over a shared `reqwest` client.
///
/// No request timeout is configured; reqwest defaults apply.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with a fresh connection pool.
    /// ```rust,ignore
    /// let transport = ReqwestTransport::new()?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(to_reqwest_method(method), url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let response_headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_transport_error)?;

        Ok(response_headers.into_iter().fold(
            HttpResponse::new(status, body.to_vec()),
            |response, (name, value)| response.with_header(&name, value),
        ))
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::connect(error.to_string())
    } else {
        TransportError::io(error.to_string())
    }
}
