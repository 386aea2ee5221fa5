//! Full-text search endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::api_client::{ApiClient, ApiRequest};
use crate::domain::error::ApiError;

/// One search match.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchHit {
    /// Identifier of the matched record.
    pub id: i64,
    /// Record type, e.g. `todo` or `task`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display title.
    pub title: String,
    /// Highlighted excerpt.
    #[serde(default)]
    pub snippet: Option<String>,
    /// Relevance score.
    #[serde(default)]
    pub score: Option<f64>,
}

/// Page of search matches.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchResults {
    /// Matches in relevance order.
    #[serde(default)]
    pub results: Vec<SearchHit>,
    /// Total matches on the server, which may exceed `results.len()`.
    #[serde(default)]
    pub total: u64,
}

impl ApiClient {
    /// `GET /search?q=&limit=`.
    ///
    /// # Errors
    ///
    /// A blank query is [`crate::domain::ErrorKind::ValidationError`] and no
    /// request is sent. Other failures follow the request wrapper.
    pub async fn search(&self, query: &str, limit: Option<u32>) -> Result<SearchResults, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::validation("Search query must not be empty."));
        }
        let mut request = ApiRequest::get("/search").with_query("q", query);
        if let Some(limit) = limit {
            request = request.with_query("limit", limit.to_string());
        }
        self.request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::test_support::ClientHarness;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("  \t")]
    #[tokio::test]
    async fn blank_query_is_rejected_locally(#[case] query: &str) {
        let harness = ClientHarness::new();

        let err = harness.client.search(query, None).await.expect_err("blank");

        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(harness.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn query_and_limit_are_encoded() {
        let harness = ClientHarness::new();
        harness.transport.push_json(
            200,
            json!({
                "results": [
                    {"id": 7, "type": "todo", "title": "Rabies booster", "score": 0.92}
                ],
                "total": 12
            }),
        );

        let found = harness
            .client
            .search("rabies & booster", Some(5))
            .await
            .expect("results");

        assert_eq!(found.total, 12);
        assert_eq!(found.results[0].kind, "todo");
        assert_eq!(found.results[0].score, Some(0.92));
        let sent = harness.transport.last_request().expect("request sent");
        assert_eq!(sent.url.path(), "/api/search");
        assert_eq!(sent.url.query(), Some("q=rabies+%26+booster&limit=5"));
    }

    #[tokio::test]
    async fn throttled_search_reports_retry_window() {
        let harness = ClientHarness::new();
        harness.transport.push_response(
            crate::domain::ports::HttpResponse::new(429, Vec::new())
                .with_header("Retry-After", "30"),
        );

        let err = harness.client.search("cats", None).await.expect_err("throttled");

        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.details(), Some(&json!({"retry_after": "30"})));
    }
}
