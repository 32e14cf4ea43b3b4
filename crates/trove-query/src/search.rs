//! Text search collaborator
//!
//! Search is delegated to an external HTTP service. The request credential
//! is forwarded verbatim; this crate never inspects or validates it.

use crate::context::CredentialToken;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use trove_config::SearchConfig;

/// One hit returned by the search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Node reference, either an IRI or `_:label`
    pub uri: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub snippet: Option<String>,
}

/// Errors that can occur during search operations
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request to the search service failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Search service answered with a non-success status
    #[error("Search service returned status {0}")]
    Status(u16),

    /// Failed to parse the search response
    #[error("Failed to parse search results: {0}")]
    Parse(String),

    /// No search service is configured
    #[error("Search service not configured")]
    NotConfigured,
}

/// Search collaborator seam
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        credential: Option<&CredentialToken>,
    ) -> Result<Vec<SearchHit>, SearchError>;
}

/// Search client backed by an HTTP endpoint
pub struct HttpSearchClient {
    client: Client,
    base_url: String,
    credential_header: String,
}

impl HttpSearchClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credential_header: "Authorization".to_string(),
        }
    }

    pub fn with_credential_header(mut self, header: impl Into<String>) -> Self {
        self.credential_header = header.into();
        self
    }

    /// Build from configuration.
    ///
    /// Returns `NotConfigured` when search is disabled or has no base URL.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let base_url = match (config.enabled, &config.base_url) {
            (true, Some(url)) => url.clone(),
            _ => return Err(SearchError::NotConfigured),
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self::new(client, base_url).with_credential_header(config.credential_header.clone()))
    }
}

#[async_trait]
impl SearchClient for HttpSearchClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        credential: Option<&CredentialToken>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let url = format!(
            "{}/search?q={}&limit={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query),
            limit
        );
        debug!(url = %url, authenticated = credential.is_some(), "search request");

        let mut request = self.client.get(&url);
        if let Some(token) = credential {
            request = request.header(self.credential_header.as_str(), token.expose());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Parse(e.to_string()))?;

        Ok(parsed.results.into_iter().take(limit).collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_returns_hits() {
        let mock_server = MockServer::start().await;

        let response_json = r#"{
            "results": [
                {"uri": "http://ex.org/a", "score": 0.9},
                {"uri": "_:b1", "snippet": "blank"}
            ]
        }"#;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "red apple"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_string(response_json))
            .mount(&mock_server)
            .await;

        let client = HttpSearchClient::new(Client::new(), mock_server.uri());
        let hits = client.search("red apple", 5, None).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].uri, "http://ex.org/a");
        assert_eq!(hits[0].score, Some(0.9));
        assert_eq!(hits[1].snippet.as_deref(), Some("blank"));
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"results": [{"uri": "http://ex.org/1"}, {"uri": "http://ex.org/2"}, {"uri": "http://ex.org/3"}]}"#,
            ))
            .mount(&mock_server)
            .await;

        let client = HttpSearchClient::new(Client::new(), mock_server.uri());
        let hits = client.search("q", 2, None).await.unwrap();

        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_search_forwards_credential_in_configured_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("X-Api-Token", "opaque-123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results": []}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpSearchClient::new(Client::new(), mock_server.uri())
            .with_credential_header("X-Api-Token");
        let token = CredentialToken::new("opaque-123");

        let hits = client.search("q", 10, Some(&token)).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = HttpSearchClient::new(Client::new(), mock_server.uri());
        let err = client.search("q", 10, None).await.unwrap_err();
        assert!(matches!(err, SearchError::Status(503)));
    }

    #[tokio::test]
    async fn test_search_invalid_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = HttpSearchClient::new(Client::new(), mock_server.uri());
        let err = client.search("q", 10, None).await.unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn test_from_config_requires_enabled_url() {
        let disabled = SearchConfig::default();
        assert!(matches!(
            HttpSearchClient::from_config(&disabled),
            Err(SearchError::NotConfigured)
        ));

        let enabled = SearchConfig {
            enabled: true,
            base_url: Some("http://localhost:9200".to_string()),
            ..SearchConfig::default()
        };
        assert!(HttpSearchClient::from_config(&enabled).is_ok());
    }
}
