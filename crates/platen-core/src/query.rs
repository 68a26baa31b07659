//! HTTP client for the remote query endpoint.
//!
//! One request per user turn: POST `{"query": ..., "top_k": ...}` as JSON,
//! read `{"answer": ...}` back. No retry or backoff; failures surface as
//! errors and the UI degrades to a canned message.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;

/// Header carrying the opaque conversation token.
const CONVERSATION_HEADER: &str = "x-conversation-id";

/// Assistant text shown in place of an answer when the request fails.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I'm having trouble connecting to the server. Please try again later.";

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    answer: String,
}

/// Client for the answer endpoint.
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    endpoint: Url,
    top_k: u32,
    conversation_id: String,
}

impl QueryClient {
    /// Builds a client from config plus the persisted conversation token.
    pub fn from_config(config: &Config, conversation_id: String) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: config.effective_endpoint()?,
            top_k: config.top_k,
            conversation_id,
        })
    }

    /// Sends one query and returns the raw answer text.
    pub async fn ask(&self, query: &str) -> Result<String> {
        tracing::debug!(endpoint = %self.endpoint, "sending query");
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONVERSATION_HEADER, &self.conversation_id)
            .json(&QueryRequest {
                query,
                top_k: self.top_k,
            })
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "query endpoint returned an error");
            bail!("query endpoint returned {status}: {body}");
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .context("Failed to parse query response")?;
        Ok(parsed.answer)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(endpoint: &str) -> Config {
        Config {
            endpoint: endpoint.to_string(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_ask_returns_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/query"))
            .and(body_partial_json(serde_json::json!({
                "query": "hello",
                "top_k": 3,
            })))
            .and(header_exists(CONVERSATION_HEADER))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "answer": "**Hi** there" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&format!("{}/api/query", server.uri()));
        let client = QueryClient::from_config(&config, "conv-1".to_string()).unwrap();
        assert_eq!(client.ask("hello").await.unwrap(), "**Hi** there");
    }

    #[tokio::test]
    async fn test_ask_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/query"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let config = test_config(&format!("{}/api/query", server.uri()));
        let client = QueryClient::from_config(&config, "conv-1".to_string()).unwrap();
        let err = client.ask("hello").await.unwrap_err();
        assert!(err.to_string().contains("503"), "got: {err:#}");
    }

    #[tokio::test]
    async fn test_ask_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let config = test_config(&format!("{}/api/query", server.uri()));
        let client = QueryClient::from_config(&config, "conv-1".to_string()).unwrap();
        assert!(client.ask("hello").await.is_err());
    }
}
