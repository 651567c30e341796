//! REST vector database client
//!
//! Targets indexes that embed on the server side: the raw text is sent
//! to `{url}/query-data` and the best hit comes back with its stored data.

use super::{IndexMatch, SimilarityIndex};
use crate::config::IndexConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoffBuilder};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Vector index reached over HTTP
pub struct RestVectorIndex {
    client: reqwest::Client,
    base_url: String,
    token: String,
    retry_max_elapsed: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    data: &'a str,
    top_k: usize,
    include_data: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Vec<QueryHit>,
}

#[derive(Deserialize)]
struct QueryHit {
    id: serde_json::Value,
    score: f64,
    #[serde(default)]
    data: Option<String>,
}

impl QueryHit {
    fn into_match(self) -> IndexMatch {
        let text = match self.data {
            Some(data) => data,
            None => match self.id {
                serde_json::Value::String(id) => id,
                other => other.to_string(),
            },
        };
        IndexMatch { text, score: self.score }
    }
}

impl RestVectorIndex {
    /// Create a new REST index client
    pub fn new(url: String, token: String, config: &IndexConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            token,
            retry_max_elapsed: Duration::from_millis(config.retry_max_elapsed_ms),
        })
    }

    async fn send_query(&self, text: &str) -> std::result::Result<QueryResponse, backoff::Error<AppError>> {
        let url = format!("{}/query-data", self.base_url);
        let request = QueryRequest {
            data: text,
            top_k: 1,
            include_data: true,
        };

        let response = self.client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| backoff::Error::transient(AppError::IndexError {
                message: format!("Request failed: {}", e),
            }))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = AppError::IndexError {
                message: format!("Index error {}: {}", status, body),
            };
            return Err(if is_retryable(status) {
                backoff::Error::transient(err)
            } else {
                backoff::Error::permanent(err)
            });
        }

        response.json::<QueryResponse>().await.map_err(|e| {
            backoff::Error::permanent(AppError::IndexError {
                message: format!("Failed to parse response: {}", e),
            })
        })
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl SimilarityIndex for RestVectorIndex {
    async fn query(&self, text: &str) -> Result<Option<IndexMatch>> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(50))
            .with_max_elapsed_time(Some(self.retry_max_elapsed))
            .build();

        let this = self;
        let response = retry(policy, move || async move {
            this.send_query(text).await.map_err(|e| {
                if let backoff::Error::Transient { err, .. } = &e {
                    warn!(error = %err, "Index query failed, retrying");
                }
                e
            })
        })
        .await?;

        Ok(response.result.into_iter().next().map(QueryHit::into_match))
    }

    fn name(&self) -> &str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = QueryRequest {
            data: "some words",
            top_k: 1,
            include_data: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["data"], "some words");
        assert_eq!(json["topK"], 1);
        assert_eq!(json["includeData"], true);
    }

    #[test]
    fn test_hit_prefers_data_over_id() {
        let body = r#"{"result":[{"id":"42","score":0.97,"data":"knave"}]}"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        let hit = parsed.result.into_iter().next().unwrap().into_match();
        assert_eq!(hit.text, "knave");
        assert_eq!(hit.score, 0.97);
    }

    #[test]
    fn test_hit_falls_back_to_numeric_id() {
        let body = r#"{"result":[{"id":7,"score":0.5}]}"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        let hit = parsed.result.into_iter().next().unwrap().into_match();
        assert_eq!(hit.text, "7");
    }

    #[test]
    fn test_empty_result() {
        let parsed: QueryResponse = serde_json::from_str(r#"{"result":[]}"#).unwrap();
        assert!(parsed.result.is_empty());
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_unreachable_index_is_an_error() {
        let config = IndexConfig {
            timeout_secs: 1,
            retry_max_elapsed_ms: 0,
            ..IndexConfig::default()
        };
        let index = RestVectorIndex::new(
            "http://127.0.0.1:9".to_string(),
            "token".to_string(),
            &config,
        )
        .unwrap();

        let result = index.query("hello").await;
        assert!(matches!(result, Err(AppError::IndexError { .. })));
    }
}
