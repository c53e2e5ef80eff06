// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the document retrieval backend.
//!
//! Provides [`BackendClient`] which handles request construction,
//! transient error retry, and the optional synthetic fallback used when
//! the backend is unreachable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

use docrev_config::model::BackendConfig;
use docrev_core::{
    AdapterType, BackendAdapter, DocrevError, DocumentUpdate, HealthStatus, ServiceAdapter,
};

use crate::synthetic::synthetic_results;

/// Error body returned by the backend service.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    detail: String,
}

/// HTTP client for backend service communication.
///
/// Manages connection pooling, per-request timeouts, and retry logic
/// for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    synthetic_fallback: bool,
    max_retries: u32,
}

impl BackendClient {
    /// Creates a new backend client from configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, DocrevError> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocrevError::Backend {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            synthetic_fallback: config.synthetic_fallback,
            max_retries: 1,
        })
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn retrieve_inner(&self, query_text: &str) -> Result<Vec<DocumentUpdate>, DocrevError> {
        let url = format!("{}/retrieve_relevant_documents", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying retrieval request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .query(&[("query", query_text)])
                .send()
                .await
                .map_err(|e| DocrevError::Backend {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "retrieval response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| DocrevError::Backend {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let updates: Vec<DocumentUpdate> =
                    serde_json::from_str(&body).map_err(|e| DocrevError::Backend {
                        message: format!("failed to parse retrieval response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(updates);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(DocrevError::Backend {
                    message: format!("backend returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            return Err(backend_error(status, &body));
        }

        Err(last_error.unwrap_or_else(|| DocrevError::Backend {
            message: "retrieval request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl ServiceAdapter for BackendClient {
    fn name(&self) -> &str {
        "http"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, DocrevError> {
        match self.client.get(&self.base_url).send().await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Degraded(format!(
                "backend returned {}",
                response.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("backend unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), DocrevError> {
        Ok(())
    }
}

#[async_trait]
impl BackendAdapter for BackendClient {
    async fn retrieve(&self, query_text: &str) -> Result<Vec<DocumentUpdate>, DocrevError> {
        match self.retrieve_inner(query_text).await {
            Ok(updates) => Ok(updates),
            Err(e) if self.synthetic_fallback => {
                warn!(error = %e, "retrieval failed, returning synthetic results");
                Ok(synthetic_results(query_text))
            }
            Err(e) => Err(e),
        }
    }

    async fn apply(&self, updates: &[DocumentUpdate]) -> Result<(), DocrevError> {
        let url = format!("{}/apply_approved_changes", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying apply request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(updates)
                .send()
                .await
                .map_err(|e| DocrevError::Backend {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, count = updates.len(), "apply response received");

            if status.is_success() {
                return Ok(());
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(DocrevError::Backend {
                    message: format!("backend returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            return Err(backend_error(status, &body));
        }

        Err(last_error.unwrap_or_else(|| DocrevError::Backend {
            message: "apply request failed after retries".into(),
            source: None,
        }))
    }
}

/// Builds the error for a non-success response, decoding the backend's
/// `{"detail": ...}` error body when present.
fn backend_error(status: reqwest::StatusCode, body: &str) -> DocrevError {
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(body) {
        format!("backend error ({status}): {}", api_err.detail)
    } else {
        format!("backend returned {status}: {body}")
    };
    DocrevError::Backend {
        message,
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrev_core::{ChangeType, DocumentMetadata, ModelOutput};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            synthetic_fallback: false,
        })
        .unwrap()
    }

    fn fallback_client(base_url: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            synthetic_fallback: true,
        })
        .unwrap()
    }

    fn sample_update(chunk_id: &str) -> DocumentUpdate {
        DocumentUpdate {
            model_output: ModelOutput {
                change_type: ChangeType::Modified,
                original: "old text".into(),
                suggested: "new text".into(),
            },
            document_metadata: DocumentMetadata {
                chunk_id: chunk_id.into(),
                title: "Getting Started".into(),
                source_url: "https://docs.example.com/start".into(),
                file_path: "docs/start.md".into(),
            },
        }
    }

    fn sample_update_json(chunk_id: &str) -> serde_json::Value {
        serde_json::json!({
            "model_output": {
                "change_type": "modified",
                "original": "old text",
                "suggested": "new text"
            },
            "document_metadata": {
                "chunk_id": chunk_id,
                "title": "Getting Started",
                "source_url": "https://docs.example.com/start",
                "file_path": "docs/start.md"
            }
        })
    }

    #[tokio::test]
    async fn retrieve_parses_update_array() {
        let server = MockServer::start().await;

        let body = serde_json::json!([sample_update_json("c-1"), sample_update_json("c-2")]);

        Mock::given(method("POST"))
            .and(path("/retrieve_relevant_documents"))
            .and(query_param("query", "how do I install"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let updates = client.retrieve("how do I install").await.unwrap();

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].document_metadata.chunk_id, "c-1");
        assert_eq!(updates[0].model_output.change_type, ChangeType::Modified);
    }

    #[tokio::test]
    async fn retrieve_retries_on_429() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({"detail": "rate limited"});
        let success_body = serde_json::json!([sample_update_json("c-retry")]);

        // First request returns 429, second returns 200.
        Mock::given(method("POST"))
            .and(path("/retrieve_relevant_documents"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/retrieve_relevant_documents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&success_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let updates = client.retrieve("retry me").await.unwrap();
        assert_eq!(updates[0].document_metadata.chunk_id, "c-retry");
    }

    #[tokio::test]
    async fn retrieve_fails_on_400_with_detail() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({"detail": "query must not be empty"});

        Mock::given(method("POST"))
            .and(path("/retrieve_relevant_documents"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.retrieve("").await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("query must not be empty"), "got: {err}");
    }

    #[tokio::test]
    async fn retrieve_exhausts_retries_on_503() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({"detail": "service overloaded"});

        // Both attempts return 503.
        Mock::given(method("POST"))
            .and(path("/retrieve_relevant_documents"))
            .respond_with(ResponseTemplate::new(503).set_body_json(&error_body))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.retrieve("overload").await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("service overloaded"), "got: {err}");
    }

    #[tokio::test]
    async fn synthetic_fallback_masks_retrieval_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/retrieve_relevant_documents"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({"detail": "bad request"}),
            ))
            .mount(&server)
            .await;

        let client = fallback_client(&server.uri());
        let updates = client.retrieve("fallback query").await.unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].model_output.change_type, ChangeType::Unchanged);
        assert!(updates[0].model_output.original.contains("fallback query"));
        assert!(
            updates[0]
                .document_metadata
                .chunk_id
                .starts_with("synthetic-")
        );
    }

    #[tokio::test]
    async fn fallback_disabled_surfaces_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/retrieve_relevant_documents"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({"detail": "bad request"}),
            ))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.retrieve("no fallback").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn apply_posts_update_array() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/apply_approved_changes"))
            .and(wiremock::matchers::body_json(serde_json::json!([
                sample_update_json("c-apply")
            ])))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.apply(&[sample_update("c-apply")]).await;
        assert!(result.is_ok(), "apply should succeed: {result:?}");
    }

    #[tokio::test]
    async fn apply_failure_surfaces_error() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({"detail": "write failed"});

        Mock::given(method("POST"))
            .and(path("/apply_approved_changes"))
            .respond_with(ResponseTemplate::new(500).set_body_json(&error_body))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.apply(&[sample_update("c-fail")]).await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("write failed"), "got: {err}");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_trimmed() {
        let client = test_client("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn health_check_reports_unreachable_backend() {
        // Port 1 is never listening.
        let client = test_client("http://127.0.0.1:1");
        let status = client.health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(_)));
    }
}
