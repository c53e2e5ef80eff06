// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock backend adapter for deterministic testing.
//!
//! `MockBackend` implements `BackendAdapter` with per-query programmed
//! outcomes, an optional artificial delay, and a log of `apply` calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use docrev_core::{
    AdapterType, BackendAdapter, ChangeType, DocrevError, DocumentMetadata, DocumentUpdate,
    HealthStatus, ModelOutput, ServiceAdapter,
};

/// Builds a representative document update for test fixtures.
pub fn sample_update(chunk_id: &str) -> DocumentUpdate {
    DocumentUpdate {
        model_output: ModelOutput {
            change_type: ChangeType::Modified,
            original: "original text".to_string(),
            suggested: "suggested text".to_string(),
        },
        document_metadata: DocumentMetadata {
            chunk_id: chunk_id.to_string(),
            title: "Sample Document".to_string(),
            source_url: "https://docs.example.com/sample".to_string(),
            file_path: "docs/sample.md".to_string(),
        },
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Succeed(Vec<DocumentUpdate>),
    Fail(String),
}

/// A mock backend that returns pre-programmed per-query outcomes.
///
/// Queries without a programmed outcome succeed with a single sample
/// update. An optional delay makes in-flight calls observable, which
/// the dispatcher tests use to exercise discard-during-flight.
pub struct MockBackend {
    outcomes: Arc<Mutex<HashMap<String, Outcome>>>,
    delay: Option<Duration>,
    retrieved: Arc<Mutex<Vec<String>>>,
    applied: Arc<Mutex<Vec<Vec<DocumentUpdate>>>>,
    apply_error: Arc<Mutex<Option<String>>>,
}

impl MockBackend {
    /// Create a mock backend where every query succeeds immediately.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(HashMap::new())),
            delay: None,
            retrieved: Arc::new(Mutex::new(Vec::new())),
            applied: Arc::new(Mutex::new(Vec::new())),
            apply_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Delay every retrieval by `delay` before resolving.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Program `query_text` to succeed with the given updates.
    pub async fn succeed_with(&self, query_text: &str, updates: Vec<DocumentUpdate>) {
        self.outcomes
            .lock()
            .await
            .insert(query_text.to_string(), Outcome::Succeed(updates));
    }

    /// Program `query_text` to fail with the given message.
    pub async fn fail_with(&self, query_text: &str, message: &str) {
        self.outcomes
            .lock()
            .await
            .insert(query_text.to_string(), Outcome::Fail(message.to_string()));
    }

    /// Make every subsequent `apply` call fail with the given message.
    pub async fn fail_apply(&self, message: &str) {
        *self.apply_error.lock().await = Some(message.to_string());
    }

    /// Returns the update batches passed to `apply`, in call order.
    pub async fn applied_batches(&self) -> Vec<Vec<DocumentUpdate>> {
        self.applied.lock().await.clone()
    }

    /// Returns the query texts passed to `retrieve`, in call order.
    pub async fn retrieved_queries(&self) -> Vec<String> {
        self.retrieved.lock().await.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, DocrevError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocrevError> {
        Ok(())
    }
}

#[async_trait]
impl BackendAdapter for MockBackend {
    async fn retrieve(&self, query_text: &str) -> Result<Vec<DocumentUpdate>, DocrevError> {
        self.retrieved.lock().await.push(query_text.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.outcomes.lock().await.get(query_text).cloned();
        match outcome {
            Some(Outcome::Succeed(updates)) => Ok(updates),
            Some(Outcome::Fail(message)) => Err(DocrevError::Backend {
                message,
                source: None,
            }),
            None => Ok(vec![sample_update(&format!(
                "mock-{}",
                uuid::Uuid::new_v4()
            ))]),
        }
    }

    async fn apply(&self, updates: &[DocumentUpdate]) -> Result<(), DocrevError> {
        if let Some(message) = self.apply_error.lock().await.clone() {
            return Err(DocrevError::Backend {
                message,
                source: None,
            });
        }
        self.applied.lock().await.push(updates.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unprogrammed_query_succeeds_with_sample() {
        let backend = MockBackend::new();
        let updates = backend.retrieve("anything").await.unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].model_output.change_type, ChangeType::Modified);
    }

    #[tokio::test]
    async fn programmed_failure_is_returned() {
        let backend = MockBackend::new();
        backend.fail_with("bad query", "connection refused").await;

        let result = backend.retrieve("bad query").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn programmed_success_returns_given_updates() {
        let backend = MockBackend::new();
        backend
            .succeed_with("q", vec![sample_update("c-1"), sample_update("c-2")])
            .await;

        let updates = backend.retrieve("q").await.unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].document_metadata.chunk_id, "c-2");
    }

    #[tokio::test]
    async fn apply_records_batches() {
        let backend = MockBackend::new();
        backend.apply(&[sample_update("c-1")]).await.unwrap();
        backend
            .apply(&[sample_update("c-2"), sample_update("c-3")])
            .await
            .unwrap();

        let batches = backend.applied_batches().await;
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].len(), 2);
    }

    #[tokio::test]
    async fn apply_failure_does_not_record() {
        let backend = MockBackend::new();
        backend.fail_apply("disk full").await;

        let result = backend.apply(&[sample_update("c-1")]).await;
        assert!(result.is_err());
        assert!(backend.applied_batches().await.is_empty());
    }
}
