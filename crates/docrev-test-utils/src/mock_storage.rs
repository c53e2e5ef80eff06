// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory mock storage adapter.
//!
//! `MockStorage` implements `StorageAdapter` over a HashMap, with an
//! optional fail-writes mode for exercising persistence error paths.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use docrev_core::{AdapterType, DocrevError, HealthStatus, ServiceAdapter, StorageAdapter};

/// An in-memory key-value store implementing `StorageAdapter`.
pub struct MockStorage {
    state: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: bool,
}

impl MockStorage {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HashMap::new())),
            fail_writes: false,
        }
    }

    /// Create a store whose `put_state` calls always fail.
    pub fn failing_writes() -> Self {
        Self {
            state: Arc::new(Mutex::new(HashMap::new())),
            fail_writes: true,
        }
    }

    /// Seed a key-value pair before the code under test runs.
    pub async fn seed(&self, key: &str, value: &str) {
        self.state
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockStorage {
    fn name(&self) -> &str {
        "mock-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DocrevError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocrevError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MockStorage {
    async fn initialize(&self) -> Result<(), DocrevError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), DocrevError> {
        Ok(())
    }

    async fn get_state(&self, key: &str) -> Result<Option<String>, DocrevError> {
        Ok(self.state.lock().await.get(key).cloned())
    }

    async fn put_state(&self, key: &str, value: &str) -> Result<(), DocrevError> {
        if self.fail_writes {
            return Err(DocrevError::Storage {
                message: "mock storage configured to fail writes".to_string(),
                source: None,
            });
        }
        self.state
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_state(&self, key: &str) -> Result<(), DocrevError> {
        self.state.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let storage = MockStorage::new();
        storage.put_state("k", "v").await.unwrap();
        assert_eq!(storage.get_state("k").await.unwrap().as_deref(), Some("v"));

        storage.delete_state("k").await.unwrap();
        assert!(storage.get_state("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_writes_mode_errors_on_put() {
        let storage = MockStorage::failing_writes();
        let result = storage.put_state("k", "v").await;
        assert!(result.is_err());
        assert!(storage.get_state("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seed_makes_value_visible() {
        let storage = MockStorage::new();
        storage.seed("query_queue", "{}").await;
        assert_eq!(
            storage.get_state("query_queue").await.unwrap().as_deref(),
            Some("{}")
        );
    }
}
