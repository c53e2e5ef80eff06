// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use docrev_config::model::StorageConfig;
use docrev_core::{AdapterType, DocrevError, HealthStatus, ServiceAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, DocrevError> {
        self.db.get().ok_or_else(|| DocrevError::Storage {
            message: "storage not initialized -- call initialize() first".to_string(),
            source: None,
        })
    }
}

#[async_trait]
impl ServiceAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DocrevError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocrevError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), DocrevError> {
        let db = Database::open(&self.config.path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| DocrevError::Storage {
            message: "storage already initialized".to_string(),
            source: None,
        })?;
        debug!(path = %self.config.path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), DocrevError> {
        let db = self.db()?;
        // Checkpoint WAL before close.
        db.close().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn get_state(&self, key: &str) -> Result<Option<String>, DocrevError> {
        queries::state::get(self.db()?, key).await
    }

    async fn put_state(&self, key: &str, value: &str) -> Result<(), DocrevError> {
        queries::state::put(self.db()?, key, value).await
    }

    async fn delete_state(&self, key: &str) -> Result<(), DocrevError> {
        queries::state::delete(self.db()?, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_service_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let result = storage.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let status = storage.health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        let result = storage.health_check().await;
        assert!(result.is_err(), "health_check should fail before initialize");
    }

    #[tokio::test]
    async fn state_operations_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state_adapter.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        assert!(storage.get_state("query_queue").await.unwrap().is_none());

        storage
            .put_state("query_queue", r#"{"version":1,"records":[]}"#)
            .await
            .unwrap();
        let value = storage.get_state("query_queue").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"version":1,"records":[]}"#));

        storage.delete_state("query_queue").await.unwrap();
        assert!(storage.get_state("query_queue").await.unwrap().is_none());

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        storage.put_state("k", "v").await.unwrap();
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_before_initialize_is_noop() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("noop.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.shutdown().await.unwrap();
        assert!(!db_path.exists());
    }
}
