// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::DocrevError;
use crate::traits::adapter::ServiceAdapter;

/// Adapter for storage and persistence backends.
///
/// Storage adapters manage the lifecycle of database connections and
/// expose the keyed application-state table the queue persists into.
#[async_trait]
pub trait StorageAdapter: ServiceAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), DocrevError>;

    /// Closes the storage backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), DocrevError>;

    /// Reads the value stored under `key`, if any.
    async fn get_state(&self, key: &str) -> Result<Option<String>, DocrevError>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn put_state(&self, key: &str, value: &str) -> Result<(), DocrevError>;

    /// Removes the value stored under `key`. Missing keys are not an error.
    async fn delete_state(&self, key: &str) -> Result<(), DocrevError>;
}
