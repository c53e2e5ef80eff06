// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Docrev workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a query record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryId(pub String);

impl QueryId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a [`crate::traits::ServiceAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Backend,
    Storage,
}

/// Lifecycle state of a query record.
///
/// New records start in `Waiting`. The dispatcher moves them to
/// `Processing` and resolves them to `Completed` or `Error`. A
/// user-initiated retry moves an `Error` record back to `Waiting`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Waiting,
    Processing,
    Completed,
    Error,
}

/// How the model changed a document chunk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Modified,
    Removed,
    Unchanged,
}

/// The model's proposed revision for a single document chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub change_type: ChangeType,
    pub original: String,
    pub suggested: String,
}

/// Provenance of a document chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub chunk_id: String,
    pub title: String,
    pub source_url: String,
    pub file_path: String,
}

/// A proposed document revision paired with the chunk it applies to.
///
/// This is the wire shape exchanged with the backend service; field
/// names are part of the API contract and must not be renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    pub model_output: ModelOutput,
    pub document_metadata: DocumentMetadata,
}

/// A single query submitted for document retrieval, together with its
/// processing state and (once resolved) its results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: QueryId,
    pub query_text: String,
    pub status: QueryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<DocumentUpdate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retry_count: u32,
}

impl QueryRecord {
    /// Creates a new record in the `waiting` state with a generated id.
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            id: QueryId::generate(),
            query_text: query_text.into(),
            status: QueryStatus::Waiting,
            results: None,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
            retry_count: 0,
        }
    }
}

/// A partial update merged into a stored [`QueryRecord`].
///
/// Unset fields keep the record's current value. `results`,
/// `error_message` and `completed_at` are doubly optional so a patch can
/// explicitly clear them (e.g. on retry or failure).
#[derive(Debug, Clone, Default)]
pub struct QueryPatch {
    pub status: Option<QueryStatus>,
    pub results: Option<Option<Vec<DocumentUpdate>>>,
    pub error_message: Option<Option<String>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub retry_count: Option<u32>,
}

impl QueryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: QueryStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn results(mut self, results: Option<Vec<DocumentUpdate>>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn error_message(mut self, message: Option<String>) -> Self {
        self.error_message = Some(message);
        self
    }

    pub fn completed_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = Some(count);
        self
    }

    /// Merges this patch into `record`, leaving unset fields untouched.
    pub fn apply_to(self, record: &mut QueryRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(results) = self.results {
            record.results = results;
        }
        if let Some(message) = self.error_message {
            record.error_message = message;
        }
        if let Some(at) = self.completed_at {
            record.completed_at = at;
        }
        if let Some(count) = self.retry_count {
            record.retry_count = count;
        }
    }
}
