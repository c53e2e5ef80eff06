// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Docrev review queue.

use thiserror::Error;

/// The primary error type used across all Docrev adapter traits and core operations.
#[derive(Debug, Error)]
pub enum DocrevError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, checkpointing).
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Backend service errors (HTTP failure, unexpected status, body decode).
    #[error("backend error: {message}")]
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Queue state errors (unknown record, invalid transition).
    #[error("queue error: {0}")]
    Queue(String),

    /// JSON serialization or deserialization failure.
    #[error("serialization error: {source}")]
    Serialization { source: serde_json::Error },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
