// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Docrev review queue.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Docrev workspace. The backend and
//! storage adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DocrevError;
pub use types::{
    AdapterType, ChangeType, DocumentMetadata, DocumentUpdate, HealthStatus, ModelOutput,
    QueryId, QueryPatch, QueryRecord, QueryStatus,
};

// Re-export all adapter traits at crate root.
pub use traits::{BackendAdapter, ServiceAdapter, StorageAdapter};
