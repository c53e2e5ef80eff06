// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Docrev service seams.
//!
//! All adapters extend the [`ServiceAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod backend;
pub mod storage;

// Re-export all traits at the traits module level for convenience.
pub use adapter::ServiceAdapter;
pub use backend::BackendAdapter;
pub use storage::StorageAdapter;
