// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Docrev integration tests.
//!
//! Provides in-memory mock implementations of the backend and storage
//! adapter traits, enabling fast, CI-runnable tests without a running
//! backend service or an on-disk database.

pub mod mock_backend;
pub mod mock_storage;

pub use mock_backend::{sample_update, MockBackend};
pub use mock_storage::MockStorage;
