// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Docrev document retrieval service.
//!
//! Implements the [`docrev_core::BackendAdapter`] trait over the
//! backend's two endpoints: document retrieval and applying approved
//! changes. Transient failures are retried once; an optional synthetic
//! fallback produces placeholder results when the backend is down.

pub mod client;
pub mod synthetic;

pub use client::BackendClient;
