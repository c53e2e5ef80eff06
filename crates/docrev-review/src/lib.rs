// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Approved-change collection and apply flow.
//!
//! The [`ReviewSet`] accumulates document updates the user has approved,
//! keyed by chunk id, and pushes the full batch to the backend on
//! `apply`. A failed apply keeps the set intact so the user can retry.

pub mod set;

pub use set::ReviewSet;
