// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query queue store and dispatcher.
//!
//! The [`QueueStore`] owns the ordered collection of query records and
//! persists it through a [`docrev_core::StorageAdapter`] on every
//! mutation. The [`Dispatcher`] consumes the store's waiting-event
//! channel and drives each record through its backend call.

pub mod dispatcher;
pub mod persist;
pub mod store;

pub use dispatcher::Dispatcher;
pub use store::QueueStore;
