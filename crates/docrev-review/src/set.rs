// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The approved-change set.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use docrev_core::{BackendAdapter, DocrevError, DocumentUpdate};

/// Accumulates approved document updates and applies them as one batch.
///
/// Entries are keyed by chunk id and kept in approval order. The set is
/// cleared only by an explicit `clear` or a successful `apply`; a failed
/// apply leaves every entry in place.
pub struct ReviewSet {
    approved: Mutex<Vec<DocumentUpdate>>,
    backend: Arc<dyn BackendAdapter>,
}

impl ReviewSet {
    pub fn new(backend: Arc<dyn BackendAdapter>) -> Self {
        Self {
            approved: Mutex::new(Vec::new()),
            backend,
        }
    }

    /// Adds `update` to the set.
    ///
    /// Returns `false` when the chunk is already approved; the existing
    /// entry is kept unchanged.
    pub async fn approve(&self, update: DocumentUpdate) -> bool {
        let mut approved = self.approved.lock().await;
        let chunk_id = &update.document_metadata.chunk_id;
        if approved
            .iter()
            .any(|u| &u.document_metadata.chunk_id == chunk_id)
        {
            debug!(chunk_id = %chunk_id, "chunk already approved, ignoring");
            return false;
        }
        debug!(chunk_id = %chunk_id, "chunk approved");
        approved.push(update);
        true
    }

    /// Removes the entry for `chunk_id`. No-op if absent.
    pub async fn reject(&self, chunk_id: &str) -> bool {
        let mut approved = self.approved.lock().await;
        let before = approved.len();
        approved.retain(|u| u.document_metadata.chunk_id != chunk_id);
        let removed = approved.len() != before;
        if removed {
            debug!(chunk_id = %chunk_id, "approval withdrawn");
        }
        removed
    }

    /// Replaces the suggested text of an approved entry.
    ///
    /// Returns the amended entry, or `None` if the chunk is not in the
    /// set. The original text and metadata are untouched.
    pub async fn amend(&self, chunk_id: &str, suggested: impl Into<String>) -> Option<DocumentUpdate> {
        let mut approved = self.approved.lock().await;
        let entry = approved
            .iter_mut()
            .find(|u| u.document_metadata.chunk_id == chunk_id)?;
        entry.model_output.suggested = suggested.into();
        debug!(chunk_id = %chunk_id, "approved suggestion amended");
        Some(entry.clone())
    }

    /// Returns the approved entries in approval order.
    pub async fn list(&self) -> Vec<DocumentUpdate> {
        self.approved.lock().await.clone()
    }

    /// Number of approved entries.
    pub async fn len(&self) -> usize {
        self.approved.lock().await.len()
    }

    /// True when nothing is approved.
    pub async fn is_empty(&self) -> bool {
        self.approved.lock().await.is_empty()
    }

    /// Empties the set without applying anything.
    pub async fn clear(&self) {
        self.approved.lock().await.clear();
    }

    /// Sends the full approved batch to the backend.
    ///
    /// On success the set is cleared and the applied count returned. On
    /// failure the error propagates and the set keeps all entries so
    /// the user can retry. An empty set applies trivially without a
    /// backend call.
    pub async fn apply(&self) -> Result<usize, DocrevError> {
        let mut approved = self.approved.lock().await;
        if approved.is_empty() {
            debug!("apply skipped: nothing approved");
            return Ok(0);
        }

        self.backend.apply(&approved).await?;
        let count = approved.len();
        approved.clear();
        info!(count, "approved changes applied");
        Ok(count)
    }
}
