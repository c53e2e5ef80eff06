// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatches waiting records to the backend.
//!
//! The [`Dispatcher`] consumes the store's waiting-event channel. For
//! each announced record it atomically claims the record (only
//! `waiting` records are eligible) and spawns an independent task for
//! the backend call, so a burst of N submissions produces N concurrent
//! outbound calls with no admission control.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use docrev_core::{BackendAdapter, QueryId};

use crate::store::QueueStore;

/// Drives waiting records through the backend call and writes their
/// resolution back into the store.
pub struct Dispatcher {
    store: Arc<QueueStore>,
    backend: Arc<dyn BackendAdapter>,
}

impl Dispatcher {
    pub fn new(store: Arc<QueueStore>, backend: Arc<dyn BackendAdapter>) -> Self {
        Self { store, backend }
    }

    /// Spawns the dispatch loop on the current runtime.
    pub fn spawn(self, waiting_rx: mpsc::UnboundedReceiver<QueryId>) -> JoinHandle<()> {
        tokio::spawn(self.run(waiting_rx))
    }

    /// Runs until the store side of the waiting-event channel is dropped.
    pub async fn run(self, mut waiting_rx: mpsc::UnboundedReceiver<QueryId>) {
        info!("dispatcher started");
        while let Some(id) = waiting_rx.recv().await {
            self.dispatch(id).await;
        }
        debug!("waiting-event channel closed, dispatcher stopping");
    }

    /// Claims the record and launches its backend call.
    ///
    /// The claim happens inline in the dispatch loop, so two events for
    /// the same record are resolved sequentially: the second finds the
    /// record already `processing` and is dropped. Each backend call
    /// runs in its own task; one hung or failed call never delays the
    /// others.
    async fn dispatch(&self, id: QueryId) {
        let Some(record) = self.store.begin_processing(&id).await else {
            return;
        };
        debug!(%id, "record dispatched");

        let store = Arc::clone(&self.store);
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.retrieve(&record.query_text).await {
                Ok(results) => {
                    debug!(%id, count = results.len(), "retrieval succeeded");
                    if store.complete(&id, results).await.is_none() {
                        debug!(%id, "record discarded during flight, result dropped");
                    }
                }
                Err(e) => {
                    debug!(%id, error = %e, "retrieval failed");
                    if store.fail(&id, e.to_string()).await.is_none() {
                        debug!(%id, "record discarded during flight, error dropped");
                    }
                }
            }
        });
    }
}
