// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-owner store for the query record collection.
//!
//! The [`QueueStore`] holds the canonical, insertion-ordered collection
//! of [`QueryRecord`]s behind a mutex, persists the full collection on
//! every mutation, and emits an event on each transition into the
//! `waiting` state for the dispatcher to consume.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use docrev_core::{
    DocrevError, DocumentUpdate, QueryId, QueryPatch, QueryRecord, QueryStatus, StorageAdapter,
};

use crate::persist;

/// Owner of the query record collection and its persistence.
///
/// All mutations go through this store. The mutex is held across the
/// persistence write so saved snapshots land in mutation order.
pub struct QueueStore {
    records: Mutex<Vec<QueryRecord>>,
    storage: Arc<dyn StorageAdapter>,
    waiting_tx: mpsc::UnboundedSender<QueryId>,
}

impl QueueStore {
    /// Creates an empty store and the waiting-event receiver that feeds
    /// the dispatcher.
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<QueryId>) {
        let (waiting_tx, waiting_rx) = mpsc::unbounded_channel();
        let store = Arc::new(Self {
            records: Mutex::new(Vec::new()),
            storage,
            waiting_tx,
        });
        (store, waiting_rx)
    }

    /// Loads the persisted collection, replacing the in-memory one.
    ///
    /// An absent key, an unreadable store, or a value that fails to
    /// parse all leave the queue empty; none of them is fatal. Records
    /// restored in the `waiting` state are re-announced so the
    /// dispatcher picks them up after a restart.
    pub async fn load(&self) {
        let raw = match self.storage.get_state(persist::QUEUE_STATE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no persisted queue found, starting empty");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read persisted queue, starting empty");
                return;
            }
        };

        let loaded = match persist::decode(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to parse persisted queue, starting empty");
                return;
            }
        };

        let mut records = self.records.lock().await;
        *records = loaded;
        debug!(count = records.len(), "queue restored from storage");

        for record in records.iter() {
            if record.status == QueryStatus::Waiting {
                self.announce_waiting(&record.id);
            }
        }
    }

    /// Appends a new record. Fails only if the id already exists.
    pub async fn add(&self, record: QueryRecord) -> Result<(), DocrevError> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(DocrevError::Queue(format!(
                "duplicate query id: {}",
                record.id
            )));
        }

        let id = record.id.clone();
        let is_waiting = record.status == QueryStatus::Waiting;
        records.push(record);
        self.persist(&records).await;

        if is_waiting {
            self.announce_waiting(&id);
        }
        Ok(())
    }

    /// Creates a new `waiting` record for `query_text` and appends it.
    pub async fn submit(&self, query_text: impl Into<String>) -> Result<QueryRecord, DocrevError> {
        let record = QueryRecord::new(query_text);
        self.add(record.clone()).await?;
        Ok(record)
    }

    /// Merges `patch` into the record matching `id`.
    ///
    /// Returns the updated snapshot, or `None` if the id is absent (a
    /// no-op, which is how results of discarded in-flight calls are
    /// dropped).
    pub async fn update(&self, id: &QueryId, patch: QueryPatch) -> Option<QueryRecord> {
        let became_waiting = patch.status == Some(QueryStatus::Waiting);

        let mut records = self.records.lock().await;
        let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
            debug!(%id, "update for unknown record ignored");
            return None;
        };
        patch.apply_to(record);
        let snapshot = record.clone();
        self.persist(&records).await;

        if became_waiting {
            self.announce_waiting(id);
        }
        Some(snapshot)
    }

    /// Atomically claims a `waiting` record for dispatch, marking it
    /// `processing`.
    ///
    /// Returns `None` when the record is absent or no longer `waiting`,
    /// so a record already claimed (or discarded) cannot be dispatched
    /// again for the same waiting transition.
    pub async fn begin_processing(&self, id: &QueryId) -> Option<QueryRecord> {
        let mut records = self.records.lock().await;
        let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
            debug!(%id, "dispatch skipped: record removed");
            return None;
        };
        if record.status != QueryStatus::Waiting {
            debug!(%id, status = %record.status, "dispatch skipped: record not waiting");
            return None;
        }
        record.status = QueryStatus::Processing;
        let snapshot = record.clone();
        self.persist(&records).await;
        Some(snapshot)
    }

    /// Moves an `error` record back to `waiting`, incrementing its
    /// retry count and clearing the error message.
    ///
    /// Returns `None` when the record is absent or not in `error`.
    pub async fn retry(&self, id: &QueryId) -> Option<QueryRecord> {
        let mut records = self.records.lock().await;
        let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
            debug!(%id, "retry for unknown record ignored");
            return None;
        };
        if record.status != QueryStatus::Error {
            debug!(%id, status = %record.status, "retry ignored: record not in error state");
            return None;
        }
        record.status = QueryStatus::Waiting;
        record.error_message = None;
        record.retry_count += 1;
        let snapshot = record.clone();
        self.persist(&records).await;
        drop(records);

        self.announce_waiting(id);
        Some(snapshot)
    }

    /// Deletes the record matching `id`. No-op if absent.
    pub async fn remove(&self, id: &QueryId) -> bool {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| &r.id != id);
        if records.len() == before {
            debug!(%id, "remove for unknown record ignored");
            return false;
        }
        self.persist(&records).await;
        true
    }

    /// Empties the collection.
    pub async fn clear(&self) {
        let mut records = self.records.lock().await;
        records.clear();
        self.persist(&records).await;
    }

    /// Returns the current snapshot in insertion order.
    pub async fn list(&self) -> Vec<QueryRecord> {
        self.records.lock().await.clone()
    }

    /// Returns the record matching `id`, if any.
    pub async fn get(&self, id: &QueryId) -> Option<QueryRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| &r.id == id)
            .cloned()
    }

    /// Resolves a dispatched record to `completed` with its results.
    pub async fn complete(
        &self,
        id: &QueryId,
        results: Vec<DocumentUpdate>,
    ) -> Option<QueryRecord> {
        self.update(
            id,
            QueryPatch::new()
                .status(QueryStatus::Completed)
                .results(Some(results))
                .error_message(None)
                .completed_at(Some(Utc::now())),
        )
        .await
    }

    /// Resolves a dispatched record to `error` with a message, dropping
    /// any results from a previous life.
    pub async fn fail(&self, id: &QueryId, message: String) -> Option<QueryRecord> {
        self.update(
            id,
            QueryPatch::new()
                .status(QueryStatus::Error)
                .results(None)
                .error_message(Some(message)),
        )
        .await
    }

    /// Writes the full collection under the fixed storage key.
    ///
    /// Persistence failures are logged and swallowed; the in-memory
    /// mutation has already happened and stays authoritative.
    async fn persist(&self, records: &[QueryRecord]) {
        let raw = match persist::encode(records) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize queue, skipping persist");
                return;
            }
        };
        if let Err(e) = self
            .storage
            .put_state(persist::QUEUE_STATE_KEY, &raw)
            .await
        {
            warn!(error = %e, "failed to persist queue");
        }
    }

    /// Announces a transition into `waiting`. The send only fails when
    /// the dispatcher is not running, which is fine in tests and during
    /// shutdown.
    fn announce_waiting(&self, id: &QueryId) {
        let _ = self.waiting_tx.send(id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrev_test_utils::{sample_update, MockStorage};

    fn make_store() -> (Arc<QueueStore>, mpsc::UnboundedReceiver<QueryId>, Arc<MockStorage>) {
        let storage = Arc::new(MockStorage::new());
        let (store, rx) = QueueStore::new(storage.clone() as Arc<dyn StorageAdapter>);
        (store, rx, storage)
    }

    #[tokio::test]
    async fn submit_appends_waiting_record_and_announces_it() {
        let (store, mut rx, _) = make_store();

        let record = store.submit("How do I configure X").await.unwrap();
        assert_eq!(record.status, QueryStatus::Waiting);
        assert_eq!(record.retry_count, 0);

        let announced = rx.recv().await.unwrap();
        assert_eq!(announced, record.id);

        let list = store.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].query_text, "How do I configure X");
    }

    #[tokio::test]
    async fn add_duplicate_id_fails() {
        let (store, _rx, _) = make_store();

        let record = QueryRecord::new("dup");
        store.add(record.clone()).await.unwrap();
        let result = store.add(record).await;
        assert!(result.is_err());
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order_minus_removed() {
        let (store, _rx, _) = make_store();

        let a = store.submit("a").await.unwrap();
        let b = store.submit("b").await.unwrap();
        let c = store.submit("c").await.unwrap();

        assert!(store.remove(&b.id).await);

        let texts: Vec<_> = store
            .list()
            .await
            .into_iter()
            .map(|r| r.query_text)
            .collect();
        assert_eq!(texts, vec!["a", "c"]);
        assert!(store.get(&a.id).await.is_some());
        assert!(store.get(&c.id).await.is_some());
    }

    #[tokio::test]
    async fn update_missing_id_is_noop() {
        let (store, _rx, _) = make_store();

        let ghost = QueryId::generate();
        let result = store
            .update(&ghost, QueryPatch::new().status(QueryStatus::Completed))
            .await;
        assert!(result.is_none());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn remove_missing_id_is_noop() {
        let (store, _rx, _) = make_store();
        assert!(!store.remove(&QueryId::generate()).await);
    }

    #[tokio::test]
    async fn mutations_persist_to_storage() {
        let (store, _rx, storage) = make_store();

        store.submit("persist me").await.unwrap();

        let raw = storage
            .get_state(persist::QUEUE_STATE_KEY)
            .await
            .unwrap()
            .unwrap();
        assert!(raw.contains("persist me"));
        assert!(raw.contains(r#""version":1"#));
    }

    #[tokio::test]
    async fn load_restores_persisted_records_field_for_field() {
        let storage = Arc::new(MockStorage::new());
        let (store, _rx) = QueueStore::new(storage.clone() as Arc<dyn StorageAdapter>);

        let submitted = store.submit("survive restart").await.unwrap();
        store.complete(&submitted.id, vec![sample_update("c-1")]).await;
        let expected = store.list().await;

        let (reloaded, _rx2) = QueueStore::new(storage as Arc<dyn StorageAdapter>);
        reloaded.load().await;

        assert_eq!(reloaded.list().await, expected);
    }

    #[tokio::test]
    async fn load_announces_restored_waiting_records() {
        let storage = Arc::new(MockStorage::new());
        let (store, _rx) = QueueStore::new(storage.clone() as Arc<dyn StorageAdapter>);
        let record = store.submit("still waiting").await.unwrap();

        let (reloaded, mut rx2) = QueueStore::new(storage as Arc<dyn StorageAdapter>);
        reloaded.load().await;

        let announced = rx2.recv().await.unwrap();
        assert_eq!(announced, record.id);
    }

    #[tokio::test]
    async fn load_swallows_corrupt_state() {
        let storage = Arc::new(MockStorage::new());
        storage.seed(persist::QUEUE_STATE_KEY, "{{corrupt").await;

        let (store, _rx) = QueueStore::new(storage as Arc<dyn StorageAdapter>);
        store.load().await;
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn load_swallows_unknown_version() {
        let storage = Arc::new(MockStorage::new());
        storage
            .seed(persist::QUEUE_STATE_KEY, r#"{"version":99,"records":[]}"#)
            .await;

        let (store, _rx) = QueueStore::new(storage as Arc<dyn StorageAdapter>);
        store.load().await;
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn persist_failure_is_not_fatal() {
        let storage = Arc::new(MockStorage::failing_writes());
        let (store, _rx) = QueueStore::new(storage as Arc<dyn StorageAdapter>);

        let record = store.submit("kept in memory").await.unwrap();
        assert!(store.get(&record.id).await.is_some());
    }

    #[tokio::test]
    async fn retry_moves_error_record_back_to_waiting() {
        let (store, mut rx, _) = make_store();

        let record = store.submit("will fail").await.unwrap();
        rx.recv().await.unwrap();

        store.begin_processing(&record.id).await.unwrap();
        store.fail(&record.id, "boom".to_string()).await.unwrap();

        let retried = store.retry(&record.id).await.unwrap();
        assert_eq!(retried.status, QueryStatus::Waiting);
        assert_eq!(retried.retry_count, 1);
        assert!(retried.error_message.is_none());

        let announced = rx.recv().await.unwrap();
        assert_eq!(announced, record.id);
    }

    #[tokio::test]
    async fn retry_ignored_unless_in_error_state() {
        let (store, _rx, _) = make_store();

        let record = store.submit("waiting record").await.unwrap();
        assert!(store.retry(&record.id).await.is_none());

        store.begin_processing(&record.id).await.unwrap();
        assert!(store.retry(&record.id).await.is_none());

        store.complete(&record.id, vec![]).await.unwrap();
        assert!(store.retry(&record.id).await.is_none());

        assert_eq!(store.get(&record.id).await.unwrap().retry_count, 0);
    }

    #[tokio::test]
    async fn retry_count_tracks_each_error_waiting_transition() {
        let (store, _rx, _) = make_store();
        let record = store.submit("flaky").await.unwrap();

        for expected in 1..=3 {
            store.begin_processing(&record.id).await.unwrap();
            store.fail(&record.id, "transient".to_string()).await.unwrap();
            let retried = store.retry(&record.id).await.unwrap();
            assert_eq!(retried.retry_count, expected);
        }
    }

    #[tokio::test]
    async fn begin_processing_claims_waiting_record_exactly_once() {
        let (store, _rx, _) = make_store();
        let record = store.submit("claim me").await.unwrap();

        let claimed = store.begin_processing(&record.id).await.unwrap();
        assert_eq!(claimed.status, QueryStatus::Processing);

        // A second claim for the same waiting transition finds the
        // record already processing and backs off.
        assert!(store.begin_processing(&record.id).await.is_none());
    }

    #[tokio::test]
    async fn begin_processing_skips_removed_record() {
        let (store, _rx, _) = make_store();
        let record = store.submit("gone").await.unwrap();
        store.remove(&record.id).await;
        assert!(store.begin_processing(&record.id).await.is_none());
    }

    #[tokio::test]
    async fn complete_sets_results_and_completed_at() {
        let (store, _rx, _) = make_store();
        let record = store.submit("complete me").await.unwrap();
        store.begin_processing(&record.id).await.unwrap();

        let completed = store
            .complete(&record.id, vec![sample_update("c-1")])
            .await
            .unwrap();
        assert_eq!(completed.status, QueryStatus::Completed);
        assert_eq!(completed.results.as_ref().unwrap().len(), 1);
        assert!(completed.completed_at.is_some());
        assert!(completed.error_message.is_none());
    }

    #[tokio::test]
    async fn fail_sets_error_message() {
        let (store, _rx, _) = make_store();
        let record = store.submit("fail me").await.unwrap();
        store.begin_processing(&record.id).await.unwrap();

        let failed = store
            .fail(&record.id, "backend unreachable".to_string())
            .await
            .unwrap();
        assert_eq!(failed.status, QueryStatus::Error);
        assert_eq!(failed.error_message.as_deref(), Some("backend unreachable"));
        assert!(failed.results.is_none());
        assert!(failed.completed_at.is_none());
    }

    #[tokio::test]
    async fn clear_empties_collection_and_storage_value() {
        let (store, _rx, storage) = make_store();
        store.submit("a").await.unwrap();
        store.submit("b").await.unwrap();

        store.clear().await;
        assert!(store.list().await.is_empty());

        let raw = storage
            .get_state(persist::QUEUE_STATE_KEY)
            .await
            .unwrap()
            .unwrap();
        assert!(raw.contains(r#""records":[]"#));
    }
}
