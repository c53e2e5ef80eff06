// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned serialization envelope for the persisted queue.

use serde::{Deserialize, Serialize};

use docrev_core::{DocrevError, QueryRecord};

/// Fixed storage key the queue collection is persisted under.
pub const QUEUE_STATE_KEY: &str = "query_queue";

/// Current envelope format version.
pub const QUEUE_FORMAT_VERSION: u32 = 1;

/// On-disk shape of the persisted queue.
///
/// The version field lets future format changes migrate old queues
/// instead of silently misparsing them.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueueEnvelope {
    pub version: u32,
    pub records: Vec<QueryRecord>,
}

/// Serializes the record collection into a versioned envelope.
pub fn encode(records: &[QueryRecord]) -> Result<String, DocrevError> {
    let envelope = QueueEnvelope {
        version: QUEUE_FORMAT_VERSION,
        records: records.to_vec(),
    };
    serde_json::to_string(&envelope).map_err(|e| DocrevError::Serialization { source: e })
}

/// Deserializes a persisted envelope, rejecting unknown versions.
pub fn decode(raw: &str) -> Result<Vec<QueryRecord>, DocrevError> {
    let envelope: QueueEnvelope =
        serde_json::from_str(raw).map_err(|e| DocrevError::Serialization { source: e })?;
    if envelope.version != QUEUE_FORMAT_VERSION {
        return Err(DocrevError::Queue(format!(
            "unsupported queue format version {}",
            envelope.version
        )));
    }
    Ok(envelope.records)
}
