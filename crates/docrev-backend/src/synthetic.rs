// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synthetic placeholder results for offline development.

use docrev_core::{ChangeType, DocumentMetadata, DocumentUpdate, ModelOutput};

/// Builds a single placeholder result naming the query that produced it.
///
/// Used when `backend.synthetic_fallback` is enabled and the backend is
/// unreachable, so the rest of the pipeline can be exercised without a
/// running service.
pub fn synthetic_results(query_text: &str) -> Vec<DocumentUpdate> {
    let text = format!("Placeholder result for query: {query_text}");
    vec![DocumentUpdate {
        model_output: ModelOutput {
            change_type: ChangeType::Unchanged,
            original: text.clone(),
            suggested: text,
        },
        document_metadata: DocumentMetadata {
            chunk_id: format!("synthetic-{}", uuid::Uuid::new_v4()),
            title: "Synthetic result".to_string(),
            source_url: String::new(),
            file_path: String::new(),
        },
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_result_names_the_query() {
        let updates = synthetic_results("how do I configure logging");
        assert_eq!(updates.len(), 1);
        assert!(
            updates[0]
                .model_output
                .original
                .contains("how do I configure logging")
        );
        assert_eq!(updates[0].model_output.change_type, ChangeType::Unchanged);
    }

    #[test]
    fn synthetic_chunk_ids_are_unique() {
        let a = synthetic_results("q");
        let b = synthetic_results("q");
        assert_ne!(
            a[0].document_metadata.chunk_id,
            b[0].document_metadata.chunk_id
        );
    }
}
