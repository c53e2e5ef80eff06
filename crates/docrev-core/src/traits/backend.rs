// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend adapter trait for the document retrieval service.

use async_trait::async_trait;

use crate::error::DocrevError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::DocumentUpdate;

/// Adapter for the remote document retrieval and revision service.
///
/// Backend adapters handle communication with the retrieval API,
/// fetching proposed document updates for a query and pushing
/// approved updates back for application.
#[async_trait]
pub trait BackendAdapter: ServiceAdapter {
    /// Retrieves proposed document updates relevant to `query_text`.
    async fn retrieve(&self, query_text: &str) -> Result<Vec<DocumentUpdate>, DocrevError>;

    /// Submits approved document updates for application.
    async fn apply(&self, updates: &[DocumentUpdate]) -> Result<(), DocrevError>;
}
