//! The persistence seam shared by the local libSQL store and the HTTP client.

use std::future::Future;

use crate::error::Result;
use crate::types::StructuredComplaintDocument;

/// Create-or-replace / read / delete of structured documents by entity key.
///
/// Reads return `Ok(None)` for unknown keys; "not found" is never an error.
/// Writes are last-write-wins with no optimistic locking.
pub trait DocumentStore {
    /// Replace the document stored under `key` (or create it). Returns what was stored.
    fn upsert(
        &self,
        key: &str,
        doc: &StructuredComplaintDocument,
    ) -> impl Future<Output = Result<StructuredComplaintDocument>> + Send;

    /// Latest document for `key`, if any.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<StructuredComplaintDocument>>> + Send;

    /// Remove the document. Returns whether anything was deleted.
    fn delete(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;
}
