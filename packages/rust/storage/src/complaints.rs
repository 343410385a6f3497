//! Structured complaint documents keyed by entity id.

use chrono::Utc;
use libsql::{Connection, params};
use resolvekit_shared::{DocumentStore, ResolveKitError, Result, StructuredComplaintDocument};
use tracing::{debug, instrument};

use crate::{Storage, content_hash, finish, key_candidates, query_one_string, storage_err};

impl Storage {
    /// Create or replace the document `entity_id` resolves to. An encoded or
    /// mis-cased key updates the existing row instead of adding a second one.
    #[instrument(skip(self, doc))]
    pub async fn upsert_complaint(
        &self,
        entity_id: &str,
        doc: &StructuredComplaintDocument,
    ) -> Result<StructuredComplaintDocument> {
        let (_guard, tx) = self.begin().await?;
        let result = put_complaint(&tx, entity_id, doc).await;
        finish(tx, result).await?;
        Ok(doc.clone())
    }

    /// Latest document for `entity_id`, tolerating encoded and mis-cased keys.
    #[instrument(skip(self))]
    pub async fn get_complaint(&self, entity_id: &str) -> Result<Option<StructuredComplaintDocument>> {
        let Some(key) = resolve_complaint_key(&self.conn, entity_id).await? else {
            return Ok(None);
        };
        let json = query_one_string(
            &self.conn,
            "SELECT document_json FROM structured_complaints WHERE entity_id = ?1",
            params![key.as_str()],
        )
        .await?;
        json.map(|j| decode_document(&j)).transpose()
    }

    /// Remove the document the lookup ladder resolves `entity_id` to.
    #[instrument(skip(self))]
    pub async fn delete_complaint(&self, entity_id: &str) -> Result<bool> {
        let (_guard, tx) = self.begin().await?;
        let result = remove_complaint(&tx, entity_id).await;
        finish(tx, result).await
    }

    /// All stored entity ids, sorted.
    pub async fn list_complaint_keys(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT entity_id FROM structured_complaints ORDER BY entity_id",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut keys = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            keys.push(row.get::<String>(0).map_err(storage_err)?);
        }
        Ok(keys)
    }
}

/// Stored key for `entity_id`: exact, then percent-decoded, then case-insensitive.
async fn resolve_complaint_key(conn: &Connection, entity_id: &str) -> Result<Option<String>> {
    let candidates = key_candidates(entity_id);
    for candidate in &candidates {
        if let Some(key) = query_one_string(
            conn,
            "SELECT entity_id FROM structured_complaints WHERE entity_id = ?1",
            params![candidate.as_str()],
        )
        .await?
        {
            return Ok(Some(key));
        }
    }
    for candidate in &candidates {
        if let Some(key) = query_one_string(
            conn,
            "SELECT entity_id FROM structured_complaints
             WHERE entity_id = ?1 COLLATE NOCASE ORDER BY entity_id LIMIT 1",
            params![candidate.as_str()],
        )
        .await?
        {
            debug!(requested = entity_id, resolved = %key, "case-insensitive key match");
            return Ok(Some(key));
        }
    }
    Ok(None)
}

async fn remove_complaint(conn: &Connection, entity_id: &str) -> Result<bool> {
    let Some(key) = resolve_complaint_key(conn, entity_id).await? else {
        return Ok(false);
    };
    let deleted = conn
        .execute(
            "DELETE FROM structured_complaints WHERE entity_id = ?1",
            params![key.as_str()],
        )
        .await
        .map_err(storage_err)?;
    Ok(deleted > 0)
}

/// Write `doc` under the key `entity_id` resolves to (or `entity_id` itself
/// when nothing matches) unless the stored content hash is identical.
/// Returns whether a write happened.
pub(crate) async fn put_complaint(
    conn: &Connection,
    entity_id: &str,
    doc: &StructuredComplaintDocument,
) -> Result<bool> {
    let json = serde_json::to_string(doc)
        .map_err(|e| ResolveKitError::validation(format!("unserializable document: {e}")))?;
    let hash = content_hash(&json);
    let key = resolve_complaint_key(conn, entity_id)
        .await?
        .unwrap_or_else(|| entity_id.to_string());

    let stored_hash = query_one_string(
        conn,
        "SELECT content_hash FROM structured_complaints WHERE entity_id = ?1",
        params![key.as_str()],
    )
    .await?;
    if stored_hash.as_deref() == Some(hash.as_str()) {
        debug!(entity_id = %key, "document unchanged, skipping write");
        return Ok(false);
    }

    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO structured_complaints (entity_id, document_json, content_hash, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(entity_id) DO UPDATE SET
           document_json = excluded.document_json,
           content_hash = excluded.content_hash,
           updated_at = excluded.updated_at",
        params![key.as_str(), json.as_str(), hash.as_str(), now.as_str()],
    )
    .await
    .map_err(storage_err)?;
    Ok(true)
}

fn decode_document(json: &str) -> Result<StructuredComplaintDocument> {
    serde_json::from_str(json).map_err(|e| ResolveKitError::Storage(format!("corrupt document: {e}")))
}

impl DocumentStore for Storage {
    async fn upsert(
        &self,
        key: &str,
        doc: &StructuredComplaintDocument,
    ) -> Result<StructuredComplaintDocument> {
        self.upsert_complaint(key, doc).await
    }

    async fn get(&self, key: &str) -> Result<Option<StructuredComplaintDocument>> {
        self.get_complaint(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.delete_complaint(key).await
    }
}
