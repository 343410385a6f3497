//! SEO settings: schemaless JSON documents keyed by `(kind, identifier)`.
//!
//! A parent entity may carry a `tabs` map of per-tab settings. Saving one tab
//! rewrites only that tab's entry and mirrors a fixed allow-list of scalar
//! fields onto the parent's top level.

use chrono::Utc;
use libsql::{Connection, params};
use resolvekit_shared::{ResolveKitError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{Storage, finish, key_candidates, storage_err};

/// Fields copied from a tab save onto the parent's top level.
pub const SEO_MIRRORED_FIELDS: &[&str] = &[
    "title",
    "description",
    "keywords",
    "canonical",
    "robots",
    "lang",
    "publisher",
    "ogTitle",
    "ogDescription",
    "ogImage",
    "twitterCard",
    "structuredData",
];

/// The only kind whose tabs carry their own routable identifiers.
const TAB_SCAN_KIND: &str = "company";

const SELECT_COLUMNS: &str = "SELECT id, kind, identifier, path, document_json, updated_at FROM seo_settings";

/// Body of `POST /seo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoUpsert {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
    /// Routable identifier of the tab itself, stored as `tabs.<tab>.identifier`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SeoUpsert {
    pub fn new(kind: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            identifier: identifier.into(),
            ..Default::default()
        }
    }

    pub fn tab(mut self, tab: impl Into<String>) -> Self {
        self.tab = Some(tab.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.kind.trim().is_empty() {
            return Err(ResolveKitError::validation("seo settings need a type"));
        }
        if self.identifier.trim().is_empty() {
            return Err(ResolveKitError::validation("seo settings need an identifier"));
        }
        if self.tab.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ResolveKitError::validation("tab name must not be empty"));
        }
        Ok(())
    }

    /// Merge this save into an existing settings document.
    pub(crate) fn merge_into(&self, doc: &mut Map<String, Value>) {
        match &self.tab {
            Some(tab) => {
                let mut tabs = take_object(doc, "tabs");
                let mut entry = take_object(&mut tabs, tab);
                for (key, value) in &self.fields {
                    entry.insert(key.clone(), value.clone());
                }
                if let Some(tab_identifier) = &self.tab_identifier {
                    entry.insert("identifier".into(), Value::String(tab_identifier.clone()));
                }
                tabs.insert(tab.clone(), Value::Object(entry));
                doc.insert("tabs".into(), Value::Object(tabs));

                for key in SEO_MIRRORED_FIELDS {
                    if let Some(value) = self.fields.get(*key) {
                        doc.insert((*key).to_string(), value.clone());
                    }
                }
            }
            None => {
                for (key, value) in &self.fields {
                    // The tab map only changes through tab-scoped saves.
                    if key != "tabs" {
                        doc.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }
}

/// Remove and return the object at `map[key]`; anything else becomes empty.
fn take_object(map: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match map.remove(key) {
        Some(Value::Object(object)) => object,
        _ => Map::new(),
    }
}

/// A stored settings row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoSettings {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
    pub path: Option<String>,
    pub document: Map<String, Value>,
    pub updated_at: String,
}

impl SeoSettings {
    /// Settings as one flat object: row metadata, top-level fields, then the
    /// selected tab's fields on top. With a tab selected the `tabs` map is
    /// omitted.
    pub fn flatten(&self, tab: Option<&str>) -> Value {
        let mut out = Map::new();
        out.insert("id".into(), Value::String(self.id.clone()));
        out.insert("type".into(), Value::String(self.kind.clone()));
        out.insert("identifier".into(), Value::String(self.identifier.clone()));
        if let Some(path) = &self.path {
            out.insert("path".into(), Value::String(path.clone()));
        }
        for (key, value) in &self.document {
            out.insert(key.clone(), value.clone());
        }

        if let Some(tab) = tab {
            let tab_fields = self
                .document
                .get("tabs")
                .and_then(|t| t.get(tab))
                .and_then(Value::as_object);
            if let Some(fields) = tab_fields {
                for (key, value) in fields {
                    if key == "identifier" {
                        out.insert("tabIdentifier".into(), value.clone());
                    } else {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
            out.remove("tabs");
            out.insert("tab".into(), Value::String(tab.to_string()));
        }
        Value::Object(out)
    }

    /// Name of the tab whose nested identifier equals `identifier`.
    fn tab_with_identifier(&self, identifier: &str) -> Option<String> {
        self.document
            .get("tabs")?
            .as_object()?
            .iter()
            .find(|(_, tab)| {
                tab.get("identifier")
                    .and_then(Value::as_str)
                    .is_some_and(|id| id.eq_ignore_ascii_case(identifier))
            })
            .map(|(name, _)| name.clone())
    }
}

/// A lookup hit. `tab` is set when the identifier matched a tab's own identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SeoMatch {
    pub settings: SeoSettings,
    pub tab: Option<String>,
}

impl SeoMatch {
    /// Flatten with the requested tab, else the tab the lookup landed on.
    pub fn flatten(&self, requested_tab: Option<&str>) -> Value {
        self.settings
            .flatten(requested_tab.or(self.tab.as_deref()))
    }
}

impl Storage {
    /// Upsert with tab-merge. Last write wins.
    #[instrument(skip(self, upsert), fields(kind = %upsert.kind, identifier = %upsert.identifier, tab = ?upsert.tab))]
    pub async fn upsert_seo(&self, upsert: &SeoUpsert) -> Result<SeoSettings> {
        let (_guard, tx) = self.begin().await?;
        let result = put_seo(&tx, upsert).await;
        let (settings, _) = finish(tx, result).await?;
        Ok(settings)
    }

    /// Find settings by identifier: exact, percent-decoded, case-insensitive,
    /// and for companies a scan of each tab's own identifier.
    #[instrument(skip(self))]
    pub async fn find_seo(&self, kind: &str, identifier: &str) -> Result<Option<SeoMatch>> {
        if let Some(settings) = resolve_seo_row(&self.conn, kind, identifier).await? {
            return Ok(Some(SeoMatch {
                settings,
                tab: None,
            }));
        }
        if kind != TAB_SCAN_KIND {
            return Ok(None);
        }

        let candidates = key_candidates(identifier);
        for settings in query_settings(
            &self.conn,
            &format!("{SELECT_COLUMNS} WHERE kind = ?1 ORDER BY identifier"),
            params![kind],
        )
        .await?
        {
            if let Some(tab) = candidates
                .iter()
                .find_map(|c| settings.tab_with_identifier(c))
            {
                debug!(identifier, parent = %settings.identifier, tab = %tab, "matched tab identifier");
                return Ok(Some(SeoMatch {
                    settings,
                    tab: Some(tab),
                }));
            }
        }
        Ok(None)
    }

    /// Most recently updated settings whose path matches.
    #[instrument(skip(self))]
    pub async fn find_seo_by_path(&self, kind: Option<&str>, path: &str) -> Result<Option<SeoSettings>> {
        for candidate in key_candidates(path) {
            let found = match kind {
                Some(kind) => {
                    query_settings(
                        &self.conn,
                        &format!("{SELECT_COLUMNS} WHERE kind = ?1 AND path = ?2 ORDER BY updated_at DESC LIMIT 1"),
                        params![kind, candidate.as_str()],
                    )
                    .await?
                }
                None => {
                    query_settings(
                        &self.conn,
                        &format!("{SELECT_COLUMNS} WHERE path = ?1 ORDER BY updated_at DESC LIMIT 1"),
                        params![candidate.as_str()],
                    )
                    .await?
                }
            };
            if let Some(settings) = found.into_iter().next() {
                return Ok(Some(settings));
            }
        }
        Ok(None)
    }

    pub async fn get_seo_by_id(&self, id: &str) -> Result<Option<SeoSettings>> {
        let rows = query_settings(
            &self.conn,
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
        )
        .await?;
        Ok(rows.into_iter().next())
    }

    /// Delete settings by row id. Returns whether a row was removed.
    #[instrument(skip(self))]
    pub async fn delete_seo(&self, id: &str) -> Result<bool> {
        self.check_writable()?;
        let _guard = self.write_lock.lock().await;
        let deleted = self
            .conn
            .execute("DELETE FROM seo_settings WHERE id = ?1", params![id])
            .await
            .map_err(storage_err)?;
        Ok(deleted > 0)
    }
}

/// Apply `upsert` inside an open transaction. Returns the resulting settings
/// and whether anything was written.
pub(crate) async fn put_seo(conn: &Connection, upsert: &SeoUpsert) -> Result<(SeoSettings, bool)> {
    upsert.validate()?;
    let existing = resolve_seo_row(conn, &upsert.kind, &upsert.identifier).await?;

    let mut document = existing
        .as_ref()
        .map(|s| s.document.clone())
        .unwrap_or_default();
    upsert.merge_into(&mut document);
    let path = upsert
        .path
        .clone()
        .or_else(|| existing.as_ref().and_then(|s| s.path.clone()));

    if let Some(current) = &existing {
        if current.document == document && current.path == path {
            debug!(id = %current.id, "seo settings unchanged, skipping write");
            return Ok((current.clone(), false));
        }
    }

    let (id, identifier) = match &existing {
        Some(current) => (current.id.clone(), current.identifier.clone()),
        None => (Uuid::now_v7().to_string(), upsert.identifier.clone()),
    };
    let json = serde_json::to_string(&document)
        .map_err(|e| ResolveKitError::validation(format!("unserializable settings: {e}")))?;
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO seo_settings (id, kind, identifier, path, document_json, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
           path = excluded.path,
           document_json = excluded.document_json,
           updated_at = excluded.updated_at",
        params![
            id.as_str(),
            upsert.kind.as_str(),
            identifier.as_str(),
            path.as_deref(),
            json.as_str(),
            now.as_str()
        ],
    )
    .await
    .map_err(storage_err)?;

    Ok((
        SeoSettings {
            id,
            kind: upsert.kind.clone(),
            identifier,
            path,
            document,
            updated_at: now,
        },
        true,
    ))
}

/// Row lookup without the tab scan: exact, decoded, then case-insensitive.
async fn resolve_seo_row(conn: &Connection, kind: &str, identifier: &str) -> Result<Option<SeoSettings>> {
    let candidates = key_candidates(identifier);
    for candidate in &candidates {
        let rows = query_settings(
            conn,
            &format!("{SELECT_COLUMNS} WHERE kind = ?1 AND identifier = ?2"),
            params![kind, candidate.as_str()],
        )
        .await?;
        if let Some(settings) = rows.into_iter().next() {
            return Ok(Some(settings));
        }
    }
    for candidate in &candidates {
        let rows = query_settings(
            conn,
            &format!(
                "{SELECT_COLUMNS} WHERE kind = ?1 AND identifier = ?2 COLLATE NOCASE ORDER BY identifier LIMIT 1"
            ),
            params![kind, candidate.as_str()],
        )
        .await?;
        if let Some(settings) = rows.into_iter().next() {
            return Ok(Some(settings));
        }
    }
    Ok(None)
}

async fn query_settings(
    conn: &Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<SeoSettings>> {
    let mut rows = conn.query(sql, params).await.map_err(storage_err)?;
    let mut results = Vec::new();
    while let Some(row) = rows.next().await.map_err(storage_err)? {
        results.push(row_to_settings(&row)?);
    }
    Ok(results)
}

fn row_to_settings(row: &libsql::Row) -> Result<SeoSettings> {
    let json: String = row.get(4).map_err(storage_err)?;
    let document = match serde_json::from_str::<Value>(&json)
        .map_err(|e| ResolveKitError::Storage(format!("corrupt seo settings: {e}")))?
    {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Ok(SeoSettings {
        id: row.get(0).map_err(storage_err)?,
        kind: row.get(1).map_err(storage_err)?,
        identifier: row.get(2).map_err(storage_err)?,
        path: row.get::<String>(3).ok(),
        document,
        updated_at: row.get(5).map_err(storage_err)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use serde_json::json;

    #[test]
    fn tab_merge_touches_only_its_tab_and_mirrors_allow_list() {
        let mut doc = json!({
            "title": "Old",
            "tabs": {"numbers": {"title": "Numbers", "identifier": "acme-numbers"}}
        })
        .as_object()
        .cloned()
        .expect("object");

        SeoUpsert::new("company", "acme")
            .tab("overview")
            .field("title", "Acme Co")
            .field("heroText", "Welcome")
            .merge_into(&mut doc);

        assert_eq!(doc["title"], "Acme Co");
        assert_eq!(doc["tabs"]["numbers"]["title"], "Numbers");
        assert_eq!(doc["tabs"]["overview"]["title"], "Acme Co");
        assert_eq!(doc["tabs"]["overview"]["heroText"], "Welcome");
        // Not on the allow-list, so not mirrored.
        assert!(doc.get("heroText").is_none());
    }

    #[test]
    fn untabbed_save_cannot_replace_tab_map() {
        let mut doc = json!({"tabs": {"numbers": {"title": "N"}}})
            .as_object()
            .cloned()
            .expect("object");
        SeoUpsert::new("company", "acme")
            .field("tabs", json!({}))
            .field("robots", "index")
            .merge_into(&mut doc);
        assert_eq!(doc["tabs"]["numbers"]["title"], "N");
        assert_eq!(doc["robots"], "index");
    }

    #[test]
    fn flatten_overlays_tab_and_drops_map() {
        let settings = SeoSettings {
            id: "1".into(),
            kind: "company".into(),
            identifier: "acme".into(),
            path: Some("/acme".into()),
            document: json!({
                "title": "Acme",
                "robots": "index",
                "tabs": {"numbers": {"title": "Acme numbers", "identifier": "acme-numbers"}}
            })
            .as_object()
            .cloned()
            .expect("object"),
            updated_at: String::new(),
        };

        let flat = settings.flatten(Some("numbers"));
        assert_eq!(flat["title"], "Acme numbers");
        assert_eq!(flat["robots"], "index");
        assert_eq!(flat["identifier"], "acme");
        assert_eq!(flat["tabIdentifier"], "acme-numbers");
        assert_eq!(flat["tab"], "numbers");
        assert!(flat.get("tabs").is_none());

        let whole = settings.flatten(None);
        assert_eq!(whole["title"], "Acme");
        assert!(whole.get("tabs").is_some());
    }

    #[test]
    fn upsert_body_parses_type_and_extra_fields() {
        let body: SeoUpsert = serde_json::from_value(json!({
            "type": "company",
            "identifier": "acme",
            "tab": "overview",
            "title": "Acme Co",
            "ogImage": "https://x/img.png"
        }))
        .expect("parse");
        assert_eq!(body.kind, "company");
        assert_eq!(body.tab.as_deref(), Some("overview"));
        assert_eq!(body.fields["title"], "Acme Co");
        assert_eq!(body.fields["ogImage"], "https://x/img.png");
        assert!(!body.fields.contains_key("type"));
    }

    #[tokio::test]
    async fn tab_save_keeps_existing_tabs() {
        let storage = test_storage().await;
        storage
            .upsert_seo(&SeoUpsert::new("company", "acme").tab("numbers").field("title", "Numbers"))
            .await
            .expect("numbers");
        storage
            .upsert_seo(&SeoUpsert::new("company", "acme").tab("overview").field("title", "Acme Co"))
            .await
            .expect("overview");

        let found = storage.find_seo("company", "acme").await.expect("find").expect("present");
        let doc = &found.settings.document;
        assert!(doc["tabs"].get("numbers").is_some());
        assert!(doc["tabs"].get("overview").is_some());
        assert_eq!(doc["title"], "Acme Co");
    }

    #[tokio::test]
    async fn second_save_updates_same_row() {
        let storage = test_storage().await;
        let first = storage
            .upsert_seo(&SeoUpsert::new("category", "banks").field("title", "Banks"))
            .await
            .expect("first");
        let second = storage
            .upsert_seo(&SeoUpsert::new("category", "BANKS").field("robots", "noindex"))
            .await
            .expect("second");
        assert_eq!(first.id, second.id);
        assert_eq!(second.identifier, "banks");
        assert_eq!(second.document["title"], "Banks");
        assert_eq!(second.document["robots"], "noindex");
    }

    #[tokio::test]
    async fn lookup_ladder_and_tab_scan() {
        let storage = test_storage().await;
        let mut upsert = SeoUpsert::new("company", "acme bank")
            .tab("numbers")
            .field("title", "Acme numbers");
        upsert.tab_identifier = Some("acme-bank-customer-care".into());
        storage.upsert_seo(&upsert).await.expect("upsert");

        for key in ["acme bank", "acme%20bank", "ACME BANK"] {
            let hit = storage.find_seo("company", key).await.expect("find");
            assert_eq!(hit.map(|h| h.tab), Some(None), "lookup failed for {key}");
        }

        let hit = storage
            .find_seo("company", "acme-bank-customer-care")
            .await
            .expect("find")
            .expect("tab hit");
        assert_eq!(hit.tab.as_deref(), Some("numbers"));
        assert_eq!(hit.flatten(None)["title"], "Acme numbers");

        // Tab scan is company-only.
        storage
            .upsert_seo(&{
                let mut u = SeoUpsert::new("category", "banks").tab("list");
                u.tab_identifier = Some("bank-list".into());
                u
            })
            .await
            .expect("category");
        assert!(storage.find_seo("category", "bank-list").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn find_by_path_and_delete_by_id() {
        let storage = test_storage().await;
        let mut upsert = SeoUpsert::new("page", "about").field("title", "About");
        upsert.path = Some("/about us".into());
        let saved = storage.upsert_seo(&upsert).await.expect("upsert");

        let by_path = storage.find_seo_by_path(None, "/about%20us").await.expect("path");
        assert_eq!(by_path.as_ref().map(|s| s.id.as_str()), Some(saved.id.as_str()));
        assert!(storage.find_seo_by_path(Some("company"), "/about us").await.expect("path").is_none());

        assert!(storage.get_seo_by_id(&saved.id).await.expect("by id").is_some());
        assert!(storage.delete_seo(&saved.id).await.expect("delete"));
        assert!(!storage.delete_seo(&saved.id).await.expect("delete again"));
        assert!(storage.find_seo("page", "about").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn rejects_missing_identifier() {
        let storage = test_storage().await;
        let err = storage
            .upsert_seo(&SeoUpsert::new("company", " "))
            .await
            .expect_err("validation");
        assert!(matches!(err, ResolveKitError::Validation { .. }));
    }
}
