//! SQL migration definitions for the resolvekit database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: structured_complaints, seo_settings",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One structured complaint document per entity
CREATE TABLE IF NOT EXISTS structured_complaints (
    entity_id     TEXT PRIMARY KEY,
    document_json TEXT NOT NULL,
    content_hash  TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_structured_complaints_nocase
    ON structured_complaints(entity_id COLLATE NOCASE);

-- SEO settings, schemaless document per (kind, identifier)
CREATE TABLE IF NOT EXISTS seo_settings (
    id            TEXT PRIMARY KEY,
    kind          TEXT NOT NULL,
    identifier    TEXT NOT NULL,
    path          TEXT,
    document_json TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    UNIQUE(kind, identifier)
);

CREATE INDEX IF NOT EXISTS idx_seo_settings_nocase
    ON seo_settings(kind, identifier COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_seo_settings_path ON seo_settings(path);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
