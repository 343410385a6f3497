//! libSQL storage layer (embedded, offline mode).
//!
//! The [`Storage`] struct wraps a libSQL database holding structured
//! complaint documents and SEO settings.
//!
//! **Access rules:**
//! - CLI and server: read-write via [`Storage::open`]
//! - Inspection tools: read-only via [`Storage::open_readonly`]
//!
//! Writes are serialized through one lock and are last-write-wins; there is
//! no optimistic locking.
//! Complaint writes resolve an encoded or mis-cased key to the existing row
//! before writing.

mod bundle;
mod complaints;
mod migrations;
mod seo;

use std::path::Path;

use libsql::{Connection, Database, Transaction, params};
use resolvekit_shared::{ResolveKitError, Result};
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, MutexGuard};

pub use bundle::BundleOutcome;
pub use seo::{SEO_MIRRORED_FIELDS, SeoMatch, SeoSettings, SeoUpsert};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
    write_lock: Mutex<()>,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ResolveKitError::io(parent, e))?;
        }

        let storage = Self::connect(path, false).await?;
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        Self::connect(path, true).await
    }

    async fn connect(path: &Path, readonly: bool) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;
        let conn = db.connect().map_err(storage_err)?;

        Ok(Self {
            db,
            conn,
            readonly,
            write_lock: Mutex::new(()),
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        ResolveKitError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(ResolveKitError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    /// Take the write lock and open a transaction.
    async fn begin(&self) -> Result<(MutexGuard<'_, ()>, Transaction)> {
        self.check_writable()?;
        let guard = self.write_lock.lock().await;
        let tx = self.conn.transaction().await.map_err(storage_err)?;
        Ok((guard, tx))
    }
}

/// Commit on success, roll back on failure.
async fn finish<T>(tx: Transaction, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(storage_err)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "rollback failed");
            }
            Err(e)
        }
    }
}

pub(crate) fn storage_err(e: impl std::fmt::Display) -> ResolveKitError {
    ResolveKitError::Storage(e.to_string())
}

/// SHA-256 of `content`, hex encoded.
pub(crate) fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Key variants tried in order: as given, then percent-decoded.
/// A key that fails to decode is only tried as given.
pub(crate) fn key_candidates(key: &str) -> Vec<String> {
    let mut candidates = vec![key.to_string()];
    if let Ok(decoded) = urlencoding::decode(key) {
        if decoded != key {
            candidates.push(decoded.into_owned());
        }
    }
    candidates
}

/// Fetch the first column of the first row as a string.
pub(crate) async fn query_one_string(
    conn: &Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Option<String>> {
    let mut rows = conn.query(sql, params).await.map_err(storage_err)?;
    match rows.next().await {
        Ok(Some(row)) => Ok(Some(row.get::<String>(0).map_err(storage_err)?)),
        Ok(None) => Ok(None),
        Err(e) => Err(storage_err(e)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    pub async fn test_storage() -> Storage {
        Storage::open(&temp_db_path()).await.expect("open test db")
    }

    pub fn temp_db_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("rk_test_{}.db", Uuid::now_v7()))
    }
}
