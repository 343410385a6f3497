//! Shared handler state.

use resolvekit_core::Pipeline;
use resolvekit_shared::{AppConfig, Result, expand_home};
use resolvekit_storage::Storage;

pub struct AppState {
    pub storage: Storage,
    pub pipeline: Pipeline,
}

impl AppState {
    /// Open the configured database and build the processing pipeline.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let db_path = expand_home(&config.storage.db_path)?;
        tracing::info!(path = %db_path.display(), "opening database");

        Ok(Self {
            storage: Storage::open(&db_path).await?,
            pipeline: Pipeline::new(config)?,
        })
    }
}
