//! Batch import: read markup files, process them as one document, store it.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use resolvekit_classifier::ClassifyContext;
use resolvekit_shared::{ProcessingStatus, ResolveKitError, Result, StructuredComplaintDocument};
use resolvekit_storage::Storage;
use tracing::{info, instrument};

use crate::pipeline::Pipeline;

/// Result of [`import_files`].
#[derive(Debug)]
pub struct ImportSummary {
    pub entity_id: String,
    pub files: usize,
    pub status: ProcessingStatus,
    pub methods: usize,
    pub levels: usize,
    pub documents: usize,
    pub elapsed: Duration,
}

/// Progress callback for reporting import status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each file is read.
    fn file_read(&self, path: &Path, current: usize, total: usize);
    /// Called when the import completes.
    fn done(&self, summary: &ImportSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_read(&self, _path: &Path, _current: usize, _total: usize) {}
    fn done(&self, _summary: &ImportSummary) {}
}

/// Read `files` in order, process their concatenated content and store the
/// result under `entity_id`.
#[instrument(skip(pipeline, storage, files, ctx, progress), fields(files = files.len()))]
pub async fn import_files(
    pipeline: &Pipeline,
    storage: &Storage,
    entity_id: &str,
    files: &[PathBuf],
    ctx: &ClassifyContext,
    progress: &dyn ProgressReporter,
) -> Result<ImportSummary> {
    if files.is_empty() {
        return Err(ResolveKitError::validation("no input files given"));
    }
    let start = Instant::now();

    progress.phase("reading");
    let mut parts = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ResolveKitError::io(path, e))?;
        parts.push(raw);
        progress.file_read(path, i + 1, files.len());
    }

    progress.phase("processing");
    let document = pipeline.process_parts(&parts, ctx);

    progress.phase("storing");
    storage.upsert_complaint(entity_id, &document).await?;

    let summary = summarize(entity_id, files.len(), &document, start.elapsed());
    info!(
        entity_id,
        status = %summary.status,
        methods = summary.methods,
        levels = summary.levels,
        documents = summary.documents,
        "import complete"
    );
    progress.done(&summary);
    Ok(summary)
}

fn summarize(
    entity_id: &str,
    files: usize,
    document: &StructuredComplaintDocument,
    elapsed: Duration,
) -> ImportSummary {
    ImportSummary {
        entity_id: entity_id.to_string(),
        files,
        status: document.processing_status,
        methods: document.sections.complaint_methods.methods.len(),
        levels: document.sections.escalation_levels.levels.len(),
        documents: document.sections.documents_required.documents.len(),
        elapsed,
    }
}
