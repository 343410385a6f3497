//! Debounced edit loop of an editing client.
//!
//! Edits arm a deadline; once it passes the current editor content is
//! classified once. The content is pulled through a [`ContentSource`]
//! handed in per call, so the session never holds a handle to the editor.
//! Saving is one store call per explicit action; a failed save keeps the
//! local document and reports a retryable error.

use std::sync::Arc;
use std::time::Duration;

use resolvekit_classifier::ClassifyContext;
use resolvekit_shared::{DocumentStore, EditorConfig, Result, StructuredComplaintDocument};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument, warn};

use crate::pipeline::Pipeline;

/// What kind of edit just happened; pastes settle faster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Keystroke,
    Paste,
}

/// Query for the editor's current markup.
pub trait ContentSource {
    fn current_content(&self) -> String;
}

impl<F> ContentSource for F
where
    F: Fn() -> String,
{
    fn current_content(&self) -> String {
        self()
    }
}

pub struct EditSession<S> {
    entity_id: String,
    ctx: ClassifyContext,
    pipeline: Arc<Pipeline>,
    store: S,
    keystroke_delay: Duration,
    paste_delay: Duration,
    deadline: Option<Instant>,
    document: StructuredComplaintDocument,
    classifications: u64,
}

impl<S: DocumentStore> EditSession<S> {
    pub fn new(
        entity_id: impl Into<String>,
        ctx: ClassifyContext,
        pipeline: Arc<Pipeline>,
        store: S,
        config: &EditorConfig,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            ctx,
            pipeline,
            store,
            keystroke_delay: Duration::from_millis(config.keystroke_debounce_ms),
            paste_delay: Duration::from_millis(config.paste_debounce_ms),
            deadline: None,
            document: StructuredComplaintDocument::default(),
            classifications: 0,
        }
    }

    /// Load the stored document, if any, as the starting point.
    pub async fn load(&mut self) -> Result<bool> {
        match self.store.get(&self.entity_id).await? {
            Some(doc) => {
                self.document = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// (Re)arm the deadline. The latest edit decides the delay.
    pub fn record_edit(&mut self, kind: EditKind) {
        let delay = match kind {
            EditKind::Keystroke => self.keystroke_delay,
            EditKind::Paste => self.paste_delay,
        };
        self.deadline = Some(Instant::now() + delay);
    }

    /// An edit is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Wait for the pending deadline, then classify once. Returns `false`
    /// when nothing was pending.
    pub async fn settle(&mut self, source: &impl ContentSource) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        sleep_until(deadline).await;
        self.deadline = None;
        self.classify(source);
        true
    }

    /// Classify immediately and persist. On failure the local document is
    /// kept as classified; the error is returned for the caller to show.
    #[instrument(skip(self, source), fields(entity_id = %self.entity_id))]
    pub async fn save(&mut self, source: &impl ContentSource) -> Result<StructuredComplaintDocument> {
        self.deadline = None;
        self.classify(source);
        match self.store.upsert(&self.entity_id, &self.document).await {
            Ok(stored) => {
                debug!(status = %stored.processing_status, "saved");
                Ok(stored)
            }
            Err(e) => {
                warn!(error = %e, retryable = e.is_retryable(), "save failed, keeping local document");
                Err(e)
            }
        }
    }

    /// Last classified (or loaded) document.
    pub fn document(&self) -> &StructuredComplaintDocument {
        &self.document
    }

    /// How many times the classifier has run in this session.
    pub fn classifications(&self) -> u64 {
        self.classifications
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn classify(&mut self, source: &impl ContentSource) {
        let raw = source.current_content();
        self.document = self.pipeline.process(&raw, &self.ctx);
        self.classifications += 1;
    }
}
