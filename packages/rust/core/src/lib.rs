//! Core orchestration for resolvekit.
//!
//! Ties the normalizer and classifier into one processing step
//! ([`Pipeline`]), drives batch imports into local storage, and models the
//! debounced edit loop of an editing client ([`EditSession`]).

pub mod import;
pub mod pipeline;
pub mod session;

pub use import::{ImportSummary, ProgressReporter, SilentProgress, import_files};
pub use pipeline::Pipeline;
pub use session::{ContentSource, EditKind, EditSession};
