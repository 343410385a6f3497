//! Shared types, error model, and configuration for resolvekit.
//!
//! This crate is the foundation depended on by all other resolvekit crates.
//! It provides:
//! - [`ResolveKitError`], the unified error type
//! - The normalized block model ([`RichDocument`], [`Block`])
//! - The structured output model ([`StructuredComplaintDocument`] and its parts)
//! - The [`DocumentStore`] persistence seam
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod rich;
pub mod store;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClassifierConfig, ClientConfig, EditorConfig, NormalizerConfig, SectionHeadings,
    ServerConfig, StorageConfig, config_dir, config_file_path, expand_home, init_config,
    load_config, load_config_from, validate_config,
};
pub use error::{ResolveKitError, Result};
pub use rich::{Block, ListItem, RichDocument, Span, escape_html, spans_text};
pub use store::DocumentStore;
pub use types::{
    ApiEnvelope, ComplaintMethods, DocumentFragment, DocumentsRequired, EscalationLevels, Level,
    MainHeading, Method, ProcessingStatus, ResolutionTimeline, Step, StructuredComplaintDocument,
    StructuredSections, Timeline,
};
