//! Rendering of stored complaint documents.
//!
//! A document renders as a grouped view when any structured section holds
//! content, else as its raw `richTextContent` (normalizer output, emitted
//! verbatim), else as an explicit empty state. Editable mode mounts the same
//! markup in a `contenteditable` surface whose content is fed back through
//! the normalizer and classifier on save.

mod view;

use resolvekit_shared::{ResolveKitError, Result, StructuredComplaintDocument};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Markup shown when a document has neither structure nor raw content.
pub const EMPTY_STATE_HTML: &str =
    "<div class=\"complaint-empty\"><p>No complaint information is available yet.</p></div>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    ReadOnly,
    Editable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Html,
    Markdown,
}

/// Which branch of the fallback chain produced the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Structured,
    Raw,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub kind: ViewKind,
    pub body: String,
}

/// Render `doc` in the given mode and format.
///
/// Markdown is only available read-only; the editing surface is HTML.
#[instrument(skip(doc))]
pub fn render(
    doc: &StructuredComplaintDocument,
    mode: RenderMode,
    format: RenderFormat,
) -> Result<Rendered> {
    if mode == RenderMode::Editable && format == RenderFormat::Markdown {
        return Err(ResolveKitError::validation(
            "editable mode renders HTML only",
        ));
    }

    let (kind, html) = match mode {
        RenderMode::ReadOnly => read_only_html(doc),
        RenderMode::Editable => editable_html(doc),
    };
    debug!(?kind, len = html.len(), "rendered document");

    let body = match format {
        RenderFormat::Html => html,
        RenderFormat::Markdown => to_markdown(&html)?,
    };
    Ok(Rendered { kind, body })
}

fn read_only_html(doc: &StructuredComplaintDocument) -> (ViewKind, String) {
    if doc.sections.has_structured_content() {
        (ViewKind::Structured, view::grouped_view(&doc.sections))
    } else if !doc.rich_text_content.trim().is_empty() {
        (ViewKind::Raw, doc.rich_text_content.clone())
    } else {
        (ViewKind::Empty, EMPTY_STATE_HTML.to_string())
    }
}

/// Raw content is preferred for editing since it is what the author typed.
fn editable_html(doc: &StructuredComplaintDocument) -> (ViewKind, String) {
    let (kind, inner) = if !doc.rich_text_content.trim().is_empty() {
        (ViewKind::Raw, doc.rich_text_content.clone())
    } else if doc.sections.has_structured_content() {
        (ViewKind::Structured, view::grouped_view(&doc.sections))
    } else {
        (ViewKind::Empty, "<p><br></p>".to_string())
    };
    (
        kind,
        format!("<div class=\"complaint-editor\" contenteditable=\"true\">{inner}</div>"),
    )
}

fn to_markdown(html: &str) -> Result<String> {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "iframe", "noscript", "svg"])
        .build();

    let markdown = converter
        .convert(html)
        .map_err(|e| ResolveKitError::Conversion(format!("htmd conversion failed: {e}")))?;
    Ok(markdown.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvekit_shared::{Method, ProcessingStatus};

    fn structured() -> StructuredComplaintDocument {
        let mut doc = StructuredComplaintDocument {
            rich_text_content: "<h2>Method 1: Call</h2>".into(),
            processing_status: ProcessingStatus::Processed,
            ..Default::default()
        };
        doc.sections.main_heading.title = "XYZ Complaint Process".into();
        doc.sections.complaint_methods.heading = "Complaint Methods".into();
        doc.sections.complaint_methods.methods = vec![Method {
            method_number: 1,
            title: "Method 1: Call".into(),
            description: "Call our 24x7 line for help.".into(),
            ..Default::default()
        }];
        doc
    }

    #[test]
    fn structured_document_renders_grouped_view() {
        let out = render(&structured(), RenderMode::ReadOnly, RenderFormat::Html).unwrap();
        assert_eq!(out.kind, ViewKind::Structured);
        assert!(out.body.contains("<h1>XYZ Complaint Process</h1>"));
        assert!(out.body.contains("complaint-methods"));
    }

    #[test]
    fn unstructured_document_renders_raw_markup_verbatim() {
        let doc = StructuredComplaintDocument {
            rich_text_content: "<p>Visit <strong>any</strong> branch.</p>".into(),
            ..Default::default()
        };
        let out = render(&doc, RenderMode::ReadOnly, RenderFormat::Html).unwrap();
        assert_eq!(out.kind, ViewKind::Raw);
        assert_eq!(out.body, "<p>Visit <strong>any</strong> branch.</p>");
    }

    #[test]
    fn empty_document_renders_empty_state() {
        let out = render(
            &StructuredComplaintDocument::default(),
            RenderMode::ReadOnly,
            RenderFormat::Html,
        )
        .unwrap();
        assert_eq!(out.kind, ViewKind::Empty);
        assert_eq!(out.body, EMPTY_STATE_HTML);
    }

    #[test]
    fn editable_wraps_raw_content() {
        let out = render(&structured(), RenderMode::Editable, RenderFormat::Html).unwrap();
        assert_eq!(out.kind, ViewKind::Raw);
        assert_eq!(
            out.body,
            "<div class=\"complaint-editor\" contenteditable=\"true\"><h2>Method 1: Call</h2></div>"
        );
    }

    #[test]
    fn editable_falls_back_to_grouped_view() {
        let mut doc = structured();
        doc.rich_text_content.clear();
        let out = render(&doc, RenderMode::Editable, RenderFormat::Html).unwrap();
        assert_eq!(out.kind, ViewKind::Structured);
        assert!(out.body.starts_with("<div class=\"complaint-editor\" contenteditable=\"true\">"));
        assert!(out.body.contains("complaint-methods"));
    }

    #[test]
    fn markdown_output() {
        let out = render(&structured(), RenderMode::ReadOnly, RenderFormat::Markdown).unwrap();
        assert!(out.body.contains("# XYZ Complaint Process"));
        assert!(out.body.contains("## Complaint Methods"));
        assert!(out.body.contains("Call our 24x7 line for help."));
    }

    #[test]
    fn editable_markdown_is_rejected() {
        let err = render(&structured(), RenderMode::Editable, RenderFormat::Markdown).unwrap_err();
        assert!(matches!(err, ResolveKitError::Validation { .. }));
    }
}
