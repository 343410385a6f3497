//! Structured complaint document model.
//!
//! JSON field names are camelCase, matching the persisted document shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sub-entities
// ---------------------------------------------------------------------------

/// `mainHeading`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MainHeading {
    pub title: String,
    pub description: String,
}

/// A single step inside a [`Method`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Step {
    /// 1-based position within the method.
    pub step_number: u32,
    pub title: String,
    pub description: String,
    pub details: Vec<String>,
}

/// One way of filing a complaint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Method {
    /// 1-based extraction order, never parsed from the title.
    pub method_number: u32,
    pub title: String,
    pub description: String,
    pub steps: Vec<Step>,
    pub contact_info: String,
}

/// One rung of the escalation ladder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Level {
    /// 1-based extraction order, never parsed from the title.
    pub level_number: u32,
    pub title: String,
    pub description: String,
    pub contact_details: String,
}

/// A resolution timeline entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timeline {
    /// The source text that mentioned the timeline.
    pub level: String,
    pub days: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplaintMethods {
    pub heading: String,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EscalationLevels {
    pub heading: String,
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentsRequired {
    pub heading: String,
    /// Exact-text de-duplicated, insertion order.
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolutionTimeline {
    pub heading: String,
    pub timelines: Vec<Timeline>,
}

/// Everything the classifier produces. A pure function of the input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredSections {
    pub main_heading: MainHeading,
    pub complaint_methods: ComplaintMethods,
    pub escalation_levels: EscalationLevels,
    pub documents_required: DocumentsRequired,
    pub resolution_timeline: ResolutionTimeline,
    /// Last matching block wins.
    pub note: String,
}

impl StructuredSections {
    /// True when any section beyond the main heading holds content.
    pub fn has_structured_content(&self) -> bool {
        !self.complaint_methods.methods.is_empty()
            || !self.escalation_levels.levels.is_empty()
            || !self.documents_required.documents.is_empty()
            || !self.resolution_timeline.timelines.is_empty()
            || !self.note.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Persisted document
// ---------------------------------------------------------------------------

/// How a stored document came to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// Saved without running the classifier.
    #[default]
    Pending,
    /// At least one section was extracted.
    Processed,
    /// Nothing matched; a general method was synthesized from prose.
    Fallback,
    /// Nothing matched and there was no prose to fall back on.
    Unstructured,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Fallback => "fallback",
            Self::Unstructured => "unstructured",
        };
        f.write_str(s)
    }
}

/// The canonical persisted entity, one per entity key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredComplaintDocument {
    #[serde(flatten)]
    pub sections: StructuredSections,
    /// Normalized markup of the latest edit, kept verbatim.
    pub rich_text_content: String,
    pub processing_status: ProcessingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_processed: Option<DateTime<Utc>>,
}

/// A partial document as posted by an editor client.
///
/// Every field is optional; the server decides how to complete it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_heading: Option<MainHeading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complaint_methods: Option<ComplaintMethods>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_levels: Option<EscalationLevels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_required: Option<DocumentsRequired>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_timeline: Option<ResolutionTimeline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_status: Option<ProcessingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_processed: Option<DateTime<Utc>>,
}

impl DocumentFragment {
    /// Build a full document from the fragment alone, defaulting missing parts.
    pub fn into_document(self) -> StructuredComplaintDocument {
        StructuredComplaintDocument {
            sections: StructuredSections {
                main_heading: self.main_heading.unwrap_or_default(),
                complaint_methods: self.complaint_methods.unwrap_or_default(),
                escalation_levels: self.escalation_levels.unwrap_or_default(),
                documents_required: self.documents_required.unwrap_or_default(),
                resolution_timeline: self.resolution_timeline.unwrap_or_default(),
                note: self.note.unwrap_or_default(),
            },
            rich_text_content: self.rich_text_content.unwrap_or_default(),
            processing_status: self.processing_status.unwrap_or_default(),
            last_processed: self.last_processed,
        }
    }
}

impl From<&StructuredComplaintDocument> for DocumentFragment {
    fn from(doc: &StructuredComplaintDocument) -> Self {
        Self {
            rich_text_content: Some(doc.rich_text_content.clone()),
            main_heading: Some(doc.sections.main_heading.clone()),
            processing_status: Some(doc.processing_status),
            last_processed: doc.last_processed,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// `{success, data}` wrapper used by every HTTP endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StructuredComplaintDocument {
        StructuredComplaintDocument {
            sections: StructuredSections {
                main_heading: MainHeading {
                    title: "XYZ Complaint Process".into(),
                    description: "guide".into(),
                },
                complaint_methods: ComplaintMethods {
                    heading: "Complaint Methods".into(),
                    methods: vec![Method {
                        method_number: 1,
                        title: "Method 1: Call Center".into(),
                        ..Default::default()
                    }],
                },
                ..Default::default()
            },
            rich_text_content: "<h1>XYZ Complaint Process</h1>".into(),
            processing_status: ProcessingStatus::Processed,
            last_processed: None,
        }
    }

    #[test]
    fn document_serializes_camel_case_flat() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["mainHeading"]["title"], "XYZ Complaint Process");
        assert_eq!(json["complaintMethods"]["methods"][0]["methodNumber"], 1);
        assert_eq!(json["processingStatus"], "processed");
        assert!(json.get("sections").is_none());
        assert!(json.get("lastProcessed").is_none());
    }

    #[test]
    fn fragment_fills_missing_sections_with_defaults() {
        let fragment: DocumentFragment = serde_json::from_str(
            r#"{"richTextContent":"<p>x</p>","mainHeading":{"title":"T","description":"D"}}"#,
        )
        .expect("parse fragment");
        let doc = fragment.into_document();
        assert_eq!(doc.rich_text_content, "<p>x</p>");
        assert_eq!(doc.sections.main_heading.title, "T");
        assert!(doc.sections.complaint_methods.methods.is_empty());
        assert_eq!(doc.processing_status, ProcessingStatus::Pending);
    }

    #[test]
    fn structured_content_ignores_main_heading() {
        let mut sections = StructuredSections::default();
        sections.main_heading.title = "Only a title".into();
        assert!(!sections.has_structured_content());
        sections.note = "Keep receipts".into();
        assert!(sections.has_structured_content());
    }

    #[test]
    fn envelope_null_data_parses() {
        let env: ApiEnvelope<StructuredComplaintDocument> =
            serde_json::from_str(r#"{"success":true,"data":null}"#).expect("parse");
        assert!(env.success);
        assert!(env.data.is_none());
    }
}
