//! Normalize → classify → stamp provenance.

use chrono::{DateTime, Utc};
use resolvekit_classifier::{ClassifyContext, Classifier};
use resolvekit_normalizer::Normalizer;
use resolvekit_shared::{
    AppConfig, ClassifierConfig, DocumentFragment, NormalizerConfig, Result, RichDocument,
    StructuredComplaintDocument,
};
use tracing::{debug, instrument};

/// The processing step run on every edit and every server-side save.
#[derive(Debug, Clone)]
pub struct Pipeline {
    normalizer: Normalizer,
    classifier: Classifier,
}

impl Pipeline {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::from_parts(&config.normalizer, &config.classifier)
    }

    pub fn from_parts(normalizer: &NormalizerConfig, classifier: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            normalizer: Normalizer::new(normalizer.clone()),
            classifier: Classifier::new(classifier)?,
        })
    }

    pub fn normalize(&self, raw: &str) -> RichDocument {
        self.normalizer.normalize(raw)
    }

    /// Process raw editor markup into a complete document stamped now.
    pub fn process(&self, raw: &str, ctx: &ClassifyContext) -> StructuredComplaintDocument {
        self.process_at(raw, ctx, Utc::now())
    }

    /// [`Pipeline::process`] with an explicit processing time.
    #[instrument(skip(self, raw, ctx), fields(input_len = raw.len()))]
    pub fn process_at(
        &self,
        raw: &str,
        ctx: &ClassifyContext,
        at: DateTime<Utc>,
    ) -> StructuredComplaintDocument {
        let doc = self.normalizer.normalize(raw);
        self.classify_at(&doc, ctx, at)
    }

    /// Normalize each part separately and classify the concatenation.
    pub fn process_parts(
        &self,
        parts: &[String],
        ctx: &ClassifyContext,
    ) -> StructuredComplaintDocument {
        let blocks = parts
            .iter()
            .flat_map(|raw| self.normalizer.normalize(raw).blocks)
            .collect();
        self.classify_at(&RichDocument::new(blocks), ctx, Utc::now())
    }

    fn classify_at(
        &self,
        doc: &RichDocument,
        ctx: &ClassifyContext,
        at: DateTime<Utc>,
    ) -> StructuredComplaintDocument {
        let classification = self.classifier.classify(doc, ctx);
        let status = classification.status();
        debug!(%status, "document processed");

        StructuredComplaintDocument {
            sections: classification.sections,
            rich_text_content: doc.to_html(),
            processing_status: status,
            last_processed: Some(at),
        }
    }

    /// Complete a posted fragment into the document to store.
    ///
    /// With `richTextContent` the pipeline runs; an explicit main heading and
    /// any provenance in the fragment win over derived values. Without it the
    /// fragment is taken as given.
    pub fn apply_fragment(
        &self,
        fragment: DocumentFragment,
        ctx: &ClassifyContext,
    ) -> StructuredComplaintDocument {
        let Some(raw) = fragment.rich_text_content.as_deref() else {
            return fragment.into_document();
        };

        let mut doc = self.process(raw, ctx);
        if let Some(heading) = fragment.main_heading {
            if !heading.title.trim().is_empty() {
                doc.sections.main_heading = heading;
            }
        }
        if let Some(status) = fragment.processing_status {
            doc.processing_status = status;
        }
        if let Some(at) = fragment.last_processed {
            doc.last_processed = Some(at);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvekit_shared::{MainHeading, ProcessingStatus};

    const SCENARIO: &str = "<h1>XYZ Complaint Process</h1><h2>Method 1: Call Center</h2>\
        <p>Call our 24x7 line for help.</p>\
        <ul><li>Dial 1800-000-000</li><li>Select language</li></ul>";

    fn pipeline() -> Pipeline {
        Pipeline::new(&AppConfig::default()).expect("default config")
    }

    #[test]
    fn process_stamps_status_and_time() {
        let at = Utc::now();
        let doc = pipeline().process_at(SCENARIO, &ClassifyContext::default(), at);
        assert_eq!(doc.processing_status, ProcessingStatus::Processed);
        assert_eq!(doc.last_processed, Some(at));
        assert_eq!(doc.sections.complaint_methods.methods.len(), 1);
        assert!(doc.rich_text_content.starts_with("<h1>XYZ Complaint Process</h1>"));
    }

    #[test]
    fn reprocessing_stored_markup_is_stable() {
        let p = pipeline();
        let ctx = ClassifyContext::for_entity("XYZ");
        let at = Utc::now();
        let first = p.process_at(SCENARIO, &ctx, at);
        let second = p.process_at(&first.rich_text_content, &ctx, at);
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_status() {
        let doc = pipeline().process("<p>Please visit our branch for help.</p>", &ClassifyContext::default());
        assert_eq!(doc.processing_status, ProcessingStatus::Fallback);
    }

    #[test]
    fn empty_markup_is_unstructured() {
        let doc = pipeline().process("", &ClassifyContext::default());
        assert_eq!(doc.processing_status, ProcessingStatus::Unstructured);
        assert_eq!(doc.rich_text_content, "");
    }

    #[test]
    fn parts_are_classified_together() {
        let parts = vec![
            "<h2>Method 1: Call</h2>".to_string(),
            "<ul><li>Dial 1800-000-000</li></ul>".to_string(),
        ];
        let doc = pipeline().process_parts(&parts, &ClassifyContext::default());
        let methods = &doc.sections.complaint_methods.methods;
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].steps.len(), 1);
    }

    #[test]
    fn fragment_heading_and_provenance_win() {
        let at = Utc::now() - chrono::Duration::days(1);
        let fragment = DocumentFragment {
            rich_text_content: Some(SCENARIO.into()),
            main_heading: Some(MainHeading {
                title: "Custom".into(),
                description: "Custom description".into(),
            }),
            processing_status: Some(ProcessingStatus::Pending),
            last_processed: Some(at),
            ..Default::default()
        };
        let doc = pipeline().apply_fragment(fragment, &ClassifyContext::default());
        assert_eq!(doc.sections.main_heading.title, "Custom");
        assert_eq!(doc.processing_status, ProcessingStatus::Pending);
        assert_eq!(doc.last_processed, Some(at));
        assert_eq!(doc.sections.complaint_methods.methods.len(), 1);
    }

    #[test]
    fn blank_fragment_heading_keeps_derived_one() {
        let fragment = DocumentFragment {
            rich_text_content: Some(SCENARIO.into()),
            main_heading: Some(MainHeading::default()),
            ..Default::default()
        };
        let doc = pipeline().apply_fragment(fragment, &ClassifyContext::default());
        assert_eq!(doc.sections.main_heading.title, "XYZ Complaint Process");
    }

    #[test]
    fn fragment_without_markup_is_stored_as_given() {
        let fragment = DocumentFragment {
            note: Some("Note: call before noon".into()),
            ..Default::default()
        };
        let doc = pipeline().apply_fragment(fragment, &ClassifyContext::default());
        assert_eq!(doc.sections.note, "Note: call before noon");
        assert_eq!(doc.processing_status, ProcessingStatus::Pending);
        assert!(doc.last_processed.is_none());
    }
}
