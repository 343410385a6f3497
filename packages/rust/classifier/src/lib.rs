//! Heuristic classification of a normalized `RichDocument` into structured
//! complaint sections.
//!
//! The classifier is a pure function of its input and configuration:
//! independent scans run over the same element sequence, so one block may
//! contribute to several sections. Classification never fails; an absent
//! category is an empty collection.

mod element;
mod rules;
mod scans;

use resolvekit_shared::{
    ClassifierConfig, ComplaintMethods, DocumentsRequired, EscalationLevels, MainHeading, Method,
    ProcessingStatus, ResolutionTimeline, Result, RichDocument, SectionHeadings,
    StructuredSections,
};
use tracing::{debug, instrument};

use element::{Element, elements};
use rules::{Rules, contact_details};
use scans::{DocumentScan, LevelScan, MainHeadingScan, MethodScan, NoteScan, TimelineScan};

/// Caller-supplied facts the markup cannot tell us.
#[derive(Debug, Clone, Default)]
pub struct ClassifyContext {
    /// Display name of the subject entity, used in `mainHeading.description`.
    pub entity_name: Option<String>,
}

impl ClassifyContext {
    pub fn for_entity(name: impl Into<String>) -> Self {
        Self {
            entity_name: Some(name.into()),
        }
    }
}

/// Result of one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub sections: StructuredSections,
    /// The only method was synthesized from prose.
    pub fallback_used: bool,
}

impl Classification {
    pub fn status(&self) -> ProcessingStatus {
        if self.fallback_used {
            ProcessingStatus::Fallback
        } else if self.sections.has_structured_content() {
            ProcessingStatus::Processed
        } else {
            ProcessingStatus::Unstructured
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Rules,
    headings: SectionHeadings,
    main_description_template: String,
    fallback_method_title: String,
}

impl Classifier {
    /// Compile keyword tables from configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            rules: Rules::from_config(config)?,
            headings: config.headings.clone(),
            main_description_template: config.main_description_template.clone(),
            fallback_method_title: config.fallback_method_title.clone(),
        })
    }

    #[instrument(skip_all, fields(blocks = doc.blocks.len()))]
    pub fn classify(&self, doc: &RichDocument, ctx: &ClassifyContext) -> Classification {
        let elements = elements(doc);

        let title = elements
            .iter()
            .fold(MainHeadingScan::default(), MainHeadingScan::step)
            .finish();
        let mut methods = elements
            .iter()
            .fold(MethodScan::new(&self.rules), MethodScan::step)
            .finish();
        let levels = elements
            .iter()
            .fold(LevelScan::new(&self.rules), LevelScan::step)
            .finish();
        let documents = elements
            .iter()
            .fold(DocumentScan::new(&self.rules), DocumentScan::step)
            .finish();
        let timelines = elements
            .iter()
            .fold(TimelineScan::new(&self.rules), TimelineScan::step)
            .finish();
        let note = elements
            .iter()
            .fold(NoteScan::new(&self.rules), NoteScan::step)
            .finish();

        let mut fallback_used = false;
        if methods.is_empty() && levels.is_empty() && documents.is_empty() {
            if let Some(method) = self.fallback_method(&elements) {
                methods.push(method);
                fallback_used = true;
            }
        }

        debug!(
            methods = methods.len(),
            levels = levels.len(),
            documents = documents.len(),
            timelines = timelines.len(),
            fallback_used,
            "classified document"
        );

        let description = self.main_description(ctx, &title);
        Classification {
            sections: StructuredSections {
                main_heading: MainHeading { title, description },
                complaint_methods: ComplaintMethods {
                    heading: self.headings.methods.clone(),
                    methods,
                },
                escalation_levels: EscalationLevels {
                    heading: self.headings.levels.clone(),
                    levels,
                },
                documents_required: DocumentsRequired {
                    heading: self.headings.documents.clone(),
                    documents,
                },
                resolution_timeline: ResolutionTimeline {
                    heading: self.headings.timeline.clone(),
                    timelines,
                },
                note,
            },
            fallback_used,
        }
    }

    fn main_description(&self, ctx: &ClassifyContext, title: &str) -> String {
        let entity = ctx
            .entity_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or(Some(title).filter(|t| !t.is_empty()))
            .unwrap_or("the company");
        self.main_description_template.replace("{entity}", entity)
    }

    /// A single general method built from the first paragraph.
    fn fallback_method(&self, elements: &[Element]) -> Option<Method> {
        let text = elements.iter().find_map(|el| match el {
            Element::Paragraph { text, .. } => Some(text.as_str()),
            _ => None,
        })?;
        Some(Method {
            method_number: 1,
            title: self.fallback_method_title.clone(),
            description: text.to_string(),
            steps: Vec::new(),
            contact_info: contact_details([text]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvekit_shared::{Block, ListItem, Span};

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            spans: vec![Span::plain(text)],
            size_hint: None,
        }
    }

    fn para(text: &str) -> Block {
        Block::Paragraph {
            spans: vec![Span::plain(text)],
        }
    }

    fn classifier() -> Classifier {
        Classifier::new(&ClassifierConfig::default()).expect("default config")
    }

    fn classify(blocks: Vec<Block>) -> Classification {
        classifier().classify(&RichDocument::new(blocks), &ClassifyContext::default())
    }

    #[test]
    fn fixed_section_headings() {
        let result = classify(vec![]);
        assert_eq!(result.sections.complaint_methods.heading, "Complaint Methods");
        assert_eq!(result.sections.escalation_levels.heading, "Escalation Levels");
        assert_eq!(result.sections.documents_required.heading, "Documents Required");
        assert_eq!(result.sections.resolution_timeline.heading, "Resolution Timeline");
    }

    #[test]
    fn empty_document_is_unstructured() {
        let result = classify(vec![]);
        assert_eq!(result.status(), ProcessingStatus::Unstructured);
        assert!(result.sections.complaint_methods.methods.is_empty());
    }

    #[test]
    fn fallback_synthesizes_one_method() {
        let result = classify(vec![para("Please visit our branch for help.")]);
        let methods = &result.sections.complaint_methods.methods;
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].title, "General Complaint Process");
        assert_eq!(methods[0].description, "Please visit our branch for help.");
        assert_eq!(result.status(), ProcessingStatus::Fallback);
    }

    #[test]
    fn fallback_uses_first_paragraph_not_heading() {
        let result = classify(vec![
            heading(2, "Welcome"),
            para("Visit any branch."),
            para("Second paragraph."),
        ]);
        let methods = &result.sections.complaint_methods.methods;
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].description, "Visit any branch.");
    }

    #[test]
    fn no_paragraph_no_fallback() {
        let result = classify(vec![heading(2, "Welcome")]);
        assert!(result.sections.complaint_methods.methods.is_empty());
        assert!(!result.fallback_used);
    }

    #[test]
    fn levels_suppress_fallback() {
        let result = classify(vec![
            heading(3, "Level 2: Regional Office"),
            para("Plain text here."),
        ]);
        assert!(result.sections.complaint_methods.methods.is_empty());
        assert_eq!(result.status(), ProcessingStatus::Processed);
    }

    #[test]
    fn one_heading_can_land_in_several_sections() {
        let result = classify(vec![heading(2, "Step 2: Escalation timeline")]);
        assert_eq!(result.sections.complaint_methods.methods.len(), 1);
        assert_eq!(result.sections.escalation_levels.levels.len(), 1);
        assert_eq!(result.sections.resolution_timeline.timelines.len(), 1);
    }

    #[test]
    fn documents_from_list_under_heading() {
        let result = classify(vec![
            heading(2, "Documents Required"),
            Block::List {
                ordered: false,
                items: vec![ListItem::new("ID proof"), ListItem::new("ID proof")],
            },
        ]);
        assert_eq!(result.sections.documents_required.documents, vec!["ID proof"]);
    }

    #[test]
    fn main_description_names_entity() {
        let classifier = classifier();
        let doc = RichDocument::new(vec![heading(1, "XYZ Complaint Process")]);

        let named = classifier.classify(&doc, &ClassifyContext::for_entity("XYZ Bank"));
        assert!(named.sections.main_heading.description.contains("XYZ Bank"));

        let unnamed = classifier.classify(&doc, &ClassifyContext::default());
        assert!(
            unnamed
                .sections
                .main_heading
                .description
                .contains("XYZ Complaint Process")
        );
    }

    #[test]
    fn empty_keyword_table_leaves_enumerators_only() {
        let config = ClassifierConfig {
            method_keywords: vec![],
            ..ClassifierConfig::default()
        };
        let classifier = Classifier::new(&config).expect("config");
        let result = classifier.classify(
            &RichDocument::new(vec![heading(2, "Online procedure")]),
            &ClassifyContext::default(),
        );
        assert!(result.sections.complaint_methods.methods.is_empty());

        let result = classifier.classify(
            &RichDocument::new(vec![heading(2, "Step 1")]),
            &ClassifyContext::default(),
        );
        assert_eq!(result.sections.complaint_methods.methods.len(), 1);
    }
}
