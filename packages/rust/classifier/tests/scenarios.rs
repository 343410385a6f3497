//! Normalize-then-classify over realistic pasted markup.

use proptest::prelude::*;
use resolvekit_classifier::{ClassifyContext, Classifier};
use resolvekit_normalizer::normalize;
use resolvekit_shared::{ClassifierConfig, ProcessingStatus};

const SCENARIO_ONE: &str = "<h1>XYZ Complaint Process</h1><h2>Method 1: Call Center</h2>\
    <p>Call our 24x7 line for help.</p>\
    <ul><li>Dial 1800-000-000</li><li>Select language</li></ul>";

fn classifier() -> Classifier {
    Classifier::new(&ClassifierConfig::default()).expect("default config")
}

#[test]
fn call_center_method_with_two_steps() {
    let result = classifier().classify(&normalize(SCENARIO_ONE), &ClassifyContext::default());
    let sections = &result.sections;

    assert_eq!(sections.main_heading.title, "XYZ Complaint Process");
    let methods = &sections.complaint_methods.methods;
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].method_number, 1);
    assert_eq!(methods[0].title, "Method 1: Call Center");
    assert_eq!(methods[0].description, "Call our 24x7 line for help.");
    let numbers: Vec<u32> = methods[0].steps.iter().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(result.status(), ProcessingStatus::Processed);
}

#[test]
fn lone_level_heading_is_numbered_by_extraction_order() {
    let result = classifier().classify(
        &normalize("<h3>Level 2: Regional Office</h3>"),
        &ClassifyContext::default(),
    );
    let levels = &result.sections.escalation_levels.levels;
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].level_number, 1);
}

#[test]
fn plain_prose_falls_back_to_general_method() {
    let result = classifier().classify(
        &normalize("<p>Please visit our branch for help.</p>"),
        &ClassifyContext::default(),
    );
    let methods = &result.sections.complaint_methods.methods;
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].title, "General Complaint Process");
    assert_eq!(methods[0].description, "Please visit our branch for help.");
    assert_eq!(result.status(), ProcessingStatus::Fallback);
}

#[test]
fn reclassifying_normalized_output_is_identical() {
    let classifier = classifier();
    let ctx = ClassifyContext::for_entity("XYZ");
    let first_doc = normalize(SCENARIO_ONE);
    let first = classifier.classify(&first_doc, &ctx);

    let second = classifier.classify(&normalize(&first_doc.to_html()), &ctx);
    assert_eq!(first, second);
}

#[test]
fn word_paste_with_documents_and_note() {
    let raw = r#"<html xmlns:o="urn:schemas-microsoft-com:office:office"><body>
        <p class="MsoNormal" style="font-size:18pt"><b>ABC Telecom Grievance Guide</b></p>
        <p class="MsoNormal"><b>Documents Required<o:p></o:p></b></p>
        <p class="MsoListParagraphCxSpFirst" style="mso-list:l0 level1 lfo1"><span style="mso-list:Ignore">·</span>Copy of bill</p>
        <p class="MsoListParagraphCxSpLast" style="mso-list:l0 level1 lfo1"><span style="mso-list:Ignore">·</span>ID proof</p>
        <p class="MsoNormal">Note: keep your ticket number safe.</p>
        </body></html>"#;
    let result = classifier().classify(&normalize(raw), &ClassifyContext::default());
    let sections = &result.sections;

    assert_eq!(sections.main_heading.title, "ABC Telecom Grievance Guide");
    assert_eq!(sections.documents_required.documents, vec!["Copy of bill", "ID proof"]);
    assert_eq!(sections.note, "Note: keep your ticket number safe.");
}

#[test]
fn malformed_markup_never_panics() {
    let result = classifier().classify(
        &normalize("<h2>Step 1<p>unclosed <ul><li>item"),
        &ClassifyContext::default(),
    );
    assert!(result.sections.complaint_methods.methods.len() <= 1);
}

const DOCUMENT_POOL: &[&str] = &["Copy of bill", "ID proof", "Address proof", "Ticket number"];

/// One generated stretch of a complaint page.
#[derive(Debug, Clone)]
enum Section {
    Method(Vec<String>),
    Level,
    Documents(Vec<&'static str>),
}

/// Lowercase consonant words never contain a keyword.
fn filler() -> impl Strategy<Value = String> {
    "[b-df-hj-np-tv-z]{3,8}"
}

fn section() -> impl Strategy<Value = Section> {
    prop_oneof![
        prop::collection::vec(filler(), 1..5).prop_map(Section::Method),
        Just(Section::Level),
        prop::collection::vec(prop::sample::select(DOCUMENT_POOL), 1..8)
            .prop_map(Section::Documents),
    ]
}

/// Headings carry numbers that disagree with their position.
fn page(sections: &[Section]) -> String {
    sections
        .iter()
        .enumerate()
        .map(|(i, section)| match section {
            Section::Method(steps) => {
                let items: String = steps.iter().map(|s| format!("<li>{s}</li>")).collect();
                format!("<h2>Method {}: {}</h2><ol>{items}</ol>", i + 7, steps[0])
            }
            Section::Level => format!("<h3>Level {}</h3>", 20 - i),
            Section::Documents(docs) => {
                let items: String = docs.iter().map(|d| format!("<li>{d}</li>")).collect();
                format!("<h2>Documents required</h2><ul>{items}</ul>")
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn numbering_is_dense_and_documents_are_unique(
        sections in prop::collection::vec(section(), 0..8),
    ) {
        let result = classifier().classify(&normalize(&page(&sections)), &ClassifyContext::default());
        let s = &result.sections;

        let expected_steps: Vec<usize> = sections
            .iter()
            .filter_map(|sec| match sec {
                Section::Method(steps) => Some(steps.len()),
                _ => None,
            })
            .collect();
        let methods = &s.complaint_methods.methods;
        prop_assert_eq!(methods.len(), expected_steps.len());
        for (i, method) in methods.iter().enumerate() {
            prop_assert_eq!(method.method_number as usize, i + 1);
            prop_assert_eq!(method.steps.len(), expected_steps[i]);
            for (j, step) in method.steps.iter().enumerate() {
                prop_assert_eq!(step.step_number as usize, j + 1);
            }
        }

        let level_count = sections.iter().filter(|sec| matches!(sec, Section::Level)).count();
        let levels = &s.escalation_levels.levels;
        prop_assert_eq!(levels.len(), level_count);
        for (i, level) in levels.iter().enumerate() {
            prop_assert_eq!(level.level_number as usize, i + 1);
        }

        let documents = &s.documents_required.documents;
        let unique: std::collections::HashSet<&String> = documents.iter().collect();
        prop_assert_eq!(unique.len(), documents.len());
        let mut expected: Vec<&str> = Vec::new();
        for sec in &sections {
            if let Section::Documents(docs) = sec {
                for doc in docs {
                    if !expected.contains(doc) {
                        expected.push(*doc);
                    }
                }
            }
        }
        prop_assert_eq!(documents.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prose_without_keywords_always_falls_back(words in prop::collection::vec("[b-df-hj-np-tv-z]{3,8}", 1..12)) {
        let text = words.join(" ");
        let raw = format!("<p>{text}</p>");
        let result = classifier().classify(&normalize(&raw), &ClassifyContext::default());
        let methods = &result.sections.complaint_methods.methods;
        prop_assert_eq!(methods.len(), 1);
        prop_assert_eq!(&methods[0].description, &text);
    }

    #[test]
    fn classification_is_idempotent(paras in prop::collection::vec("[A-Za-z0-9 :.]{1,40}", 0..6)) {
        let raw: String = paras.iter().map(|p| format!("<h2>{p}</h2><p>{p}</p>")).collect();
        let classifier = classifier();
        let ctx = ClassifyContext::default();
        let doc = normalize(&raw);
        let once = classifier.classify(&doc, &ctx);
        let twice = classifier.classify(&normalize(&doc.to_html()), &ctx);
        prop_assert_eq!(once, twice);
    }
}
