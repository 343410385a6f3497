use std::collections::HashSet;

use crate::element::Element;
use crate::rules::Rules;

/// Collects list items whose containing block mentions documents.
/// De-duplicated, insertion order kept.
#[derive(Debug)]
pub(crate) struct DocumentScan<'r> {
    rules: &'r Rules,
    seen: HashSet<String>,
    documents: Vec<String>,
}

impl<'r> DocumentScan<'r> {
    pub fn new(rules: &'r Rules) -> Self {
        Self {
            rules,
            seen: HashSet::new(),
            documents: Vec::new(),
        }
    }

    pub fn step(mut self, el: &Element) -> Self {
        if let Element::List { items, .. } = el {
            if self.rules.document.matches(el.text()) {
                for item in items.iter() {
                    let text = item.text.trim();
                    if !text.is_empty() && self.seen.insert(text.to_string()) {
                        self.documents.push(text.to_string());
                    }
                }
            }
        }
        self
    }

    pub fn finish(self) -> Vec<String> {
        self.documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scans::fixtures::{heading, list, rules};
    use resolvekit_shared::ListItem;

    #[test]
    fn takes_items_under_document_context() {
        let r = rules();
        let items = [ListItem::new("ID proof"), ListItem::new("Bill copy")];
        let docs = DocumentScan::new(&r)
            .step(&list(&items, "Documents Required"))
            .finish();
        assert_eq!(docs, vec!["ID proof".to_string(), "Bill copy".to_string()]);
    }

    #[test]
    fn ignores_lists_under_other_context() {
        let r = rules();
        let items = [ListItem::new("Dial 1800")];
        let docs = DocumentScan::new(&r).step(&list(&items, "Call Center")).finish();
        assert!(docs.is_empty());
    }

    #[test]
    fn deduplicates_across_lists() {
        let r = rules();
        let first = [ListItem::new("ID proof"), ListItem::new("Bill copy")];
        let second = [ListItem::new("Bill copy"), ListItem::new("Photo")];
        let docs = DocumentScan::new(&r)
            .step(&list(&first, "Proof needed"))
            .step(&heading(2, "Anything"))
            .step(&list(&second, "Evidence"))
            .finish();
        assert_eq!(docs, vec!["ID proof", "Bill copy", "Photo"]);
    }
}
