use crate::element::Element;
use crate::rules::Rules;

/// Last heading, paragraph or list item containing a note keyword.
#[derive(Debug)]
pub(crate) struct NoteScan<'r> {
    rules: &'r Rules,
    note: Option<String>,
}

impl<'r> NoteScan<'r> {
    pub fn new(rules: &'r Rules) -> Self {
        Self { rules, note: None }
    }

    pub fn step(mut self, el: &Element) -> Self {
        match el {
            Element::Heading { text, .. } | Element::Paragraph { text, .. } => {
                if self.rules.note.matches(text) {
                    self.note = Some(text.clone());
                }
            }
            Element::List { items, .. } => {
                if let Some(item) = items.iter().rev().find(|i| self.rules.note.matches(&i.text)) {
                    self.note = Some(item.text.clone());
                }
            }
        }
        self
    }

    pub fn finish(self) -> String {
        self.note.unwrap_or_default()
    }
}
