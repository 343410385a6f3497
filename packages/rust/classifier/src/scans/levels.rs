use resolvekit_shared::Level;

use crate::element::Element;
use crate::rules::{Rules, contact_details};

/// Appends a level for every heading or paragraph that reads as escalation.
///
/// A level opened by a heading picks up the next paragraph over the minimum
/// length as its description, until another heading arrives.
#[derive(Debug)]
pub(crate) struct LevelScan<'r> {
    rules: &'r Rules,
    levels: Vec<Level>,
    awaiting_description: bool,
}

impl<'r> LevelScan<'r> {
    pub fn new(rules: &'r Rules) -> Self {
        Self {
            rules,
            levels: Vec::new(),
            awaiting_description: false,
        }
    }

    pub fn step(mut self, el: &Element) -> Self {
        match el {
            Element::Heading { text, .. } => {
                self.awaiting_description = false;
                if self.rules.is_escalation(text) {
                    self.push(text);
                    self.awaiting_description = true;
                }
            }
            Element::Paragraph { text, .. } => {
                if self.rules.is_escalation(text) {
                    self.push(text);
                    self.awaiting_description = false;
                } else if self.awaiting_description && self.rules.is_description(text) {
                    if let Some(level) = self.levels.last_mut() {
                        level.description = text.clone();
                        level.contact_details =
                            contact_details([level.title.as_str(), level.description.as_str()]);
                    }
                    self.awaiting_description = false;
                }
            }
            Element::List { .. } => {}
        }
        self
    }

    pub fn finish(self) -> Vec<Level> {
        self.levels
    }

    fn push(&mut self, text: &str) {
        self.levels.push(Level {
            level_number: self.levels.len() as u32 + 1,
            title: text.to_string(),
            description: String::new(),
            contact_details: contact_details([text]),
        });
    }
}
