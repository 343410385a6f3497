use resolvekit_shared::Timeline;

use crate::element::Element;
use crate::rules::Rules;

/// One placeholder entry per heading or paragraph mentioning time.
#[derive(Debug)]
pub(crate) struct TimelineScan<'r> {
    rules: &'r Rules,
    timelines: Vec<Timeline>,
}

impl<'r> TimelineScan<'r> {
    pub fn new(rules: &'r Rules) -> Self {
        Self {
            rules,
            timelines: Vec::new(),
        }
    }

    pub fn step(mut self, el: &Element) -> Self {
        match el {
            Element::Heading { text, .. } | Element::Paragraph { text, .. }
                if self.rules.is_timeline(text) =>
            {
                self.timelines.push(Timeline {
                    level: text.clone(),
                    days: self.rules.timeline_default_days.clone(),
                    description: self.rules.timeline_default_description.clone(),
                });
            }
            _ => {}
        }
        self
    }

    pub fn finish(self) -> Vec<Timeline> {
        self.timelines
    }
}
