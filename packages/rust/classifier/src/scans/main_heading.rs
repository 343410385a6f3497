use crate::element::Element;

/// First level-1 heading wins; otherwise the first heading of any level;
/// otherwise the first bold run.
#[derive(Debug, Default)]
pub(crate) struct MainHeadingScan {
    h1: Option<String>,
    any_heading: Option<String>,
    bold_run: Option<String>,
}

impl MainHeadingScan {
    pub fn step(mut self, el: &Element) -> Self {
        match el {
            Element::Heading { level: 1, text } if self.h1.is_none() => {
                self.h1 = Some(text.clone());
                if self.any_heading.is_none() {
                    self.any_heading = Some(text.clone());
                }
            }
            Element::Heading { text, .. } if self.any_heading.is_none() => {
                self.any_heading = Some(text.clone());
            }
            Element::Paragraph {
                bold_run: Some(run),
                ..
            } if self.bold_run.is_none() => {
                self.bold_run = Some(run.clone());
            }
            _ => {}
        }
        self
    }

    pub fn finish(self) -> String {
        self.h1
            .or(self.any_heading)
            .or(self.bold_run)
            .unwrap_or_default()
    }
}
