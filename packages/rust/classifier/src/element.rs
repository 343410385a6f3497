//! Flat view of a `RichDocument` for the category scans.

use resolvekit_shared::{Block, ListItem, RichDocument, Span};

/// One leaf block, reduced to what classification looks at.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Element<'a> {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
        /// Text of the first bold span, if any.
        bold_run: Option<String>,
    },
    List {
        items: &'a [ListItem],
        /// Text of the containing block: the enclosing container when the
        /// list is nested, otherwise the nearest preceding heading or paragraph.
        context: String,
    },
}

impl Element<'_> {
    /// Own text; for a list, the text of its containing block.
    pub fn text(&self) -> &str {
        match self {
            Element::Heading { text, .. } | Element::Paragraph { text, .. } => text,
            Element::List { context, .. } => context,
        }
    }
}

/// Flatten leaves in document order. Spacers and empty blocks are skipped.
pub(crate) fn elements(doc: &RichDocument) -> Vec<Element<'_>> {
    let mut out = Vec::new();
    let mut preceding = String::new();

    for (block, container) in doc.leaves() {
        match block {
            Block::Heading { level, spans, .. } => {
                let text = plain(spans);
                if text.is_empty() {
                    continue;
                }
                preceding = text.clone();
                out.push(Element::Heading {
                    level: *level,
                    text,
                });
            }
            Block::Paragraph { spans } => {
                let text = plain(spans);
                if text.is_empty() {
                    continue;
                }
                preceding = text.clone();
                let bold_run = spans
                    .iter()
                    .find(|s| s.strong && !s.text.trim().is_empty())
                    .map(|s| s.text.trim().to_string());
                out.push(Element::Paragraph { text, bold_run });
            }
            Block::List { items, .. } => {
                if items.is_empty() {
                    continue;
                }
                let context = match container {
                    Some(c) => c.text(),
                    None => preceding.clone(),
                };
                out.push(Element::List { items, context });
            }
            Block::Container { .. } | Block::Spacer => {}
        }
    }
    out
}

fn plain(spans: &[Span]) -> String {
    resolvekit_shared::spans_text(spans).trim().to_string()
}
