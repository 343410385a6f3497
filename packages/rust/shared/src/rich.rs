//! `RichDocument`: the normalized, ordered block sequence.
//!
//! Produced by the normalizer, consumed by the classifier and renderer.
//! [`RichDocument::to_html`] is the canonical markup stored as
//! `richTextContent`; normalizing that markup again yields an equal document.

use serde::{Deserialize, Serialize};

/// A run of inline text with its emphasis flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strong: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub emphasis: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strong: false,
            emphasis: false,
        }
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strong: true,
            emphasis: false,
        }
    }
}

/// A list item. Nested sub-list items are flattened into `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ListItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            details: Vec::new(),
        }
    }
}

/// One block of a [`RichDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading {
        /// 1 to 6.
        level: u8,
        spans: Vec<Span>,
        /// Original font size in points when the heading was promoted from a paragraph.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size_hint: Option<f32>,
    },
    Paragraph {
        spans: Vec<Span>,
    },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    /// A generic grouping element (`div`, `section`, `blockquote`, ...).
    Container {
        tag: String,
        children: Vec<Block>,
    },
    /// An intentionally empty paragraph used for vertical spacing.
    Spacer,
}

impl Block {
    /// Plain text of the block (containers join their children with spaces).
    pub fn text(&self) -> String {
        match self {
            Block::Heading { spans, .. } | Block::Paragraph { spans } => spans_text(spans),
            Block::List { items, .. } => items
                .iter()
                .flat_map(|i| std::iter::once(i.text.as_str()).chain(i.details.iter().map(String::as_str)))
                .collect::<Vec<_>>()
                .join(" "),
            Block::Container { children, .. } => children
                .iter()
                .map(Block::text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            Block::Spacer => String::new(),
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Block::Heading {
                level,
                spans,
                size_hint,
            } => {
                let level = (*level).clamp(1, 6);
                match size_hint {
                    Some(pt) => out.push_str(&format!("<h{level} data-font-size=\"{pt}pt\">")),
                    None => out.push_str(&format!("<h{level}>")),
                }
                write_spans(spans, out);
                out.push_str(&format!("</h{level}>"));
            }
            Block::Paragraph { spans } => {
                out.push_str("<p>");
                write_spans(spans, out);
                out.push_str("</p>");
            }
            Block::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                out.push_str(&format!("<{tag}>"));
                for item in items {
                    out.push_str("<li>");
                    out.push_str(&escape_html(&item.text));
                    if !item.details.is_empty() {
                        out.push_str("<ul>");
                        for d in &item.details {
                            out.push_str("<li>");
                            out.push_str(&escape_html(d));
                            out.push_str("</li>");
                        }
                        out.push_str("</ul>");
                    }
                    out.push_str("</li>");
                }
                out.push_str(&format!("</{tag}>"));
            }
            Block::Container { tag, children } => {
                out.push_str(&format!("<{tag}>"));
                for child in children {
                    child.write_html(out);
                }
                out.push_str(&format!("</{tag}>"));
            }
            Block::Spacer => out.push_str("<p><br></p>"),
        }
    }
}

/// Normalized block sequence. Immutable per edit version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichDocument {
    pub blocks: Vec<Block>,
}

impl RichDocument {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| matches!(b, Block::Spacer))
    }

    /// Serialize to the canonical normalized markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            block.write_html(&mut out);
        }
        out
    }

    /// Depth-first walk over leaf blocks, yielding each with its enclosing
    /// container (if any).
    pub fn leaves(&self) -> Vec<(&Block, Option<&Block>)> {
        fn walk<'a>(
            blocks: &'a [Block],
            parent: Option<&'a Block>,
            out: &mut Vec<(&'a Block, Option<&'a Block>)>,
        ) {
            for block in blocks {
                match block {
                    Block::Container { children, .. } => walk(children, Some(block), out),
                    _ => out.push((block, parent)),
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.blocks, None, &mut out);
        out
    }
}

/// Concatenate span texts.
pub fn spans_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

fn write_spans(spans: &[Span], out: &mut String) {
    for span in spans {
        let text = escape_html(&span.text);
        match (span.strong, span.emphasis) {
            (true, true) => out.push_str(&format!("<strong><em>{text}</em></strong>")),
            (true, false) => out.push_str(&format!("<strong>{text}</strong>")),
            (false, true) => out.push_str(&format!("<em>{text}</em>")),
            (false, false) => out.push_str(&text),
        }
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
