//! Pasted-markup normalization into a [`RichDocument`].
//!
//! Takes arbitrary markup (typically pasted from a word processor into a
//! rich-text surface), parses it with `scraper`, and walks the tree once:
//!
//! 1. Vendor artifacts are stripped (namespaced Office elements, `<xml>`
//!    islands, conditional comments, list marker spans) keeping their text
//! 2. Paragraph font sizes and all-bold paragraphs are promoted to
//!    heading levels 1 to 3 using the configured thresholds
//! 3. Lists keep their type: `<ol>`/`<ul>` are authoritative, Word list
//!    paragraphs resolve from class and marker text
//! 4. Whitespace between blocks collapses; empty paragraphs stay as spacers
//!
//! The transform is pure and infallible; unknown structure degrades to
//! paragraphs. Normalizing [`RichDocument::to_html`] output yields the same
//! document.

mod inline;
mod lists;
mod style;
mod vendor;

use scraper::{ElementRef, Html, Node};
use tracing::{debug, instrument};

use resolvekit_shared::{Block, ListItem, NormalizerConfig, RichDocument, Span, spans_text};

use inline::{InlineBuf, InlineStyle};
use lists::Draft;
use vendor::TagKind;

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Markup normalizer configured with heading-promotion thresholds.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize raw markup into a block sequence.
    #[instrument(skip_all, fields(input_len = raw.len()))]
    pub fn normalize(&self, raw: &str) -> RichDocument {
        let fragment = Html::parse_fragment(raw);

        let mut flow = Flow::new(&self.config);
        flow.walk_children(fragment.root_element(), InlineStyle::default());
        let blocks = flow.finish();

        debug!(blocks = blocks.len(), "markup normalized");
        RichDocument::new(blocks)
    }
}

/// Normalize with default thresholds.
pub fn normalize(raw: &str) -> RichDocument {
    Normalizer::default().normalize(raw)
}

// ---------------------------------------------------------------------------
// Block flow
// ---------------------------------------------------------------------------

/// Walks a block-context element, accumulating loose inline content into
/// paragraphs between block elements.
struct Flow<'c> {
    config: &'c NormalizerConfig,
    drafts: Vec<Draft>,
    inline: InlineBuf,
}

impl<'c> Flow<'c> {
    fn new(config: &'c NormalizerConfig) -> Self {
        Self {
            config,
            drafts: Vec::new(),
            inline: InlineBuf::default(),
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        lists::group(self.drafts)
    }

    fn push(&mut self, block: Block) {
        self.drafts.push(Draft::Block(block));
    }

    /// Turn pending loose inline text into a paragraph.
    fn flush(&mut self) {
        let had_text = self.inline.has_text();
        let spans = self.inline.finish();
        if had_text {
            let block = promote(self.config, spans, None);
            self.push(block);
        }
    }

    fn walk_children(&mut self, el: ElementRef, style: InlineStyle) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.inline.push_text(text, style),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.walk_element(child_el, style);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&mut self, el: ElementRef, style: InlineStyle) {
        match vendor::classify(&el) {
            TagKind::Drop => {}
            TagKind::LineBreak => self.inline.push_break(),
            TagKind::Inline => {
                if !vendor::is_list_marker(&el) {
                    self.walk_children(el, inline_style(&el, style));
                }
            }
            TagKind::Vendor => self.walk_children(el, style),
            TagKind::Transparent => {
                self.flush();
                self.walk_children(el, style);
                self.flush();
            }
            TagKind::Heading(level) => {
                self.flush();
                if let Some(block) = heading(&el, level) {
                    self.push(block);
                }
            }
            TagKind::Paragraph => {
                self.flush();
                self.paragraph(&el);
            }
            TagKind::List { ordered } => {
                self.flush();
                if let Some(block) = list(&el, ordered) {
                    self.push(block);
                }
            }
            TagKind::ListItem => {
                self.flush();
                let item = list_item(&el);
                if !item.text.is_empty() || !item.details.is_empty() {
                    self.drafts.push(Draft::LooseItem {
                        ordered: vendor::loose_item_ordered(&el),
                        level: 1,
                        item,
                    });
                }
            }
            TagKind::Container => {
                self.flush();
                if has_block_descendant(&el) {
                    let mut inner = Flow::new(self.config);
                    inner.walk_children(el, inline_style(&el, InlineStyle::default()));
                    let children = inner.finish();
                    if !children.is_empty() {
                        self.push(Block::Container {
                            tag: vendor::container_tag(&el).to_string(),
                            children,
                        });
                    }
                } else {
                    self.paragraph(&el);
                }
            }
        }
    }

    /// A `<p>` (or inline-only container): spacer, Word list item, heading or paragraph.
    fn paragraph(&mut self, el: &ElementRef) {
        let mut collector = InlineCollector::default();
        collector.collect(*el, inline_style(el, InlineStyle::default()));

        if let Some(info) = vendor::word_list_paragraph(el) {
            if collector.buf.has_text() {
                let ordered = info.class_ordered.unwrap_or_else(|| {
                    collector
                        .marker
                        .as_deref()
                        .is_some_and(vendor::marker_is_ordered)
                });
                let text = spans_text(&collector.buf.finish());
                self.drafts.push(Draft::LooseItem {
                    ordered,
                    level: info.level,
                    item: ListItem::new(text),
                });
            }
            return;
        }

        if !collector.buf.has_text() {
            self.push(Block::Spacer);
            return;
        }

        let spans = collector.buf.finish();
        let block = promote(self.config, spans, max_font_size(el));
        self.push(block);
    }
}

// ---------------------------------------------------------------------------
// Block builders
// ---------------------------------------------------------------------------

/// Apply font-size and all-bold promotion to a finished paragraph.
fn promote(config: &NormalizerConfig, spans: Vec<Span>, size_pt: Option<f32>) -> Block {
    if let Some(pt) = size_pt {
        let level = if pt >= config.h1_min_pt {
            Some(1)
        } else if pt >= config.h2_min_pt {
            Some(2)
        } else if pt >= config.h3_min_pt {
            Some(3)
        } else {
            None
        };
        if let Some(level) = level {
            return Block::Heading {
                level,
                spans,
                size_hint: Some(pt),
            };
        }
    }

    let all_bold = spans
        .iter()
        .filter(|s| !s.text.trim().is_empty())
        .all(|s| s.strong);
    let len = spans_text(&spans).chars().count();
    if all_bold && len <= config.bold_heading_max_chars {
        return Block::Heading {
            level: config.bold_heading_level,
            spans,
            size_hint: None,
        };
    }

    Block::Paragraph { spans }
}

fn heading(el: &ElementRef, level: u8) -> Option<Block> {
    let mut collector = InlineCollector::default();
    collector.collect(*el, InlineStyle::default());
    if !collector.buf.has_text() {
        return None;
    }
    let size_hint = el
        .value()
        .attr("data-font-size")
        .and_then(style::font_size_pt);
    Some(Block::Heading {
        level,
        spans: collector.buf.finish(),
        size_hint,
    })
}

fn list(el: &ElementRef, ordered: bool) -> Option<Block> {
    let mut items: Vec<ListItem> = Vec::new();

    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    items.push(ListItem::new(collapse(text)));
                }
            }
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match vendor::classify(&child_el) {
                    TagKind::Drop => {}
                    // A list directly inside a list belongs to the previous item.
                    TagKind::List { .. } => {
                        let mut nested = Vec::new();
                        nested_items(&child_el, &mut nested);
                        match items.last_mut() {
                            Some(last) => last.details.extend(nested),
                            None => items.extend(nested.into_iter().map(ListItem::new)),
                        }
                    }
                    _ => {
                        let item = list_item(&child_el);
                        if !item.text.is_empty() || !item.details.is_empty() {
                            items.push(item);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if items.is_empty() {
        None
    } else {
        Some(Block::List { ordered, items })
    }
}

/// One `<li>`: its own text, with nested list entries flattened into details.
fn list_item(el: &ElementRef) -> ListItem {
    let mut collector = InlineCollector {
        details: Some(Vec::new()),
        ..Default::default()
    };
    collector.collect(*el, InlineStyle::default());
    ListItem {
        text: spans_text(&collector.buf.finish()),
        details: collector.details.unwrap_or_default(),
    }
}

fn nested_items(list_el: &ElementRef, out: &mut Vec<String>) {
    for child in list_el.children().filter_map(ElementRef::wrap) {
        match vendor::classify(&child) {
            TagKind::Drop => {}
            TagKind::List { .. } => nested_items(&child, out),
            _ => {
                let item = list_item(&child);
                if !item.text.is_empty() {
                    out.push(item.text);
                }
                out.extend(item.details);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Inline collection
// ---------------------------------------------------------------------------

/// Gathers the inline text of one block element.
///
/// Nested block elements degrade to inline text separated by spaces, except
/// lists when `details` is set (list-item mode), which are collected there.
#[derive(Default)]
struct InlineCollector {
    buf: InlineBuf,
    /// Text of a Word `mso-list:Ignore` marker span, if one was seen.
    marker: Option<String>,
    details: Option<Vec<String>>,
}

impl InlineCollector {
    fn collect(&mut self, el: ElementRef, style: InlineStyle) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.buf.push_text(text, style),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.element(child_el, style);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, el: ElementRef, style: InlineStyle) {
        match vendor::classify(&el) {
            TagKind::Drop => {}
            TagKind::LineBreak => self.buf.push_break(),
            TagKind::Inline | TagKind::Vendor => {
                if vendor::is_list_marker(&el) {
                    if self.marker.is_none() {
                        self.marker = Some(el.text().collect::<String>().trim().to_string());
                    }
                } else {
                    self.collect(el, inline_style(&el, style));
                }
            }
            TagKind::List { .. } if self.details.is_some() => {
                let mut nested = Vec::new();
                nested_items(&el, &mut nested);
                if let Some(details) = self.details.as_mut() {
                    details.extend(nested);
                }
            }
            _ => {
                self.buf.push_break();
                self.collect(el, style);
                self.buf.push_break();
            }
        }
    }
}

/// Emphasis flags an element adds to (or removes from) its parent's.
fn inline_style(el: &ElementRef, parent: InlineStyle) -> InlineStyle {
    let mut style = parent;
    match el.value().name() {
        "b" | "strong" => style.strong = true,
        "i" | "em" => style.emphasis = true,
        _ => {}
    }
    if let Some(css) = el.value().attr("style") {
        for (key, value) in style::declarations(css) {
            match key.as_str() {
                "font-weight" => style.strong = style::is_bold_weight(&value),
                "font-style" => style.emphasis = style::is_italic_style(&value),
                _ => {}
            }
        }
    }
    style
}

/// Largest font size (points) declared on the element or any descendant.
/// `descendants()` starts with the element itself.
fn max_font_size(el: &ElementRef) -> Option<f32> {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|e| {
            let from_style = e
                .value()
                .attr("style")
                .and_then(|s| style::property(s, "font-size"))
                .and_then(|v| style::font_size_pt(&v));
            let from_font_tag = if e.value().name() == "font" {
                e.value().attr("size").and_then(style::font_tag_size_pt)
            } else {
                None
            };
            from_style.or(from_font_tag)
        })
        .fold(None, |max: Option<f32>, pt| Some(max.map_or(pt, |m| m.max(pt))))
}

fn has_block_descendant(el: &ElementRef) -> bool {
    el.descendants().skip(1).filter_map(ElementRef::wrap).any(|d| {
        matches!(
            vendor::classify(&d),
            TagKind::Heading(_)
                | TagKind::Paragraph
                | TagKind::List { .. }
                | TagKind::ListItem
                | TagKind::Container
                | TagKind::Transparent
        )
    })
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
