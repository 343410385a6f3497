//! Tag classification and word-processor paste artifacts.
//!
//! Office pastes carry namespaced elements (`o:p`, `w:sdt`, `v:shape`),
//! conditional comments, `<xml>` islands and list paragraphs that fake
//! numbering with an `mso-list:Ignore` marker span. This module decides
//! what each element means for the block model.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use crate::style;

/// How the walker treats an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    /// Removed together with its content.
    Drop,
    /// `h1` to `h6`.
    Heading(u8),
    Paragraph,
    List { ordered: bool },
    ListItem,
    /// Grouping element kept as a container (`div`, `section`, `blockquote`, ...).
    Container,
    /// Structural wrapper whose children flow into the parent as blocks (tables).
    Transparent,
    /// Namespaced Office element; its content is kept in place.
    Vendor,
    LineBreak,
    Inline,
}

const DROP_TAGS: &[&str] = &[
    "style", "script", "xml", "meta", "link", "title", "head", "noscript", "template", "img",
    "svg", "iframe", "object", "embed", "input", "button", "select", "textarea", "hr",
];

const CONTAINER_TAGS: &[&str] = &[
    "div", "section", "article", "blockquote", "main", "header", "footer", "aside", "figure",
    "center", "form", "fieldset", "nav", "details", "address", "body",
];

const TRANSPARENT_TAGS: &[&str] = &[
    "table", "thead", "tbody", "tfoot", "tr", "td", "th", "caption", "colgroup", "dl", "dt", "dd",
    "pre", "figcaption", "summary",
];

/// Classify an element by tag name and vendor markers.
pub(crate) fn classify(el: &ElementRef) -> TagKind {
    let name = el.value().name().to_ascii_lowercase();

    // Namespaced Office elements: keep their text, lose the element.
    if name.contains(':') {
        return TagKind::Vendor;
    }
    if DROP_TAGS.contains(&name.as_str()) {
        return TagKind::Drop;
    }

    match name.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse().unwrap_or(1);
            TagKind::Heading(level)
        }
        "p" => TagKind::Paragraph,
        "ul" | "menu" | "dir" => TagKind::List { ordered: false },
        "ol" => TagKind::List { ordered: true },
        "li" => TagKind::ListItem,
        "br" => TagKind::LineBreak,
        n if CONTAINER_TAGS.contains(&n) => TagKind::Container,
        n if TRANSPARENT_TAGS.contains(&n) => TagKind::Transparent,
        _ => TagKind::Inline,
    }
}

/// Canonical container tag used in normalized markup.
pub(crate) fn container_tag(el: &ElementRef) -> &'static str {
    match el.value().name() {
        "blockquote" => "blockquote",
        "section" | "article" => "section",
        _ => "div",
    }
}

/// Whether an inline element is the fake list marker Word emits.
pub(crate) fn is_list_marker(el: &ElementRef) -> bool {
    el.value()
        .attr("style")
        .and_then(|s| style::property(s, "mso-list"))
        .is_some_and(|v| v == "ignore")
}

/// Word list-paragraph metadata derived from class and style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WordListParagraph {
    /// `Some` when the class alone settles the list type.
    pub class_ordered: Option<bool>,
    /// 1-based nesting level from `mso-list: lN levelK`.
    pub level: u32,
}

/// Detect a paragraph that is really a list item pasted from Word.
pub(crate) fn word_list_paragraph(el: &ElementRef) -> Option<WordListParagraph> {
    static LEVEL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"level(\d+)").expect("valid regex"));

    let class = el.value().attr("class").unwrap_or_default();
    let mso_list = el
        .value()
        .attr("style")
        .and_then(|s| style::property(s, "mso-list"));

    let class_ordered = if class.contains("MsoListNumber") {
        Some(true)
    } else if class.contains("MsoListBullet") {
        Some(false)
    } else {
        None
    };

    let is_list = class.contains("MsoList") || mso_list.as_deref().is_some_and(|v| v != "ignore");
    if !is_list {
        return None;
    }

    let level = mso_list
        .as_deref()
        .and_then(|v| LEVEL_RE.captures(v))
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(1);

    Some(WordListParagraph {
        class_ordered,
        level,
    })
}

/// List type of an `<li>` found outside any `<ol>`/`<ul>`.
///
/// The Word class wins, then `list-style-type` (or the `list-style`
/// shorthand). Anything else reads as unordered.
pub(crate) fn loose_item_ordered(el: &ElementRef) -> bool {
    let class = el.value().attr("class").unwrap_or_default();
    if class.contains("MsoListNumber") {
        return true;
    }
    if class.contains("MsoListBullet") {
        return false;
    }
    el.value()
        .attr("style")
        .and_then(|s| {
            style::property(s, "list-style-type").or_else(|| style::property(s, "list-style"))
        })
        .is_some_and(|v| v.split_whitespace().any(is_ordered_style_type))
}

fn is_ordered_style_type(value: &str) -> bool {
    matches!(
        value,
        "decimal"
            | "decimal-leading-zero"
            | "lower-alpha"
            | "upper-alpha"
            | "lower-latin"
            | "upper-latin"
            | "lower-roman"
            | "upper-roman"
            | "lower-greek"
    )
}

/// Whether a marker like `1.`, `(a)`, `iv)` denotes an ordered list.
/// Bullets (`·`, `•`, `o`, `§`, `-`) do not.
pub(crate) fn marker_is_ordered(marker: &str) -> bool {
    static ENUM_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\(?(?:\d+|[a-zA-Z]|[ivxlcdmIVXLCDM]+)[.)]$").expect("valid regex")
    });
    ENUM_RE.is_match(marker.trim())
}
