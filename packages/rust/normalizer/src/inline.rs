//! Inline text accumulation with whitespace collapsing.

use resolvekit_shared::Span;

/// Emphasis flags inherited down the inline tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct InlineStyle {
    pub strong: bool,
    pub emphasis: bool,
}

/// Builds a span list from text fragments.
///
/// Runs of whitespace (including non-breaking spaces) collapse to a single
/// space, never doubled across span boundaries; adjacent spans with equal
/// flags merge. [`InlineBuf::finish`] trims both ends.
#[derive(Debug, Default)]
pub(crate) struct InlineBuf {
    spans: Vec<Span>,
}

impl InlineBuf {
    pub fn push_text(&mut self, raw: &str, style: InlineStyle) {
        let mut collapsed = String::with_capacity(raw.len());
        let mut pending_space = false;
        for c in raw.chars() {
            if c.is_whitespace() {
                pending_space = true;
            } else {
                if pending_space {
                    collapsed.push(' ');
                    pending_space = false;
                }
                collapsed.push(c);
            }
        }
        if pending_space {
            collapsed.push(' ');
        }

        if collapsed.starts_with(' ') && self.ends_with_space() {
            collapsed.remove(0);
        }
        if collapsed.is_empty() {
            return;
        }

        match self.spans.last_mut() {
            Some(last) if last.strong == style.strong && last.emphasis == style.emphasis => {
                last.text.push_str(&collapsed);
            }
            _ => self.spans.push(Span {
                text: collapsed,
                strong: style.strong,
                emphasis: style.emphasis,
            }),
        }
    }

    /// A hard line break inside a paragraph reads as a space.
    pub fn push_break(&mut self) {
        self.push_text(" ", InlineStyle::default());
    }

    fn ends_with_space(&self) -> bool {
        match self.spans.last() {
            Some(span) => span.text.ends_with(' '),
            None => true,
        }
    }

    pub fn has_text(&self) -> bool {
        self.spans.iter().any(|s| !s.text.trim().is_empty())
    }

    /// Take the accumulated spans, trimmed, leaving the buffer empty.
    pub fn finish(&mut self) -> Vec<Span> {
        let mut spans = std::mem::take(&mut self.spans);

        if let Some(first) = spans.first_mut() {
            let trimmed = first.text.trim_start().to_string();
            first.text = trimmed;
        }
        if let Some(last) = spans.last_mut() {
            let trimmed = last.text.trim_end().to_string();
            last.text = trimmed;
        }
        spans.retain(|s| !s.text.is_empty());

        // Trimming can leave a whitespace-only span between equal-flag neighbours.
        let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(prev) if prev.strong == span.strong && prev.emphasis == span.emphasis => {
                    prev.text.push_str(&span.text);
                }
                _ => merged.push(span),
            }
        }
        merged
    }
}
