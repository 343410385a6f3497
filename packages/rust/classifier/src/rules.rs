//! Compiled heuristics: keyword matchers and structural patterns.
//!
//! Keyword tables come from `[classifier]` config and match as
//! case-insensitive substrings. Structural patterns (enumerators, durations,
//! contact details) are fixed.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use resolvekit_shared::{ClassifierConfig, ResolveKitError, Result};

static METHOD_ENUMERATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:\d+\s*[.)]|step\s*\d+|method\s*\d+)").expect("valid regex")
});

static LEVEL_ENUMERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:level|tier)\s*\d+").expect("valid regex"));

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d+\s*(?:-|to)?\s*\d*\s*(?:working\s+|business\s+|calendar\s+)?(?:hours?|hrs?|days?|weeks?|months?)\b",
    )
    .expect("valid regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+").expect("valid regex")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]+").expect("valid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s().-]{5,}\d").expect("valid regex"));

/// A case-insensitive "contains any of" matcher. An empty table never matches.
#[derive(Debug, Clone)]
pub(crate) struct KeywordSet {
    re: Option<Regex>,
}

impl KeywordSet {
    pub fn new(name: &str, keywords: &[String]) -> Result<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { re: None });
        }
        let re = RegexBuilder::new(&format!("(?:{})", alternatives.join("|")))
            .case_insensitive(true)
            .build()
            .map_err(|e| ResolveKitError::config(format!("invalid {name} table: {e}")))?;
        Ok(Self { re: Some(re) })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.re.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Everything the scans need to decide membership, built once per classifier.
#[derive(Debug, Clone)]
pub(crate) struct Rules {
    pub method: KeywordSet,
    pub escalation: KeywordSet,
    pub document: KeywordSet,
    pub timeline: KeywordSet,
    pub note: KeywordSet,
    pub min_description_chars: usize,
    pub timeline_default_days: String,
    pub timeline_default_description: String,
}

impl Rules {
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            method: KeywordSet::new("method_keywords", &config.method_keywords)?,
            escalation: KeywordSet::new("escalation_keywords", &config.escalation_keywords)?,
            document: KeywordSet::new("document_keywords", &config.document_keywords)?,
            timeline: KeywordSet::new("timeline_keywords", &config.timeline_keywords)?,
            note: KeywordSet::new("note_keywords", &config.note_keywords)?,
            min_description_chars: config.min_description_chars,
            timeline_default_days: config.timeline_default_days.clone(),
            timeline_default_description: config.timeline_default_description.clone(),
        })
    }

    /// Heading text that opens a new complaint method.
    pub fn is_method_heading(&self, text: &str) -> bool {
        self.method.matches(text) || METHOD_ENUMERATOR_RE.is_match(text)
    }

    pub fn is_escalation(&self, text: &str) -> bool {
        self.escalation.matches(text) || LEVEL_ENUMERATOR_RE.is_match(text)
    }

    pub fn is_timeline(&self, text: &str) -> bool {
        self.timeline.matches(text) || DURATION_RE.is_match(text)
    }

    /// Long enough to serve as a description.
    pub fn is_description(&self, text: &str) -> bool {
        text.chars().count() > self.min_description_chars
    }
}

/// Phone numbers, e-mail addresses and URLs in `texts`, de-duplicated, in
/// order of appearance, joined with `", "`.
pub(crate) fn contact_details<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let mut found: Vec<String> = Vec::new();
    for text in texts {
        let mut hits: Vec<(usize, String)> = Vec::new();
        for m in EMAIL_RE.find_iter(text) {
            hits.push((m.start(), m.as_str().to_string()));
        }
        for m in URL_RE.find_iter(text) {
            hits.push((m.start(), trim_trailing_punct(m.as_str())));
        }
        for m in PHONE_RE.find_iter(text) {
            let digits = m.as_str().chars().filter(char::is_ascii_digit).count();
            if digits >= 7 {
                hits.push((m.start(), m.as_str().trim().to_string()));
            }
        }
        hits.sort_by_key(|(pos, _)| *pos);
        for (_, hit) in hits {
            // A phone match inside an e-mail or URL is not a separate contact.
            if !found.iter().any(|f| f == &hit || f.contains(hit.as_str())) {
                found.push(hit);
            }
        }
    }
    found.join(", ")
}

fn trim_trailing_punct(s: &str) -> String {
    s.trim_end_matches(['.', ',', ';', ':', ')', '!', '?']).to_string()
}
