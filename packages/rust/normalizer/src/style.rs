//! Inline `style` attribute parsing: font sizes, weights, list markers.

/// Iterate `(property, value)` pairs of a CSS declaration list, lowercased.
pub(crate) fn declarations(style: &str) -> impl Iterator<Item = (String, String)> + '_ {
    style.split(';').filter_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        if key.is_empty() || value.is_empty() {
            None
        } else {
            Some((key, value))
        }
    })
}

/// Look up a single property.
pub(crate) fn property(style: &str, name: &str) -> Option<String> {
    declarations(style)
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}

/// Convert a CSS `font-size` value to points.
///
/// Supports `pt`, `px` (×0.75), `em`/`rem` (×12), `%` and the absolute
/// size keywords. Anything else yields `None`.
pub(crate) fn font_size_pt(value: &str) -> Option<f32> {
    let v = value.trim().trim_end_matches("!important").trim();
    let keyword = match v {
        "xx-small" => Some(7.0),
        "x-small" => Some(7.5),
        "small" => Some(10.0),
        "medium" => Some(12.0),
        "large" => Some(13.5),
        "x-large" => Some(18.0),
        "xx-large" => Some(24.0),
        "xxx-large" => Some(36.0),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }

    let (number, factor) = if let Some(n) = v.strip_suffix("pt") {
        (n, 1.0)
    } else if let Some(n) = v.strip_suffix("px") {
        (n, 0.75)
    } else if let Some(n) = v.strip_suffix("rem") {
        (n, 12.0)
    } else if let Some(n) = v.strip_suffix("em") {
        (n, 12.0)
    } else if let Some(n) = v.strip_suffix('%') {
        let pct: f32 = n.trim().parse().ok()?;
        return (pct.is_finite() && pct > 0.0).then(|| pct / 100.0 * 12.0);
    } else {
        return None;
    };

    let parsed: f32 = number.trim().parse().ok()?;
    if parsed.is_finite() && parsed > 0.0 {
        Some(parsed * factor)
    } else {
        None
    }
}

/// Legacy `<font size="1..7">` to points.
pub(crate) fn font_tag_size_pt(size: &str) -> Option<f32> {
    match size.trim() {
        "1" => Some(7.5),
        "2" => Some(10.0),
        "3" => Some(12.0),
        "4" => Some(13.5),
        "5" => Some(18.0),
        "6" => Some(24.0),
        "7" => Some(36.0),
        _ => None,
    }
}

/// Whether a `font-weight` value means bold.
pub(crate) fn is_bold_weight(value: &str) -> bool {
    match value.trim() {
        "bold" | "bolder" => true,
        other => other.parse::<u16>().is_ok_and(|w| w >= 600),
    }
}

/// `font-style: italic|oblique`.
pub(crate) fn is_italic_style(value: &str) -> bool {
    matches!(value.trim(), "italic" | "oblique")
}
