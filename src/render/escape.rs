//! HTML escaping.
use std::borrow::Cow;

fn escape(s: &str, quotes: bool) -> Cow<'_, str> {
    let needs = |c: char| matches!(c, '&' | '<' | '>') || (quotes && c == '"');
    if !s.contains(needs) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape a double-quoted attribute value.
pub fn attr(s: &str) -> Cow<'_, str> {
    escape(s, true)
}

/// Escape text content.
pub fn text(s: &str) -> Cow<'_, str> {
    escape(s, false)
}
