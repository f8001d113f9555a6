//! Term helpers shared by the aggregator and the classifier.
//!
//! Terms are compared case-sensitively everywhere except in [fold], which the
//! redirect heuristic uses.
use std::borrow::Cow;

/// Casing tier of a term, lower is preferred as canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    /// "Climate change", "Climate Change"
    Standard,
    /// "IPCC", "pH", "CO2" and anything else that is not all-lowercase.
    Other,
    /// "climate change"
    Lowercase,
}

fn tier(term: &str) -> Tier {
    let mut letters = term.chars().filter(|c| c.is_alphabetic());
    let first = match letters.next() {
        Some(c) => c,
        None => return Tier::Other,
    };
    let rest: Vec<char> = letters.collect();
    let rest_all_upper = !rest.is_empty() && rest.iter().all(|c| c.is_uppercase());

    if first.is_uppercase() && !rest_all_upper {
        Tier::Standard
    } else if term == term.to_lowercase() {
        Tier::Lowercase
    } else {
        Tier::Other
    }
}

/// Pick the canonical display form among `candidates`.
///
/// Standard capitalization wins over acronyms/mixed case, which win over
/// all-lowercase; ties go to the first occurrence. This is a heuristic, the
/// result is not guaranteed to be the linguistically correct form.
pub fn canonical_term<S: AsRef<str>>(candidates: &[S]) -> Option<&str> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .enumerate()
        .min_by_key(|(idx, term)| (tier(term), *idx))
        .map(|(_, term)| term)
}

/// Trim a term and replace a Wikipedia URL by its page title.
///
/// Case and pluralization are preserved.
pub fn normalize_term(term: &str) -> String {
    let term = term.trim();
    if term.contains("/wiki/") {
        if let Some(title) = page_title_from_url(term) {
            return title;
        }
    }
    term.to_string()
}

/// Decoded page title of a `/wiki/` URL (`Climate_change#History` -> `Climate change`).
pub fn page_title_from_url(url: &str) -> Option<String> {
    let (_, title) = url.split_once("/wiki/")?;
    let title = title.split(['#', '?']).next().unwrap_or_default();
    if title.is_empty() {
        return None;
    }
    let decoded: Cow<str> = urlencoding::decode(title).unwrap_or(Cow::Borrowed(title));
    Some(decoded.replace('_', " ").trim().to_string())
}

/// Lowercase, underscores as spaces, single-spaced. Used for "differs by more
/// than casing" comparisons.
pub fn fold(term: &str) -> String {
    term.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Replace every character outside `[A-Za-z0-9_]` by `_`.
pub fn sanitize_id(term: &str) -> String {
    term.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
