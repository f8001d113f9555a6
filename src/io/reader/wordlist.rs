//! Plain wordlists: one term per line.
use std::collections::HashSet;

use crate::entry::Entry;

/// Raw entries for every term of `text`, in order.
///
/// Blank lines and `#` comments are skipped, repeated terms kept once.
pub fn parse_wordlist(text: &str) -> Vec<Entry> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|term| seen.insert(term.to_string()))
        .map(Entry::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_duplicates() {
        let text = "# climate terms\nalbedo\n\n  sea ice \nalbedo\nAlbedo\n";
        let terms: Vec<String> = parse_wordlist(text).into_iter().map(|e| e.term).collect();
        assert_eq!(terms, vec!["albedo", "sea ice", "Albedo"]);
    }
}
