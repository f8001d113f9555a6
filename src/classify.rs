/*! Entry classification

Labels merged entries with a [Category], first matching rule wins:

1. no Wikipedia URL: [Category::NoWikipedia]
1. disambiguation page: [Category::Disambiguation], see [Classifier::detect_disambiguation]
1. page title differs from the search term by more than casing: [Category::Redirect]
1. single short or listed word without Wikidata id: [Category::GeneralTerm]
1. otherwise [Category::TrueMatch]

The redirect rule is a plain folded-string comparison. It also flags legitimate
synonym variants ("global warming" landing on "Climate change") and persisted
documents rely on that behaviour.

Classification sets `category` and the automatic hide reason only. It is not
a versioned mutation and leaves status and history untouched.
!*/
use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::Settings;
use crate::entry::{Category, DisambiguationOption, Entry, WikidataId};
use crate::lookup::Lookup;
use crate::processing::terms;

const DISAMBIGUATION_MARKERS: [&str; 2] = ["(disambiguation)", "%28disambiguation%29"];

/// Outcome of the disambiguation check.
#[derive(Debug, Clone, PartialEq)]
enum Disambiguation {
    No,
    /// Options are empty when nothing is known about them.
    Yes(Vec<DisambiguationOption>),
}

pub struct Classifier<'a> {
    settings: &'a Settings,
    /// Cached "instance of: disambiguation page" facts.
    facts: HashMap<WikidataId, bool>,
    lookup: Option<&'a dyn Lookup>,
}

impl<'a> Classifier<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            facts: HashMap::new(),
            lookup: None,
        }
    }

    /// Use `lookup` as last resort for disambiguation detection.
    pub fn with_lookup(mut self, lookup: &'a dyn Lookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Add known disambiguation facts, keyed by Wikidata id.
    pub fn with_facts(mut self, facts: impl IntoIterator<Item = (WikidataId, bool)>) -> Self {
        self.facts.extend(facts);
        self
    }

    /// Classify every entry, in place.
    pub fn classify_all(&self, entries: &mut [Entry]) {
        let mut counts: HashMap<Category, usize> = HashMap::new();
        for entry in entries.iter_mut() {
            *counts.entry(self.classify(entry)).or_insert(0) += 1;
        }
        info!(
            "classified {} entries: {}",
            entries.len(),
            Category::ALL
                .iter()
                .map(|c| format!("{}={}", c, counts.get(c).copied().unwrap_or(0)))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    /// Set `category` and the automatic hide reason of `entry`.
    pub fn classify(&self, entry: &mut Entry) -> Category {
        let category = match entry.wikipedia_url.as_deref() {
            None => Category::NoWikipedia,
            Some(url) => match self.detect_disambiguation(entry, url) {
                Disambiguation::Yes(options) => {
                    if entry.disambiguation_options.is_empty() {
                        entry.disambiguation_options = options;
                    }
                    Category::Disambiguation
                }
                Disambiguation::No if is_redirect(url, &entry.search_term) => Category::Redirect,
                Disambiguation::No if self.is_general_term(entry) => Category::GeneralTerm,
                Disambiguation::No => Category::TrueMatch,
            },
        };

        debug!("{} `{}` -> {}", entry.id, entry.term, category);
        entry.category = Some(category);
        apply_hide_default(entry, category);
        category
    }

    /// Checks, in order: cached facts (and an earlier classification), the URL
    /// marker, then the lookup. A failing lookup counts as "not a
    /// disambiguation page".
    fn detect_disambiguation(&self, entry: &Entry, url: &str) -> Disambiguation {
        let cached = entry
            .wikidata_id
            .as_ref()
            .and_then(|id| self.facts.get(id).copied())
            .or_else(|| (entry.category == Some(Category::Disambiguation)).then_some(true));

        let page = terms::page_title_from_url(url).unwrap_or_else(|| entry.search_term.clone());

        match cached {
            Some(false) => Disambiguation::No,
            Some(true) => Disambiguation::Yes(self.options_for(entry, &page)),
            None if has_marker(url) => Disambiguation::Yes(self.options_for(entry, &page)),
            None => match self.lookup.map(|l| l.lookup(&page)) {
                None => Disambiguation::No,
                Some(Ok(result)) if result.is_disambiguation => {
                    Disambiguation::Yes(result.disambiguation_options)
                }
                Some(Ok(_)) => Disambiguation::No,
                Some(Err(e)) => {
                    warn!(
                        "disambiguation check for `{}` failed ({}), assuming true match",
                        entry.term, e
                    );
                    Disambiguation::No
                }
            },
        }
    }

    /// Known options of a disambiguation entry, fetched when missing.
    fn options_for(&self, entry: &Entry, page: &str) -> Vec<DisambiguationOption> {
        if !entry.disambiguation_options.is_empty() {
            return entry.disambiguation_options.clone();
        }
        match self.lookup.map(|l| l.lookup(page)) {
            Some(Ok(result)) => result.disambiguation_options,
            Some(Err(e)) => {
                warn!("could not fetch options of `{}`: {}", page, e);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn is_general_term(&self, entry: &Entry) -> bool {
        if entry.wikidata_id.is_some() {
            return false;
        }
        let mut words = entry.term.unicode_words();
        match (words.next(), words.next()) {
            (Some(word), None) => {
                word.chars().count() <= self.settings.general_term_max_chars
                    || self.settings.is_general_term(word)
            }
            _ => false,
        }
    }
}

fn has_marker(url: &str) -> bool {
    let lower = url.to_lowercase();
    DISAMBIGUATION_MARKERS.iter().any(|m| lower.contains(m))
}

fn is_redirect(url: &str, search_term: &str) -> bool {
    match terms::page_title_from_url(url) {
        Some(title) => terms::fold(&title) != terms::fold(search_term),
        None => false,
    }
}

/// Pre-select the hide checkbox for categories that warrant it. Reasons set by
/// a user are kept.
fn apply_hide_default(entry: &mut Entry, category: Category) {
    let user_reason = entry.hide_reason.filter(|r| !r.is_automatic());
    entry.hide_reason = user_reason.or_else(|| category.default_hide_reason());
}
