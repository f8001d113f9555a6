use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::history::{Changes, HistoryAction, HistoryRecord};
use super::WikidataId;
use crate::error::Error;

/// Per-entry workflow state. Independent of [Category].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Unprocessed,
    Processing,
    Processed,
    Skipped,
    Hidden,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Unprocessed,
        Status::Processing,
        Status::Processed,
        Status::Skipped,
        Status::Hidden,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unprocessed => "unprocessed",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Skipped => "skipped",
            Self::Hidden => "hidden",
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::parse("entry status", format!("unknown status `{}`", s)))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of Wikipedia match an entry has. Assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TrueMatch,
    Disambiguation,
    Redirect,
    NoWikipedia,
    GeneralTerm,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::TrueMatch,
        Category::Disambiguation,
        Category::Redirect,
        Category::NoWikipedia,
        Category::GeneralTerm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrueMatch => "true_match",
            Self::Disambiguation => "disambiguation",
            Self::Redirect => "redirect",
            Self::NoWikipedia => "no_wikipedia",
            Self::GeneralTerm => "general_term",
        }
    }

    /// CSS class used for visual distinction of the entry container.
    pub fn css_class(&self) -> String {
        format!("category-{}", self.as_str().replace('_', "-"))
    }

    /// Hide reason pre-selected for this category, if any.
    pub fn default_hide_reason(&self) -> Option<HideReason> {
        match self {
            Self::NoWikipedia => Some(HideReason::MissingWikipedia),
            Self::GeneralTerm => Some(HideReason::GeneralTerm),
            _ => None,
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::parse("entry category", format!("unknown category `{}`", s)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the hide checkbox of an entry is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HideReason {
    MissingWikipedia,
    GeneralTerm,
    FalseWikipedia,
    UserSelected,
}

impl HideReason {
    pub const ALL: [HideReason; 4] = [
        HideReason::MissingWikipedia,
        HideReason::GeneralTerm,
        HideReason::FalseWikipedia,
        HideReason::UserSelected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingWikipedia => "missing_wikipedia",
            Self::GeneralTerm => "general_term",
            Self::FalseWikipedia => "false_wikipedia",
            Self::UserSelected => "user_selected",
        }
    }

    /// Reasons set by the classifier rather than by a user.
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::MissingWikipedia | Self::GeneralTerm)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingWikipedia => "Hide (missing Wikipedia)",
            Self::GeneralTerm => "Hide (general term)",
            Self::FalseWikipedia => "Hide (wrong Wikipedia page)",
            Self::UserSelected => "Hide",
        }
    }
}

impl FromStr for HideReason {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HideReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| Error::parse("hide reason", format!("unknown reason `{}`", s)))
    }
}

impl fmt::Display for HideReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One target listed on a disambiguation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisambiguationOption {
    pub label: String,
    pub url: String,
}

/// One term's knowledge record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Document-unique identifier (`data-entry-id`), assigned after merging.
    pub id: String,
    pub term: String,
    pub search_term: String,
    pub wikidata_id: Option<WikidataId>,
    pub wikipedia_url: Option<String>,
    pub description_html: Option<String>,
    /// Wikipedia `File:` page of the article's lead image.
    pub image_url: Option<String>,
    pub category: Option<Category>,
    pub hide_reason: Option<HideReason>,
    /// All terms subsumed into this entry, unique, in insertion order.
    pub synonyms: Vec<String>,
    pub status: Status,
    pub processed_features: BTreeSet<String>,
    pub disambiguation_options: Vec<DisambiguationOption>,
    /// URLs of the disambiguation options a user picked.
    pub selected_options: Vec<String>,
    version: u32,
    history: Vec<HistoryRecord>,
}

impl Entry {
    /// Fresh entry as emitted by the dictionary step: version 1, unprocessed,
    /// synonyms = `[term]`.
    pub fn new(term: impl Into<String>) -> Self {
        let term = term.into();
        Self {
            id: String::new(),
            search_term: term.clone(),
            synonyms: vec![term.clone()],
            term,
            wikidata_id: None,
            wikipedia_url: None,
            description_html: None,
            image_url: None,
            category: None,
            hide_reason: None,
            status: Status::Unprocessed,
            processed_features: BTreeSet::new(),
            disambiguation_options: Vec::new(),
            selected_options: Vec::new(),
            version: 1,
            history: vec![HistoryRecord::new(1, HistoryAction::Created, Changes::new())],
        }
    }

    pub fn with_wikidata_id(mut self, id: Option<WikidataId>) -> Self {
        self.wikidata_id = id;
        self
    }

    pub fn with_wikipedia_url(mut self, url: Option<String>) -> Self {
        self.wikipedia_url = url;
        self
    }

    pub fn with_description(mut self, description_html: Option<String>) -> Self {
        self.description_html = description_html;
        self
    }

    pub fn with_image_url(mut self, url: Option<String>) -> Self {
        self.image_url = url;
        self
    }

    pub fn with_search_term(mut self, search_term: impl Into<String>) -> Self {
        self.search_term = search_term.into();
        self
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.processed_features.contains(feature)
    }

    pub fn is_hidden(&self) -> bool {
        self.status == Status::Hidden
    }

    /// Record one mutation: bump the version by one and append one history record.
    pub fn record(&mut self, action: HistoryAction, changes: Changes) {
        self.version += 1;
        self.history
            .push(HistoryRecord::new(self.version, action, changes));
    }

    /// Replace version and history wholesale.
    ///
    /// Only used when rebuilding an entry from persisted state or when the
    /// aggregator folds several histories into one.
    pub(crate) fn restore(&mut self, version: u32, history: Vec<HistoryRecord>) {
        self.version = version.max(1);
        self.history = history;
    }

    /// `true` if the description has visible text, not just empty markup.
    pub fn has_description(&self) -> bool {
        self.description_html
            .as_deref()
            .map(|html| {
                scraper::Html::parse_fragment(html)
                    .root_element()
                    .text()
                    .any(|t| !t.trim().is_empty())
            })
            .unwrap_or(false)
    }
}
