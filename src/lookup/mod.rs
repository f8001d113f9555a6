/*! Knowledge-base lookup

The classifier and the `wikipedia` and `images` features consume a [Lookup]. Failures are
ordinary values ([LookupFailure]) that the caller decides how to absorb, they
never abort a run.

[WikipediaClient] talks to the MediaWiki action API; [MapLookup] answers from
memory and is what offline runs and tests use.
!*/
use std::collections::HashMap;
use std::fmt;

use crate::entry::{DisambiguationOption, WikidataId};

mod wikipedia;
pub use wikipedia::WikipediaClient;

/// What the knowledge base knows about one term.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LookupResult {
    /// Page title after redirects.
    pub title: String,
    pub wikipedia_url: Option<String>,
    pub wikidata_id: Option<WikidataId>,
    /// First non-empty paragraph, as HTML.
    pub description_html: Option<String>,
    pub is_disambiguation: bool,
    pub disambiguation_options: Vec<DisambiguationOption>,
    /// `File:` page of the lead image, if the page has one.
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// No page for the term.
    NotFound(String),
    /// Connection, timeout or TLS failure.
    Transport(String),
    /// Non-success HTTP status.
    Http(u16),
    /// Response could not be understood.
    Malformed(String),
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::NotFound(term) => write!(f, "no page found for `{}`", term),
            LookupFailure::Transport(msg) => write!(f, "transport error: {}", msg),
            LookupFailure::Http(status) => write!(f, "http status {}", status),
            LookupFailure::Malformed(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

impl From<reqwest::Error> for LookupFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LookupFailure::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            LookupFailure::Http(status.as_u16())
        } else {
            LookupFailure::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for LookupFailure {
    fn from(e: serde_json::Error) -> Self {
        LookupFailure::Malformed(e.to_string())
    }
}

pub trait Lookup {
    fn lookup(&self, term: &str) -> Result<LookupResult, LookupFailure>;
}

/// Lookup answered from a fixed table. Unknown terms are [LookupFailure::NotFound].
#[derive(Debug, Clone, Default)]
pub struct MapLookup {
    answers: HashMap<String, Result<LookupResult, LookupFailure>>,
}

impl MapLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, term: impl Into<String>, result: LookupResult) -> Self {
        self.answers.insert(term.into(), Ok(result));
        self
    }

    pub fn with_failure(mut self, term: impl Into<String>, failure: LookupFailure) -> Self {
        self.answers.insert(term.into(), Err(failure));
        self
    }
}

impl Lookup for MapLookup {
    fn lookup(&self, term: &str) -> Result<LookupResult, LookupFailure> {
        self.answers
            .get(term)
            .cloned()
            .unwrap_or_else(|| Err(LookupFailure::NotFound(term.to_string())))
    }
}
