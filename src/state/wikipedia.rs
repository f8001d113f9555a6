//! The `wikipedia` feature: attach page, Wikidata id and description.
use super::{FeatureError, FeatureHandler, FeatureOutcome};
use crate::entry::Entry;
use crate::lookup::{Lookup, LookupFailure};

pub const WIKIPEDIA: &str = "wikipedia";

pub struct WikipediaFeature<L> {
    lookup: L,
}

impl<L: Lookup> WikipediaFeature<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }
}

impl<L: Lookup> FeatureHandler for WikipediaFeature<L> {
    fn name(&self) -> &str {
        WIKIPEDIA
    }

    fn apply(&self, entry: &Entry) -> Result<FeatureOutcome, FeatureError> {
        let result = match self.lookup.lookup(&entry.search_term) {
            Ok(result) => result,
            Err(LookupFailure::NotFound(term)) => {
                return Ok(FeatureOutcome::Skipped(format!(
                    "no Wikipedia page for `{}`",
                    term
                )))
            }
            Err(e) => return Err(e.into()),
        };

        let mut updated = entry.clone();
        if result.wikipedia_url.is_some() {
            updated.wikipedia_url = result.wikipedia_url;
        }
        match (&entry.wikidata_id, result.wikidata_id) {
            (None, found) => updated.wikidata_id = found,
            (Some(own), Some(found)) if *own != found => warn!(
                "`{}`: page `{}` has Wikidata id {}, keeping {}",
                entry.term, result.title, found, own
            ),
            _ => {}
        }
        if result.description_html.is_some() {
            updated.description_html = result.description_html;
        }
        if result.is_disambiguation {
            updated.disambiguation_options = result.disambiguation_options;
        }
        Ok(FeatureOutcome::Applied(updated))
    }
}
