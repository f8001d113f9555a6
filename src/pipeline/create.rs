//! Encyclopedia creation pipeline
//!
//! Builds an encyclopedia from a wordlist, a raw dictionary or a previously
//! rendered encyclopedia (re-normalization):
//!
//! 1. read raw entries
//! 1. optionally enrich entries lacking a Wikipedia page or a Wikidata id
//!    through the lookup
//! 1. partition by Wikidata id and merge each group
//! 1. assign entry ids
//! 1. classify
//! 1. render and save atomically
use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;

use super::Pipeline;
use crate::classify::Classifier;
use crate::config::Settings;
use crate::entry::history::changes;
use crate::entry::{ActionKind, Encyclopedia, Entry, HistoryAction, Metadata, Statistics, WikidataId};
use crate::error::Error;
use crate::io::{self, Source};
use crate::lookup::Lookup;
use crate::processing::{self, terms};

pub struct Create<'a> {
    src: PathBuf,
    dst: PathBuf,
    title: Option<String>,
    settings: &'a Settings,
    lookup: Option<&'a dyn Lookup>,
}

impl<'a> Create<'a> {
    pub fn new(src: PathBuf, dst: PathBuf, settings: &'a Settings) -> Self {
        Self {
            src,
            dst,
            title: None,
            settings,
            lookup: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_lookup(mut self, lookup: &'a dyn Lookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    fn default_title(&self) -> String {
        self.src
            .file_stem()
            .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
            .unwrap_or_else(|| "Encyclopedia".to_string())
    }
}

/// Fill Wikipedia data of raw entries that lack a page, and Wikidata ids of
/// entries that have a page but no id.
///
/// Entries with a page are looked up by its title and only receive the id,
/// which is what lets them merge with their synonyms. Part of building the raw
/// entry list: no history is recorded. Returns the disambiguation facts learnt
/// on the way, keyed by Wikidata id.
pub fn enrich(entries: &mut [Entry], lookup: &dyn Lookup) -> HashMap<WikidataId, bool> {
    let mut facts = HashMap::new();
    let (mut found, mut identified, mut failed) = (0, 0, 0);
    for entry in entries.iter_mut() {
        let page_title = match entry.wikipedia_url.as_deref() {
            None => None,
            Some(_) if entry.wikidata_id.is_some() => continue,
            Some(url) => match terms::page_title_from_url(url) {
                Some(title) => Some(title),
                None => continue,
            },
        };
        let query = page_title.as_deref().unwrap_or(&entry.search_term);

        let result = match lookup.lookup(query) {
            Ok(result) => result,
            Err(e) => {
                failed += 1;
                debug!("lookup of `{}` failed: {}", query, e);
                continue;
            }
        };
        if page_title.is_some() {
            if result.wikidata_id.is_some() {
                identified += 1;
            }
            entry.wikidata_id = result.wikidata_id;
        } else {
            found += 1;
            entry.wikipedia_url = result.wikipedia_url;
            if entry.wikidata_id.is_none() {
                entry.wikidata_id = result.wikidata_id;
            }
            if entry.description_html.is_none() {
                entry.description_html = result.description_html;
            }
            if result.is_disambiguation {
                entry.disambiguation_options = result.disambiguation_options;
            }
        }
        if let Some(id) = &entry.wikidata_id {
            facts.insert(id.clone(), result.is_disambiguation);
        }
    }
    info!(
        "lookup: {} entries enriched, {} given a Wikidata id, {} without result",
        found, identified, failed
    );
    facts
}

impl Pipeline<Statistics> for Create<'_> {
    fn run(&self) -> Result<Statistics, Error> {
        let source = io::read_source(&self.src)?;
        let title = self
            .title
            .clone()
            .or_else(|| source.title().map(str::to_string))
            .unwrap_or_else(|| self.default_title());

        let (mut metadata, mut raw) = match source {
            Source::Encyclopedia(enc) => {
                info!("re-normalizing existing encyclopedia");
                let mut metadata = enc.metadata;
                metadata.title = title;
                metadata.touch();
                (metadata, enc.entries)
            }
            other => (Metadata::new(title), other.into_entries()),
        };
        let raw_count = raw.len();

        let facts = match self.lookup {
            Some(lookup) => enrich(&mut raw, lookup),
            None => HashMap::new(),
        };

        let mut entries = processing::normalize(raw);
        info!("{} raw entries merged into {}", raw_count, entries.len());

        let mut classifier = Classifier::new(self.settings).with_facts(facts);
        if let Some(lookup) = self.lookup {
            classifier = classifier.with_lookup(lookup);
        }
        classifier.classify_all(&mut entries);

        for entry in entries.iter().filter(|e| {
            e.history()
                .last()
                .map(|r| r.action == HistoryAction::Merged)
                .unwrap_or(false)
        }) {
            metadata.log_action(
                ActionKind::MergeSynonyms,
                Some(&entry.id),
                changes([("synonyms", Value::from(entry.synonyms.clone()))]),
            );
        }
        metadata.log_action(
            ActionKind::Create,
            None,
            changes([
                ("source", Value::from(self.src.to_string_lossy().to_string())),
                ("raw_entries", Value::from(raw_count)),
                ("entries", Value::from(entries.len())),
            ]),
        );

        let mut encyclopedia = Encyclopedia::with_entries(metadata, entries);
        encyclopedia.refresh_feature_counts();
        io::save(&encyclopedia, &self.dst)?;

        Ok(encyclopedia.statistics())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::entry::{Category, HideReason};
    use crate::lookup::{LookupFailure, LookupResult, MapLookup};

    #[test]
    fn wordlist_to_encyclopedia() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("climate_terms.txt");
        let dst = dir.path().join("out.html");
        fs::write(&src, "cutx\nalbedo\n").unwrap();

        let settings = Settings::default();
        let stats = Create::new(src, dst.clone(), &settings).run().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.by_category["no_wikipedia"], 2);

        let enc = io::load(&dst).unwrap();
        assert_eq!(enc.metadata.title, "climate terms");
        assert_eq!(enc.entries[0].id, "cutx");
        assert_eq!(enc.entries[0].hide_reason, Some(HideReason::MissingWikipedia));
        assert_eq!(enc.metadata.actions.last().unwrap().action, ActionKind::Create);
    }

    #[test]
    fn lookup_enrichment_merges_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("terms.txt");
        let dst = dir.path().join("out.html");
        fs::write(&src, "climate change\nglobal warming\nflaky\n").unwrap();

        let page = LookupResult {
            title: "Climate change".into(),
            wikipedia_url: Some("https://en.wikipedia.org/wiki/Climate_change".into()),
            wikidata_id: Some("Q7942".parse().unwrap()),
            description_html: Some("<p>Climate change is...</p>".into()),
            ..Default::default()
        };
        let lookup = MapLookup::new()
            .with_result("climate change", page.clone())
            .with_result("global warming", page)
            .with_failure("flaky", LookupFailure::Transport("reset".into()));

        let settings = Settings::default();
        let stats = Create::new(src, dst.clone(), &settings)
            .with_title(Some("Climate".into()))
            .with_lookup(&lookup)
            .run()
            .unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.merged_groups, 1);

        let enc = io::load(&dst).unwrap();
        let merged = enc.find("Q7942").unwrap();
        assert_eq!(merged.synonyms, vec!["climate change", "global warming"]);
        assert_eq!(merged.category, Some(Category::TrueMatch));
        assert!(enc
            .metadata
            .actions
            .iter()
            .any(|a| a.action == ActionKind::MergeSynonyms));
        assert_eq!(enc.find("flaky").unwrap().category, Some(Category::NoWikipedia));
    }

    #[test]
    fn page_without_id_gets_id_and_merges() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("gases.html");
        let dst = dir.path().join("out.html");
        fs::write(
            &src,
            r#"<div role="ami_dictionary" title="Gases">
<div role="ami_entry" term="greenhouse gases" wikipedia_url="https://en.wikipedia.org/wiki/Greenhouse_gas"></div>
<div role="ami_entry" term="Greenhouse gas" wikidataID="Q167336" wikipedia_url="https://en.wikipedia.org/wiki/Greenhouse_gas"></div>
</div>"#,
        )
        .unwrap();

        let lookup = MapLookup::new().with_result(
            "Greenhouse gas",
            LookupResult {
                title: "Greenhouse gas".into(),
                wikipedia_url: Some("https://en.wikipedia.org/wiki/Other_page".into()),
                wikidata_id: Some("Q167336".parse().unwrap()),
                description_html: Some("<p>Not used.</p>".into()),
                ..Default::default()
            },
        );

        let settings = Settings::default();
        let stats = Create::new(src, dst.clone(), &settings)
            .with_lookup(&lookup)
            .run()
            .unwrap();
        assert_eq!(stats.total_entries, 1);

        let enc = io::load(&dst).unwrap();
        let merged = enc.find("Q167336").unwrap();
        assert_eq!(merged.term, "Greenhouse gas");
        assert_eq!(merged.synonyms, vec!["greenhouse gases", "Greenhouse gas"]);
        assert_eq!(
            merged.wikipedia_url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Greenhouse_gas")
        );
        assert!(merged.description_html.is_none());
    }
}
