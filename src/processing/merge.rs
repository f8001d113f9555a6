/*! Synonym aggregation.

Folds a [Group] of entries sharing one Wikidata id into one canonical [Entry]:

1. synonyms: union of every member's synonyms and term, case-sensitive, in group order
1. canonical term: see [terms::canonical_term]
1. description: longest non-empty one wins
1. Wikipedia URL: first one, unless several distinct URLs exist and one of them
   matches the canonical term exactly
1. history: members' histories concatenated and sorted by timestamp, plus one
   `merged` (or `normalized` for singletons) record

Merging is idempotent in content, not in version number.
!*/
use std::collections::BTreeSet;

use itertools::Itertools;
use log::{debug, warn};

use super::group::{Group, Partition};
use super::terms;
use crate::entry::history::changes;
use crate::entry::{Entry, HistoryAction, HistoryRecord, Status};

/// Merge every group of `partition`, in store order of first appearance.
pub fn merge_all(partition: Partition) -> Vec<Entry> {
    partition
        .into_ordered_groups()
        .into_iter()
        .filter_map(merge_group)
        .collect()
}

/// Merge one group. `None` only for an empty group.
pub fn merge_group(group: Group) -> Option<Entry> {
    merge(group.members)
}

/// Fold `members` (all sharing one id, or a singleton) into one entry.
pub fn merge(members: Vec<Entry>) -> Option<Entry> {
    let first = members.first()?;

    let mut synonyms = collect_synonyms(&members);
    let canonical = terms::canonical_term(&synonyms)
        .map(str::to_string)
        .unwrap_or_else(|| first.term.clone());
    if synonyms.is_empty() {
        warn!("no usable term in group of `{}`, keeping it as only synonym", canonical);
        synonyms.push(canonical.clone());
    }

    let search_term = members
        .iter()
        .find(|m| terms::normalize_term(&m.term) == canonical)
        .unwrap_or(first)
        .search_term
        .trim()
        .to_string();
    let search_term = if search_term.is_empty() {
        canonical.clone()
    } else {
        search_term
    };

    let wikipedia_url = reconcile_url(&members, &canonical);
    let description_html = best_description(&members);

    let status = if members.iter().all(Entry::is_hidden) {
        Status::Hidden
    } else {
        match members.iter().find(|m| !m.is_hidden()).map(|m| m.status) {
            Some(Status::Processing) | None => Status::Unprocessed,
            Some(status) => status,
        }
    };

    let processed_features: BTreeSet<String> = members
        .iter()
        .flat_map(|m| m.processed_features.iter().cloned())
        .collect();
    let selected_options: Vec<String> = members
        .iter()
        .flat_map(|m| m.selected_options.iter().cloned())
        .unique()
        .collect();
    let disambiguation_options = members
        .iter()
        .map(|m| &m.disambiguation_options)
        .find(|opts| !opts.is_empty())
        .cloned()
        .unwrap_or_default();

    let version = members.iter().map(Entry::version).max().unwrap_or(1) + 1;
    let mut history: Vec<HistoryRecord> = members
        .iter()
        .flat_map(|m| m.history().iter().cloned())
        .collect();
    history.sort_by_key(|r| r.timestamp);

    let (action, record_changes) = if members.len() > 1 {
        let merged_terms: Vec<String> = members.iter().map(|m| m.term.clone()).collect();
        (
            HistoryAction::Merged,
            changes([
                ("canonical_term", serde_json::Value::from(canonical.clone())),
                ("merged_terms", serde_json::Value::from(merged_terms)),
            ]),
        )
    } else {
        (HistoryAction::Normalized, Default::default())
    };
    history.push(HistoryRecord::new(version, action, record_changes));

    debug!(
        "merged {} entr{} into `{}` ({} synonyms)",
        members.len(),
        if members.len() == 1 { "y" } else { "ies" },
        canonical,
        synonyms.len()
    );

    let mut merged = Entry::new(canonical)
        .with_search_term(search_term)
        .with_wikidata_id(first.wikidata_id.clone())
        .with_wikipedia_url(wikipedia_url)
        .with_description(description_html)
        .with_image_url(members.iter().find_map(|m| m.image_url.clone()));
    merged.synonyms = synonyms;
    merged.status = status;
    merged.processed_features = processed_features;
    merged.category = members.iter().find_map(|m| m.category);
    merged.hide_reason = members.iter().find_map(|m| m.hide_reason);
    merged.disambiguation_options = disambiguation_options;
    merged.selected_options = selected_options;
    merged.restore(version, history);

    Some(merged)
}

/// Union of synonyms then term of every member, normalized, first occurrence kept.
fn collect_synonyms(members: &[Entry]) -> Vec<String> {
    members
        .iter()
        .flat_map(|m| m.synonyms.iter().chain(std::iter::once(&m.term)))
        .map(|t| terms::normalize_term(t))
        .filter(|t| !t.is_empty())
        .unique()
        .collect()
}

/// Longest non-empty description, first one on ties.
fn best_description(members: &[Entry]) -> Option<String> {
    members
        .iter()
        .filter_map(|m| m.description_html.as_deref())
        .filter(|d| !d.trim().is_empty())
        .fold(None, |best: Option<&str>, d| match best {
            Some(b) if b.len() >= d.len() => Some(b),
            _ => Some(d),
        })
        .map(str::to_string)
}

fn reconcile_url(members: &[Entry], canonical: &str) -> Option<String> {
    let urls: Vec<&str> = members
        .iter()
        .filter_map(|m| m.wikipedia_url.as_deref())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unique()
        .collect();

    if urls.len() > 1 {
        let id = members[0]
            .wikidata_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();
        warn!(
            "{} distinct Wikipedia URLs under Wikidata id {}: {}",
            urls.len(),
            id,
            urls.iter().join(", ")
        );
        if let Some(exact) = urls
            .iter()
            .find(|u| terms::page_title_from_url(u).as_deref() == Some(canonical))
        {
            return Some(exact.to_string());
        }
    }

    urls.first().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::group::partition;

    fn entry(term: &str, id: Option<&str>) -> Entry {
        Entry::new(term).with_wikidata_id(id.map(|i| i.parse().unwrap()))
    }

    #[test]
    fn climate_change_scenario() {
        let p = partition(vec![
            entry("Climate Change", Some("Q7942")),
            entry("climate change", Some("Q7942")),
            entry("global warming", Some("Q7942")),
        ]);
        let merged = merge_all(p);
        assert_eq!(merged.len(), 1);
        let m = &merged[0];
        assert_eq!(m.term, "Climate Change");
        assert_eq!(
            m.synonyms,
            vec!["Climate Change", "climate change", "global warming"]
        );
        assert_eq!(m.wikidata_id.as_ref().unwrap().as_str(), "Q7942");
    }

    #[test]
    fn merge_is_idempotent_in_content() {
        let once = merge(vec![
            entry("sea level rise", Some("Q1")).with_description(Some("<p>short</p>".into())),
            entry("Sea level rise", Some("Q1"))
                .with_description(Some("<p>a much longer one</p>".into())),
        ])
        .unwrap();
        let twice = merge(vec![once.clone()]).unwrap();

        assert_eq!(once.synonyms, twice.synonyms);
        assert_eq!(once.term, twice.term);
        assert_eq!(once.description_html, twice.description_html);
        assert_eq!(twice.version(), once.version() + 1);
        assert_eq!(twice.history().last().unwrap().action, HistoryAction::Normalized);
    }

    #[test]
    fn longest_description_wins() {
        let m = merge(vec![
            entry("a", Some("Q1")).with_description(Some("<p>abc</p>".into())),
            entry("b", Some("Q1")).with_description(Some("<p>abcdef</p>".into())),
            entry("c", Some("Q1")).with_description(Some("<p>xyzabc</p>".into())),
        ])
        .unwrap();
        assert_eq!(m.description_html.as_deref(), Some("<p>abcdef</p>"));

        let m = merge(vec![entry("a", Some("Q1")), entry("b", Some("Q1"))]).unwrap();
        assert_eq!(m.description_html, None);
    }

    #[test]
    fn url_prefers_canonical_casing() {
        let m = merge(vec![
            entry("ocean acidification", Some("Q2"))
                .with_wikipedia_url(Some("https://en.wikipedia.org/wiki/Acidification".into())),
            entry("Ocean acidification", Some("Q2")).with_wikipedia_url(Some(
                "https://en.wikipedia.org/wiki/Ocean_acidification".into(),
            )),
        ])
        .unwrap();
        assert_eq!(m.term, "Ocean acidification");
        assert_eq!(
            m.wikipedia_url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Ocean_acidification")
        );
    }

    #[test]
    fn url_falls_back_to_first() {
        let m = merge(vec![
            entry("b", Some("Q3")),
            entry("c", Some("Q3")).with_wikipedia_url(Some("https://en.wikipedia.org/wiki/C".into())),
        ])
        .unwrap();
        assert_eq!(m.wikipedia_url.as_deref(), Some("https://en.wikipedia.org/wiki/C"));
    }

    #[test]
    fn history_and_version() {
        let mut a = entry("a", Some("Q5"));
        a.record(HistoryAction::AddedFeature, changes([("feature", "wikipedia")]));
        let b = entry("b", Some("Q5"));
        let expected_len = a.history().len() + b.history().len() + 1;

        let m = merge(vec![a, b]).unwrap();
        assert_eq!(m.version(), 3);
        assert_eq!(m.history().len(), expected_len);
        assert!(m
            .history()
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
        let last = m.history().last().unwrap();
        assert_eq!(last.action, HistoryAction::Merged);
        assert_eq!(last.version, 3);
    }

    #[test]
    fn singleton_passes_through() {
        let e = entry("cutx", None);
        let m = merge(vec![e.clone()]).unwrap();
        assert_eq!(m.term, "cutx");
        assert_eq!(m.synonyms, vec!["cutx"]);
        assert_eq!(m.version(), 2);
        assert_eq!(m.history().len(), e.history().len() + 1);
        assert_eq!(&m.history()[..1], e.history());
    }

    #[test]
    fn features_union_and_status() {
        let mut a = entry("a", Some("Q9"));
        a.processed_features.insert("wikipedia".into());
        a.status = Status::Hidden;
        let mut b = entry("b", Some("Q9"));
        b.status = Status::Processed;
        let m = merge(vec![a, b]).unwrap();
        assert!(m.has_feature("wikipedia"));
        assert_eq!(m.status, Status::Processed);
    }

    #[test]
    fn empty_group() {
        assert!(merge(vec![]).is_none());
    }

    #[test]
    fn blank_terms_still_leave_one_synonym() {
        let m = merge(vec![entry(" ", None)]).unwrap();
        assert_eq!(m.synonyms.len(), 1);
        assert_eq!(m.synonyms[0], m.term);
    }
}
