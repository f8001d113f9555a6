//! Reading back a rendered encyclopedia.
use std::collections::BTreeSet;

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::entry::{
    DisambiguationOption, Encyclopedia, Entry, HideReason, HistoryRecord, Metadata, WikidataId,
};
use crate::error::Error;

lazy_static! {
    pub(super) static ref ROOT: Selector =
        Selector::parse(r#"div[role="ami_encyclopedia"]"#).expect("static selector");
    static ref ENTRY: Selector =
        Selector::parse(r#"div[role="ami_entry"]"#).expect("static selector");
    static ref SYNONYM: Selector =
        Selector::parse("ul.synonym_list > li").expect("static selector");
    static ref DESCRIPTION: Selector =
        Selector::parse("div.entry-description").expect("static selector");
    static ref HIDE: Selector =
        Selector::parse("input.entry-hide-checkbox").expect("static selector");
    static ref OPTIONS: Selector =
        Selector::parse("div.disambiguation-options").expect("static selector");
    static ref LABEL: Selector = Selector::parse("label").expect("static selector");
    static ref OPTION_INPUT: Selector =
        Selector::parse("input.disambiguation-checkbox").expect("static selector");
    static ref LINK: Selector = Selector::parse("a").expect("static selector");
    static ref IMAGE: Selector =
        Selector::parse("a.wikipedia-image-link").expect("static selector");
}

/// Parse the encyclopedia in `doc`.
///
/// All-or-nothing: the first malformed status, version, category or feature
/// list fails the whole load. Malformed history is the exception, it is
/// logged and read as empty.
pub fn parse_document(doc: &Html) -> Result<Encyclopedia, Error> {
    let root = doc
        .select(&ROOT)
        .next()
        .ok_or_else(|| Error::parse("encyclopedia", "no div[role=ami_encyclopedia] element"))?;

    let metadata = match root.value().attr("data-metadata") {
        Some(json) => serde_json::from_str::<Metadata>(json)
            .map_err(|e| Error::parse("encyclopedia metadata", e.to_string()))?,
        None => Metadata::new(root.value().attr("title").unwrap_or("Encyclopedia")),
    };

    let entries = root
        .select(&ENTRY)
        .enumerate()
        .map(|(idx, el)| parse_entry(el, idx))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("parsed {} entries", entries.len());
    Ok(Encyclopedia::with_entries(metadata, entries))
}

fn parse_entry(el: ElementRef, idx: usize) -> Result<Entry, Error> {
    let attrs = el.value();
    let id = attrs.attr("data-entry-id").unwrap_or_default().to_string();
    let owner = if id.is_empty() {
        format!("entry #{}", idx)
    } else {
        format!("entry `{}`", id)
    };
    let term = attrs
        .attr("term")
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::MissingAttribute {
            element: owner.clone(),
            attribute: "term",
        })?;

    let mut entry = Entry::new(term)
        .with_search_term(attrs.attr("data-search-term").unwrap_or(term))
        .with_wikidata_id(WikidataId::parse_lenient(attrs.attr("wikidataid")))
        .with_wikipedia_url(attrs.attr("data-wikipedia-url").map(str::to_string))
        .with_description(el.select(&DESCRIPTION).next().map(|d| d.inner_html()))
        .with_image_url(
            el.select(&IMAGE)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string),
        );
    entry.id = id;

    if let Some(category) = attrs.attr("data-category") {
        entry.category = Some(category.parse()?);
    }
    if let Some(status) = attrs.attr("data-status") {
        entry.status = status.parse()?;
    }
    if let Some(features) = attrs.attr("data-features") {
        entry.processed_features = serde_json::from_str::<BTreeSet<String>>(features)
            .map_err(|e| Error::parse(format!("features of {}", owner), e.to_string()))?;
    }

    let synonyms: Vec<String> = el
        .select(&SYNONYM)
        .map(|li| li.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !synonyms.is_empty() {
        entry.synonyms = synonyms;
    }

    if let Some(hide) = el.select(&HIDE).next() {
        if hide.value().attr("checked").is_some() {
            let reason: HideReason = hide
                .value()
                .attr("data-reason")
                .unwrap_or("user_selected")
                .parse()?;
            entry.hide_reason = Some(reason);
        }
    }

    if let Some(wrapper) = el.select(&OPTIONS).next() {
        let fallback = wrapper.value().attr("data-fallback").is_some();
        for label in wrapper.select(&LABEL) {
            let input = match label.select(&OPTION_INPUT).next() {
                Some(input) => input,
                None => continue,
            };
            let url = match input.value().attr("data-wikipedia-url") {
                Some(url) => url.to_string(),
                None => continue,
            };
            if input.value().attr("checked").is_some() {
                entry.selected_options.push(url.clone());
            }
            if !fallback {
                let text = label
                    .select(&LINK)
                    .next()
                    .map(|a| a.text().collect::<String>())
                    .unwrap_or_default();
                entry.disambiguation_options.push(DisambiguationOption {
                    label: text.trim().to_string(),
                    url,
                });
            }
        }
    }

    let version = match attrs.attr("data-version") {
        Some(v) => v.trim().parse::<u32>().map_err(|e| {
            Error::parse(format!("version of {}", owner), format!("`{}`: {}", v, e))
        })?,
        None => 1,
    };
    let history = match attrs.attr("data-history") {
        Some(json) => serde_json::from_str::<Vec<HistoryRecord>>(json).unwrap_or_else(|e| {
            warn!("malformed history on {}, using empty history: {}", owner, e);
            Vec::new()
        }),
        None => Vec::new(),
    };
    entry.restore(version, history);

    Ok(entry)
}
