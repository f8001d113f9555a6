//! Reading raw dictionaries (`div[role=ami_dictionary]`).
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::entry::{Entry, WikidataId};
use crate::error::Error;

const WIKIPEDIA_BASE: &str = "https://en.wikipedia.org";
const WIKIDATA_ATTRS: [&str; 3] = ["wikidataid", "wikidata_id", "data-wikidata-id"];
const WIKIPEDIA_ATTRS: [&str; 3] = ["wikipedia_url", "wikipediaurl", "wikipedia-url"];

lazy_static! {
    pub(super) static ref ROOT: Selector =
        Selector::parse(r#"div[role="ami_dictionary"]"#).expect("static selector");
    static ref ENTRY: Selector =
        Selector::parse(r#"div[role="ami_entry"]"#).expect("static selector");
    static ref WIKI_LINK: Selector = Selector::parse(r#"a[href*="/wiki/"]"#).expect("static selector");
    static ref PARAGRAPH: Selector = Selector::parse("p").expect("static selector");
    static ref FIRST_PARA: Selector =
        Selector::parse("p.wpage_first_para").expect("static selector");
}

/// Title and raw entries of the dictionary in `doc`.
pub fn parse_document(doc: &Html) -> Result<(Option<String>, Vec<Entry>), Error> {
    let root = doc
        .select(&ROOT)
        .next()
        .ok_or_else(|| Error::parse("dictionary", "no div[role=ami_dictionary] element"))?;
    let title = root.value().attr("title").map(str::to_string);

    let entries = root
        .select(&ENTRY)
        .enumerate()
        .map(|(idx, el)| parse_entry(el, idx))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("parsed {} dictionary entries", entries.len());
    Ok((title, entries))
}

fn first_attr<'a>(el: &'a ElementRef, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|n| el.value().attr(n))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

fn parse_entry(el: ElementRef, idx: usize) -> Result<Entry, Error> {
    let term = first_attr(&el, &["term", "name"]).ok_or_else(|| Error::MissingAttribute {
        element: format!("dictionary entry #{}", idx),
        attribute: "term",
    })?;

    let wikipedia_url = first_attr(&el, &WIKIPEDIA_ATTRS)
        .map(str::to_string)
        .or_else(|| first_wiki_link(&el));

    let search_term = el
        .select(&PARAGRAPH)
        .filter_map(|p| {
            let text = p.text().collect::<String>();
            let trimmed = text.trim();
            let prefix = trimmed.get(..12)?;
            prefix
                .eq_ignore_ascii_case("search term:")
                .then(|| trimmed[12..].trim().to_string())
        })
        .find(|s| !s.is_empty());

    let description = el.select(&FIRST_PARA).next().map(|p| p.html());

    let mut entry = Entry::new(term)
        .with_wikidata_id(WikidataId::parse_lenient(first_attr(&el, &WIKIDATA_ATTRS)))
        .with_wikipedia_url(wikipedia_url)
        .with_description(description);
    if let Some(search_term) = search_term {
        entry.search_term = search_term;
    }
    Ok(entry)
}

/// First Wikipedia article link of the entry, made absolute.
fn first_wiki_link(el: &ElementRef) -> Option<String> {
    let base = Url::parse(WIKIPEDIA_BASE).ok()?;
    el.select(&WIKI_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .find(|url| {
            url.host_str()
                .map(|h| h.ends_with("wikipedia.org"))
                .unwrap_or(false)
        })
        .map(String::from)
}
