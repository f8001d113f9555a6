/*! Input reading

Three input shapes are understood:

- plain wordlists (`.txt`), see [parse_wordlist]
- raw dictionaries (`div[role=ami_dictionary]`)
- rendered encyclopedias (`div[role=ami_encyclopedia]`), which are also the
  persisted state of incremental runs
!*/
mod dictionary;
mod encyclopedia;
mod wordlist;

use std::fs;
use std::path::Path;

use scraper::Html;

use crate::entry::{Encyclopedia, Entry};
use crate::error::Error;

pub use wordlist::parse_wordlist;

/// What a `create` input turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Wordlist(Vec<Entry>),
    Dictionary {
        title: Option<String>,
        entries: Vec<Entry>,
    },
    Encyclopedia(Encyclopedia),
}

impl Source {
    /// Document title, if the input carries one.
    pub fn title(&self) -> Option<&str> {
        match self {
            Source::Wordlist(_) => None,
            Source::Dictionary { title, .. } => title.as_deref(),
            Source::Encyclopedia(enc) => Some(&enc.metadata.title),
        }
    }

    pub fn into_entries(self) -> Vec<Entry> {
        match self {
            Source::Wordlist(entries) | Source::Dictionary { entries, .. } => entries,
            Source::Encyclopedia(enc) => enc.entries,
        }
    }
}

/// Parse a rendered encyclopedia.
pub fn parse(html: &str) -> Result<Encyclopedia, Error> {
    encyclopedia::parse_document(&Html::parse_document(html))
}

/// Load a rendered encyclopedia from `path`.
pub fn load(path: &Path) -> Result<Encyclopedia, Error> {
    let html = fs::read_to_string(path)?;
    let enc = parse(&html)?;
    info!("loaded {} entries from {:?}", enc.len(), path);
    Ok(enc)
}

/// Parse an HTML input, encyclopedia or dictionary.
pub fn parse_source(html: &str) -> Result<Source, Error> {
    let doc = Html::parse_document(html);
    if doc.select(&encyclopedia::ROOT).next().is_some() {
        return encyclopedia::parse_document(&doc).map(Source::Encyclopedia);
    }
    if doc.select(&dictionary::ROOT).next().is_some() {
        let (title, entries) = dictionary::parse_document(&doc)?;
        return Ok(Source::Dictionary { title, entries });
    }
    Err(Error::parse(
        "input",
        "neither div[role=ami_encyclopedia] nor div[role=ami_dictionary] found",
    ))
}

/// Read any supported input from `path`. `.txt` files are wordlists.
pub fn read_source(path: &Path) -> Result<Source, Error> {
    let content = fs::read_to_string(path)?;
    let is_wordlist = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    let source = if is_wordlist {
        Source::Wordlist(parse_wordlist(&content))
    } else {
        parse_source(&content)?
    };
    info!(
        "read {} raw entries from {:?}",
        match &source {
            Source::Wordlist(e) | Source::Dictionary { entries: e, .. } => e.len(),
            Source::Encyclopedia(enc) => enc.len(),
        },
        path
    );
    Ok(source)
}
