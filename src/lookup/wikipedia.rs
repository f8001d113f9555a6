//! MediaWiki action API client.
use std::collections::BTreeMap;
use std::time::Duration;

use lazy_static::lazy_static;
use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

use super::{Lookup, LookupFailure, LookupResult};
use crate::config::Settings;
use crate::entry::{DisambiguationOption, WikidataId};
use crate::error::Error;

lazy_static! {
    static ref PARAGRAPH: scraper::Selector =
        scraper::Selector::parse("p").expect("static selector");
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    missing: Option<serde_json::Value>,
    invalid: Option<serde_json::Value>,
    extract: Option<String>,
    fullurl: Option<String>,
    /// Lead image file name, without the `File:` prefix.
    pageimage: Option<String>,
    #[serde(default)]
    pageprops: PageProps,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Default, Deserialize)]
struct PageProps {
    wikibase_item: Option<String>,
    disambiguation: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Link {
    ns: i64,
    title: String,
}

/// Blocking Wikipedia client. One attempt per request, no retry.
#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    base_url: String,
    option_limit: usize,
}

impl WikipediaClient {
    pub fn new(settings: &Settings) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.wikipedia_base_url.trim_end_matches('/').to_string(),
            option_limit: settings.disambiguation_option_limit,
        })
    }

    fn api_url(&self, params: &[(&str, &str)]) -> Result<Url, LookupFailure> {
        let endpoint = format!("{}/w/api.php", self.base_url);
        Url::parse_with_params(&endpoint, params)
            .map_err(|e| LookupFailure::Transport(format!("invalid url {}: {}", endpoint, e)))
    }

    fn query(&self, params: &[(&str, &str)]) -> Result<Option<Page>, LookupFailure> {
        let url = self.api_url(params)?;
        debug!("GET {}", url);
        let response = self.client.get(url).send()?.error_for_status()?;
        let body = response.text()?;
        let parsed: ApiResponse = serde_json::from_str(&body)?;
        Ok(parsed
            .query
            .and_then(|q| q.pages.into_values().next())
            .filter(|p| p.missing.is_none() && p.invalid.is_none()))
    }

    /// Article links of a disambiguation page.
    fn options(&self, title: &str) -> Result<Vec<DisambiguationOption>, LookupFailure> {
        let limit = self.option_limit.to_string();
        let page = self.query(&[
            ("action", "query"),
            ("prop", "links"),
            ("plnamespace", "0"),
            ("pllimit", &limit),
            ("titles", title),
            ("format", "json"),
        ])?;
        Ok(page
            .map(|p| {
                p.links
                    .into_iter()
                    .filter(|l| l.ns == 0)
                    .map(|l| DisambiguationOption {
                        url: page_url(&self.base_url, &l.title),
                        label: l.title,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl Lookup for WikipediaClient {
    fn lookup(&self, term: &str) -> Result<LookupResult, LookupFailure> {
        let page = self
            .query(&[
                ("action", "query"),
                ("prop", "extracts|pageprops|info|pageimages"),
                ("inprop", "url"),
                ("piprop", "name"),
                ("redirects", "1"),
                ("exintro", "1"),
                ("titles", term),
                ("format", "json"),
            ])?
            .ok_or_else(|| LookupFailure::NotFound(term.to_string()))?;

        let is_disambiguation = page.pageprops.disambiguation.is_some();
        let disambiguation_options = if is_disambiguation {
            self.options(&page.title).unwrap_or_else(|e| {
                warn!("could not list options of `{}`: {}", page.title, e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        Ok(LookupResult {
            wikipedia_url: Some(
                page.fullurl
                    .unwrap_or_else(|| page_url(&self.base_url, &page.title)),
            ),
            wikidata_id: WikidataId::parse_lenient(page.pageprops.wikibase_item.as_deref()),
            description_html: page.extract.as_deref().and_then(first_paragraph),
            is_disambiguation,
            disambiguation_options,
            image_url: page
                .pageimage
                .as_deref()
                .map(|name| file_url(&self.base_url, name)),
            title: page.title,
        })
    }
}

/// `https://en.wikipedia.org/wiki/Sea_level_rise` for `Sea level rise`.
pub(crate) fn page_url(base_url: &str, title: &str) -> String {
    format!(
        "{}/wiki/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&title.replace(' ', "_"))
    )
}

/// `https://en.wikipedia.org/wiki/File:Albedo-e_hg.svg` for `Albedo-e hg.svg`.
pub(crate) fn file_url(base_url: &str, name: &str) -> String {
    format!(
        "{}/wiki/File:{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&name.replace(' ', "_"))
    )
}

/// First `<p>` of `html` that has visible text, as outer HTML.
pub(crate) fn first_paragraph(html: &str) -> Option<String> {
    scraper::Html::parse_fragment(html)
        .select(&PARAGRAPH)
        .find(|p| p.text().any(|t| !t.trim().is_empty()))
        .map(|p| p.html())
}
