/*! HTML rendering

Serializes an [Encyclopedia] into the persisted HTML document. The document is
both the browsable output and the state read back by [crate::io::parse].

Rendering is pure: no timestamp or counter is touched here, so rendering an
unchanged encyclopedia twice gives identical bytes. Description HTML is
re-serialized through html5ever before being written, which makes it stable
across parse/render cycles.

```text
<div role="ami_encyclopedia" title=".." data-metadata="{..}">
  <div role="ami_entry" data-entry-id=".." data-status=".." data-history="[..]" ..>
    <div class="entry-checkboxes">..</div>
    <a class="wikipedia-link">..</a> <a class="wikidata-link">..</a>
    <a class="wikipedia-image-link">..</a>
    <ul class="synonym_list"><li>..</li></ul>
    <div class="entry-description">..</div>
  </div>
</div>
```
!*/
use std::fmt;

mod escape;
mod style;

use escape::{attr, text};

use crate::entry::{Category, DisambiguationOption, Encyclopedia, Entry, HideReason};

pub use style::STYLESHEET;

/// Render `encyclopedia` to a complete HTML document.
pub fn render(encyclopedia: &Encyclopedia) -> String {
    Document(encyclopedia).to_string()
}

/// Render one entry container.
pub fn render_entry(entry: &Entry) -> String {
    EntryHtml(entry).to_string()
}

/// Canonical serialization of an HTML fragment.
pub fn normalize_fragment(html: &str) -> String {
    scraper::Html::parse_fragment(html)
        .root_element()
        .inner_html()
}

/// JSON for an attribute, `fallback` if serialization fails.
fn json_attr<T: serde::Serialize>(value: &T, what: &str, owner: &str, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!("could not serialize {} of {}: {}", what, owner, e);
        fallback.to_string()
    })
}

struct Document<'a>(&'a Encyclopedia);

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let enc = self.0;
        let metadata = json_attr(&enc.metadata, "metadata", "document", "{}");
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html>")?;
        writeln!(f, "<head>")?;
        writeln!(f, "<meta charset=\"utf-8\"/>")?;
        writeln!(f, "<title>{}</title>", text(&enc.metadata.title))?;
        writeln!(f, "<style>\n{}\n</style>", STYLESHEET)?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        writeln!(
            f,
            "<div role=\"ami_encyclopedia\" title=\"{}\" data-metadata=\"{}\">",
            attr(&enc.metadata.title),
            attr(&metadata)
        )?;
        for entry in &enc.entries {
            write!(f, "{}", EntryHtml(entry))?;
        }
        writeln!(f, "</div>")?;
        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

struct EntryHtml<'a>(&'a Entry);

impl EntryHtml<'_> {
    fn write_open(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.0;
        let class = match e.category {
            Some(category) => format!("encyclopedia-entry {}", category.css_class()),
            None => "encyclopedia-entry".to_string(),
        };
        let history = json_attr(&e.history(), "history", &e.id, "[]");
        let features = json_attr(&e.processed_features, "features", &e.id, "[]");

        write!(
            f,
            "<div role=\"ami_entry\" class=\"{}\" data-entry-id=\"{}\" term=\"{}\" data-search-term=\"{}\"",
            class,
            attr(&e.id),
            attr(&e.term),
            attr(&e.search_term)
        )?;
        if let Some(id) = &e.wikidata_id {
            write!(f, " wikidataID=\"{}\"", attr(id.as_str()))?;
        }
        if let Some(url) = &e.wikipedia_url {
            write!(f, " data-wikipedia-url=\"{}\"", attr(url))?;
        }
        if let Some(category) = e.category {
            write!(f, " data-category=\"{}\"", category)?;
        }
        writeln!(
            f,
            " data-status=\"{}\" data-version=\"{}\" data-history=\"{}\" data-features=\"{}\">",
            e.status,
            e.version(),
            attr(&history),
            attr(&features)
        )
    }

    fn write_checkboxes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.0;
        writeln!(f, "<div class=\"entry-checkboxes\">")?;

        let reason = e.hide_reason.unwrap_or(HideReason::UserSelected);
        writeln!(
            f,
            "<label><input type=\"checkbox\" class=\"entry-hide-checkbox\" data-entry-id=\"{}\" data-reason=\"{}\"{}/> {}</label>",
            attr(&e.id),
            reason,
            checked(e.hide_reason.is_some()),
            text(reason.label())
        )?;

        if e.synonyms.len() > 1 {
            let id = e.wikidata_id.as_ref().map(|id| id.as_str()).unwrap_or("");
            writeln!(
                f,
                "<label><input type=\"checkbox\" class=\"merge-synonyms-checkbox\" data-wikidata-id=\"{}\" checked/> Merge synonyms ({})</label>",
                attr(id),
                e.synonyms.len()
            )?;
        }

        if e.category == Some(Category::Disambiguation) || !e.disambiguation_options.is_empty() {
            self.write_disambiguation(f)?;
        }
        writeln!(f, "</div>")
    }

    /// One checkbox per option. Known options are written whatever the
    /// category, so that they survive until the next classification. Without
    /// known options the entry's own page is offered, and the wrapper is marked
    /// so that parsing does not store it.
    fn write_disambiguation(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.0;
        let fallback;
        let (options, is_fallback): (&[DisambiguationOption], bool) =
            if e.disambiguation_options.is_empty() {
                fallback = e
                    .wikipedia_url
                    .iter()
                    .map(|url| DisambiguationOption {
                        label: e.term.clone(),
                        url: url.clone(),
                    })
                    .collect::<Vec<_>>();
                (&fallback, true)
            } else {
                (&e.disambiguation_options, false)
            };

        writeln!(
            f,
            "<div class=\"disambiguation-options\"{}>",
            if is_fallback { " data-fallback=\"true\"" } else { "" }
        )?;
        writeln!(f, "<p>Which page is meant?</p>")?;
        for option in options {
            let selected = e.selected_options.iter().any(|s| *s == option.url);
            writeln!(
                f,
                "<label><input type=\"checkbox\" class=\"disambiguation-checkbox\" data-wikipedia-url=\"{url}\"{checked}/> <a href=\"{url}\" target=\"_blank\">{label}</a></label>",
                url = attr(&option.url),
                checked = checked(selected),
                label = text(&option.label)
            )?;
        }
        writeln!(f, "</div>")
    }

    fn write_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.0;
        if let Some(url) = &e.wikipedia_url {
            writeln!(
                f,
                "<a class=\"wikipedia-link\" href=\"{}\" target=\"_blank\">Wikipedia</a>",
                attr(url)
            )?;
        }
        if let Some(id) = &e.wikidata_id {
            writeln!(
                f,
                "<a class=\"wikidata-link\" href=\"{}\" target=\"_blank\">{}</a>",
                attr(&id.url()),
                id
            )?;
        }
        if let Some(url) = &e.image_url {
            let label = crate::processing::terms::page_title_from_url(url)
                .unwrap_or_else(|| "View image on Wikipedia".to_string());
            writeln!(
                f,
                "<a class=\"wikipedia-image-link\" href=\"{}\" target=\"_blank\">{}</a>",
                attr(url),
                text(&label)
            )?;
        }
        if e.synonyms.len() != 1 || e.synonyms[0] != e.term {
            write!(f, "<ul class=\"synonym_list\">")?;
            for synonym in &e.synonyms {
                write!(f, "<li>{}</li>", text(synonym))?;
            }
            writeln!(f, "</ul>")?;
        }
        if let Some(description) = &e.description_html {
            writeln!(
                f,
                "<div class=\"entry-description\">{}</div>",
                normalize_fragment(description)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for EntryHtml<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_open(f)?;
        self.write_checkboxes(f)?;
        self.write_body(f)?;
        writeln!(f, "</div>")
    }
}

fn checked(on: bool) -> &'static str {
    if on {
        " checked"
    } else {
        ""
    }
}
