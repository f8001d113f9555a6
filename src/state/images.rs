//! The `images` feature: link the lead image of the entry's Wikipedia page.
//!
//! Only a link to the image's `File:` page is stored, the image itself is never
//! embedded. Entries without a Wikipedia page are not applicable, run the
//! `wikipedia` feature first.
use super::{FeatureError, FeatureHandler, FeatureOutcome};
use crate::entry::Entry;
use crate::lookup::{Lookup, LookupFailure};
use crate::processing::terms;

pub const IMAGES: &str = "images";

pub struct ImagesFeature<L> {
    lookup: L,
}

impl<L: Lookup> ImagesFeature<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }
}

impl<L: Lookup> FeatureHandler for ImagesFeature<L> {
    fn name(&self) -> &str {
        IMAGES
    }

    fn apply(&self, entry: &Entry) -> Result<FeatureOutcome, FeatureError> {
        if entry.image_url.is_some() {
            return Ok(FeatureOutcome::Skipped("already has an image".into()));
        }
        let title = match entry.wikipedia_url.as_deref().and_then(terms::page_title_from_url) {
            Some(title) => title,
            None => return Ok(FeatureOutcome::Skipped("no Wikipedia page".into())),
        };

        let result = match self.lookup.lookup(&title) {
            Ok(result) => result,
            Err(LookupFailure::NotFound(title)) => {
                return Ok(FeatureOutcome::Skipped(format!("page `{}` is gone", title)))
            }
            Err(e) => return Err(e.into()),
        };

        match result.image_url {
            Some(url) => {
                debug!("`{}`: image {}", entry.term, url);
                Ok(FeatureOutcome::Applied(entry.clone().with_image_url(Some(url))))
            }
            None => Ok(FeatureOutcome::Skipped(format!(
                "no image on `{}`",
                result.title
            ))),
        }
    }
}
