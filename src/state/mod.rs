/*! Incremental state management

Operates on a loaded [crate::entry::Encyclopedia] whose persisted form is the
rendered HTML. One CLI invocation is one load, mutate, save cycle. Nothing
locks the file: only one process may write a given encyclopedia at a time.

Per-entry state machine:

```text
unprocessed -> processing -> processed
                          -> unprocessed   (handler failed, retried next run)
                          -> skipped       (feature not applicable, entry has no feature yet)
* -> hidden                                 (user)
hidden -> unprocessed                       (user)
```

Skips are remembered per feature through the `feature_skipped` history
records, so an entry skipped by one feature stays eligible for the others.

A batch is saved as a whole after its last entry. Killing the process
mid-batch loses that batch only, and rerunning with `resume` picks the same
entries up again.
!*/
mod feature;
mod images;
mod manager;
mod wikipedia;

pub use feature::{FeatureError, FeatureHandler, FeatureOutcome, FeatureRegistry};
pub use manager::{
    hide, next_unprocessed, process_batch, progress, remaining, run_batch, select_disambiguation,
    unhide, BatchReport, Progress,
};
pub use images::{ImagesFeature, IMAGES};
pub use wikipedia::{WikipediaFeature, WIKIPEDIA};

use crate::config::Settings;
use crate::error::Error;
use crate::lookup::WikipediaClient;

impl FeatureRegistry {
    /// Registry with every built-in feature.
    pub fn standard(settings: &Settings) -> Result<Self, Error> {
        let client = WikipediaClient::new(settings)?;
        Ok(FeatureRegistry::new()
            .with(Box::new(WikipediaFeature::new(client.clone())))
            .with(Box::new(ImagesFeature::new(client))))
    }
}
