//! Batch processing and user transitions on a loaded encyclopedia.
use std::fmt;
use std::path::Path;

use serde_json::Value;

use super::{FeatureError, FeatureHandler, FeatureOutcome, FeatureRegistry};
use crate::entry::history::{changes, now};
use crate::entry::{
    ActionKind, Category, Encyclopedia, Entry, HideReason, HistoryAction, Session, Status,
};
use crate::error::Error;
use crate::io;

/// Summary of one [process_batch] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub feature: String,
    pub selected: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Entries still eligible for a resumed batch.
    pub remaining: usize,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.selected == 0
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} processed, {} skipped, {} failed ({} remaining)",
            self.feature, self.processed, self.skipped, self.failed, self.remaining
        )
    }
}

/// First entry waiting for processing, in document order.
pub fn next_unprocessed(encyclopedia: &Encyclopedia) -> Option<&Entry> {
    encyclopedia
        .entries
        .iter()
        .find(|e| e.status == Status::Unprocessed)
}

fn is_eligible(entry: &Entry, feature: &str, resume: bool) -> bool {
    if resume {
        !entry.is_hidden() && !entry.has_feature(feature) && !skipped(entry, feature)
    } else {
        !entry.is_hidden()
    }
}

/// `true` if `feature` was skipped on `entry` since it was last unhidden.
fn skipped(entry: &Entry, feature: &str) -> bool {
    entry
        .history()
        .iter()
        .rev()
        .take_while(|r| r.action != HistoryAction::Unhidden)
        .any(|r| {
            r.action == HistoryAction::FeatureSkipped
                && r.changes.get("feature").and_then(Value::as_str) == Some(feature)
        })
}

/// Number of entries a resumed `feature` batch would still pick up.
pub fn remaining(encyclopedia: &Encyclopedia, feature: &str) -> usize {
    encyclopedia
        .entries
        .iter()
        .filter(|e| is_eligible(e, feature, true))
        .count()
}

/// Completion of one feature over a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub feature: String,
    pub done: usize,
    pub total: usize,
    pub remaining: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.done as f64 / self.total as f64
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} ({:.1}%), {} remaining",
            self.feature,
            self.done,
            self.total,
            self.percent(),
            self.remaining
        )
    }
}

pub fn progress(encyclopedia: &Encyclopedia, feature: &str) -> Progress {
    Progress {
        feature: feature.to_string(),
        done: encyclopedia.feature_count(feature),
        total: encyclopedia.len(),
        remaining: remaining(encyclopedia, feature),
    }
}

/// Apply `handler` to up to `batch_size` entries, in document order.
///
/// With `resume`, entries that already carry the feature, are hidden or were
/// skipped by this feature are left out. Without it every non-hidden entry is eligible again.
/// Each handled entry gets exactly one history record. Metadata is updated
/// only when at least one entry was selected.
pub fn process_batch(
    encyclopedia: &mut Encyclopedia,
    handler: &dyn FeatureHandler,
    batch_size: usize,
    resume: bool,
) -> BatchReport {
    let feature = handler.name().to_string();
    let selected: Vec<usize> = encyclopedia
        .entries
        .iter()
        .enumerate()
        .filter(|(_, e)| is_eligible(e, &feature, resume))
        .map(|(idx, _)| idx)
        .take(batch_size)
        .collect();

    let mut report = BatchReport {
        feature: feature.clone(),
        selected: selected.len(),
        processed: 0,
        skipped: 0,
        failed: 0,
        remaining: 0,
    };
    info!(
        "{}: {} entries selected (batch size {}, resume {})",
        feature,
        selected.len(),
        batch_size,
        resume
    );

    let mut last_entry_id = None;
    for idx in selected {
        let entry = &mut encyclopedia.entries[idx];
        let previous = entry.status;
        entry.status = Status::Processing;
        let outcome = handler.apply(entry);
        match outcome {
            Ok(FeatureOutcome::Applied(updated)) => {
                apply_update(entry, updated, &feature);
                report.processed += 1;
            }
            Ok(FeatureOutcome::Skipped(reason)) => {
                debug!("{}: skipped `{}`: {}", feature, entry.term, reason);
                entry.status = if previous == Status::Processed {
                    Status::Processed
                } else {
                    Status::Skipped
                };
                entry.record(
                    HistoryAction::FeatureSkipped,
                    changes([("feature", feature.as_str()), ("reason", reason.as_str())]),
                );
                report.skipped += 1;
            }
            Err(FeatureError(message)) => {
                warn!("{}: failed on `{}`: {}", feature, entry.term, message);
                entry.status = Status::Unprocessed;
                entry.record(
                    HistoryAction::FeatureFailed,
                    changes([("feature", feature.as_str()), ("error", message.as_str())]),
                );
                report.failed += 1;
            }
        }
        last_entry_id = Some(entry.id.clone());
    }

    if report.selected > 0 {
        let metadata = &mut encyclopedia.metadata;
        metadata.touch();
        metadata.last_session = Some(Session {
            timestamp: now(),
            entries_processed: report.processed,
            last_entry_id,
        });
        metadata.feature_counts.entry(feature.clone()).or_insert(0);
        encyclopedia.refresh_feature_counts();
    }
    report.remaining = remaining(encyclopedia, &feature);
    report
}

/// Take content fields from the handler's copy, keep bookkeeping, and record
/// one `added_feature` mutation.
fn apply_update(entry: &mut Entry, updated: Entry, feature: &str) {
    let mut fields: Vec<&str> = Vec::new();
    if entry.search_term != updated.search_term {
        entry.search_term = updated.search_term;
        fields.push("search_term");
    }
    if entry.wikidata_id != updated.wikidata_id {
        entry.wikidata_id = updated.wikidata_id;
        fields.push("wikidata_id");
    }
    if entry.wikipedia_url != updated.wikipedia_url {
        entry.wikipedia_url = updated.wikipedia_url;
        fields.push("wikipedia_url");
    }
    if entry.description_html != updated.description_html {
        entry.description_html = updated.description_html;
        fields.push("description_html");
    }
    if entry.disambiguation_options != updated.disambiguation_options {
        entry.disambiguation_options = updated.disambiguation_options;
        fields.push("disambiguation_options");
    }
    if entry.image_url != updated.image_url {
        entry.image_url = updated.image_url;
        fields.push("image_url");
    }

    entry.status = Status::Processed;
    entry.processed_features.insert(feature.to_string());
    entry.record(
        HistoryAction::AddedFeature,
        changes([
            ("feature", Value::from(feature)),
            ("fields", Value::from(fields)),
        ]),
    );
}

/// `* -> hidden`.
pub fn hide(encyclopedia: &mut Encyclopedia, id: &str, reason: HideReason) -> Result<(), Error> {
    let entry = encyclopedia.find_mut(id)?;
    if entry.is_hidden() {
        return Err(Error::InvalidTransition(format!("`{}` is already hidden", id)));
    }
    let previous = entry.status;
    entry.status = Status::Hidden;
    entry.hide_reason = Some(reason);
    entry.record(
        HistoryAction::Hidden,
        changes([("reason", reason.as_str()), ("previous_status", previous.as_str())]),
    );

    let metadata = &mut encyclopedia.metadata;
    metadata.log_action(ActionKind::Hide, Some(id), changes([("reason", reason.as_str())]));
    metadata.touch();
    info!("hid `{}` ({})", id, reason);
    Ok(())
}

/// `hidden -> unprocessed`.
pub fn unhide(encyclopedia: &mut Encyclopedia, id: &str) -> Result<(), Error> {
    let entry = encyclopedia.find_mut(id)?;
    if !entry.is_hidden() {
        return Err(Error::InvalidTransition(format!(
            "`{}` is {}, not hidden",
            id, entry.status
        )));
    }
    entry.status = Status::Unprocessed;
    entry.hide_reason = None;
    entry.record(HistoryAction::Unhidden, Default::default());

    let metadata = &mut encyclopedia.metadata;
    metadata.log_action(ActionKind::Unhide, Some(id), Default::default());
    metadata.touch();
    info!("unhid `{}`", id);
    Ok(())
}

/// Record the disambiguation options a user picked for a disambiguation entry.
///
/// `urls` must all be among the entry's options (its own page when none are
/// known). They are stored in option order.
pub fn select_disambiguation(
    encyclopedia: &mut Encyclopedia,
    id: &str,
    urls: &[String],
) -> Result<(), Error> {
    let entry = encyclopedia.find_mut(id)?;
    if entry.category != Some(Category::Disambiguation) {
        return Err(Error::InvalidTransition(format!(
            "`{}` is not a disambiguation entry",
            id
        )));
    }

    let known: Vec<&str> = if entry.disambiguation_options.is_empty() {
        entry.wikipedia_url.iter().map(String::as_str).collect()
    } else {
        entry
            .disambiguation_options
            .iter()
            .map(|o| o.url.as_str())
            .collect()
    };
    if let Some(unknown) = urls.iter().find(|u| !known.contains(&u.as_str())) {
        return Err(Error::InvalidTransition(format!(
            "`{}` is not an option of `{}`",
            unknown, id
        )));
    }
    let selected: Vec<String> = known
        .into_iter()
        .filter(|k| urls.iter().any(|u| u.as_str() == *k))
        .map(str::to_string)
        .collect();

    entry.selected_options = selected.clone();
    entry.record(
        HistoryAction::DisambiguationSelected,
        changes([("selected", Value::from(selected.clone()))]),
    );

    let metadata = &mut encyclopedia.metadata;
    metadata.log_action(
        ActionKind::DisambiguationSelect,
        Some(id),
        changes([("selected", Value::from(selected))]),
    );
    metadata.touch();
    Ok(())
}

/// Load `path`, run one batch of `feature` and save it back.
///
/// An empty batch leaves the file untouched. Handler failures are part of the
/// report, only load and save errors are returned.
pub fn run_batch(
    path: &Path,
    registry: &FeatureRegistry,
    feature: &str,
    batch_size: usize,
    resume: bool,
) -> Result<BatchReport, Error> {
    let handler = registry.get(feature)?;
    let mut encyclopedia = io::load(path)?;
    let report = process_batch(&mut encyclopedia, handler, batch_size, resume);
    if report.is_empty() {
        info!("{}: nothing to do", feature);
    } else {
        io::save(&encyclopedia, path)?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::entry::DisambiguationOption;

    struct Succeed;

    impl FeatureHandler for Succeed {
        fn name(&self) -> &str {
            "wikipedia"
        }

        fn apply(&self, entry: &Entry) -> Result<FeatureOutcome, FeatureError> {
            assert_eq!(entry.status, Status::Processing);
            let mut updated = entry.clone();
            updated.description_html = Some(format!("<p>{}</p>", entry.term));
            Ok(FeatureOutcome::Applied(updated))
        }
    }

    /// Fails on the first `n` calls, then succeeds.
    struct FlakyThenOk(Cell<usize>);

    impl FeatureHandler for FlakyThenOk {
        fn name(&self) -> &str {
            "wikipedia"
        }

        fn apply(&self, entry: &Entry) -> Result<FeatureOutcome, FeatureError> {
            if self.0.get() > 0 {
                self.0.set(self.0.get() - 1);
                return Err(FeatureError("timeout".into()));
            }
            Ok(FeatureOutcome::Applied(entry.clone()))
        }
    }

    struct SkipAll;

    impl FeatureHandler for SkipAll {
        fn name(&self) -> &str {
            "images"
        }

        fn apply(&self, _: &Entry) -> Result<FeatureOutcome, FeatureError> {
            Ok(FeatureOutcome::Skipped("no image".into()))
        }
    }

    fn encyclopedia(n: usize) -> Encyclopedia {
        let mut enc = Encyclopedia::new("Test");
        enc.entries = (0..n)
            .map(|i| {
                let mut e = Entry::new(format!("term {}", i));
                e.id = format!("term_{}", i);
                e
            })
            .collect();
        enc
    }

    #[test]
    fn five_entries_in_three_batches() {
        let mut enc = encyclopedia(5);
        let reports: Vec<BatchReport> = (0..3)
            .map(|_| process_batch(&mut enc, &Succeed, 2, true))
            .collect();
        assert_eq!(
            reports.iter().map(|r| r.processed).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
        assert!(enc
            .entries
            .iter()
            .all(|e| e.has_feature("wikipedia") && e.status == Status::Processed));
        assert_eq!(enc.metadata.feature_counts["wikipedia"], 5);
        assert_eq!(enc.metadata.global_version, 4);

        let fourth = process_batch(&mut enc, &Succeed, 2, true);
        assert!(fourth.is_empty());
        assert_eq!(fourth.processed, 0);
        assert_eq!(fourth.remaining, 0);
        assert_eq!(enc.metadata.global_version, 4);
    }

    #[test]
    fn each_entry_processed_once() {
        let mut enc = encyclopedia(7);
        for _ in 0..3 {
            process_batch(&mut enc, &Succeed, 3, true);
        }
        for e in &enc.entries {
            let added = e
                .history()
                .iter()
                .filter(|r| r.action == HistoryAction::AddedFeature)
                .count();
            assert_eq!(added, 1, "{}", e.term);
            assert_eq!(e.version(), 2);
        }
    }

    #[test]
    fn failure_reverts_and_retries() {
        let mut enc = encyclopedia(3);
        let handler = FlakyThenOk(Cell::new(1));
        let report = process_batch(&mut enc, &handler, 2, true);
        assert_eq!((report.processed, report.failed), (1, 1));
        assert_eq!(report.remaining, 2);

        let failed = &enc.entries[0];
        assert_eq!(failed.status, Status::Unprocessed);
        assert!(!failed.has_feature("wikipedia"));
        let record = failed.history().last().unwrap();
        assert_eq!(record.action, HistoryAction::FeatureFailed);
        assert_eq!(record.changes["error"], "timeout");
        assert_eq!(next_unprocessed(&enc).unwrap().id, "term_0");

        process_batch(&mut enc, &handler, 2, true);
        assert!(enc.entries.iter().all(|e| e.status == Status::Processed));
    }

    #[test]
    fn skipped_entries_leave_resume() {
        let mut enc = encyclopedia(2);
        let report = process_batch(&mut enc, &SkipAll, 10, true);
        assert_eq!(report.skipped, 2);
        assert!(enc.entries.iter().all(|e| e.status == Status::Skipped));
        assert!(process_batch(&mut enc, &SkipAll, 10, true).is_empty());
        assert_eq!(enc.metadata.feature_counts["images"], 0);
    }

    #[test]
    fn skip_is_per_feature() {
        let mut enc = encyclopedia(2);
        process_batch(&mut enc, &Succeed, 1, true);
        process_batch(&mut enc, &SkipAll, 10, true);
        assert_eq!(enc.entries[0].status, Status::Processed);
        assert_eq!(enc.entries[1].status, Status::Skipped);

        let report = process_batch(&mut enc, &Succeed, 10, true);
        assert_eq!(report.processed, 1);
        assert_eq!(enc.entries[1].status, Status::Processed);
        assert_eq!(remaining(&enc, "images"), 0);
    }

    #[test]
    fn unhide_forgets_skips() {
        let mut enc = encyclopedia(1);
        process_batch(&mut enc, &SkipAll, 10, true);
        hide(&mut enc, "term_0", HideReason::UserSelected).unwrap();
        unhide(&mut enc, "term_0").unwrap();
        assert_eq!(remaining(&enc, "images"), 1);
    }

    #[test]
    fn options_found_by_a_batch_are_persisted() {
        use crate::lookup::{LookupResult, MapLookup};
        use crate::state::WikipediaFeature;

        let option = DisambiguationOption {
            label: "Mercury (planet)".into(),
            url: "https://en.wikipedia.org/wiki/Mercury_(planet)".into(),
        };
        let lookup = MapLookup::new().with_result(
            "Mercury",
            LookupResult {
                title: "Mercury".into(),
                wikipedia_url: Some("https://en.wikipedia.org/wiki/Mercury".into()),
                is_disambiguation: true,
                disambiguation_options: vec![option.clone()],
                ..Default::default()
            },
        );
        let mut enc = Encyclopedia::new("Planets");
        let mut e = Entry::new("Mercury");
        e.id = "Mercury".into();
        e.category = Some(Category::GeneralTerm);
        enc.entries.push(e);

        let report = process_batch(&mut enc, &WikipediaFeature::new(lookup), 10, true);
        assert_eq!(report.processed, 1);
        assert_eq!(
            enc.entries[0].history().last().unwrap().changes["fields"],
            serde_json::json!(["wikipedia_url", "disambiguation_options"])
        );

        let reloaded = io::parse(&crate::render::render(&enc)).unwrap();
        assert_eq!(reloaded.entries[0].disambiguation_options, vec![option]);
        assert_eq!(reloaded.entries[0], enc.entries[0]);
    }

    #[test]
    fn image_link_is_persisted() {
        use crate::lookup::{LookupResult, MapLookup};
        use crate::state::ImagesFeature;

        let lookup = MapLookup::new().with_result(
            "Albedo",
            LookupResult {
                title: "Albedo".into(),
                image_url: Some("https://en.wikipedia.org/wiki/File:Albedo-e_hg.svg".into()),
                ..Default::default()
            },
        );
        let mut enc = encyclopedia(1);
        enc.entries[0].wikipedia_url = Some("https://en.wikipedia.org/wiki/Albedo".into());

        let report = process_batch(&mut enc, &ImagesFeature::new(lookup), 10, true);
        assert_eq!(report.processed, 1);
        assert!(enc.entries[0].has_feature("images"));

        let reloaded = io::parse(&crate::render::render(&enc)).unwrap();
        assert_eq!(
            reloaded.entries[0].image_url.as_deref(),
            Some("https://en.wikipedia.org/wiki/File:Albedo-e_hg.svg")
        );
        assert_eq!(reloaded.entries[0], enc.entries[0]);
    }

    #[test]
    fn no_resume_reprocesses() {
        let mut enc = encyclopedia(2);
        process_batch(&mut enc, &Succeed, 10, true);
        let report = process_batch(&mut enc, &Succeed, 10, false);
        assert_eq!(report.processed, 2);
        assert!(enc.entries.iter().all(|e| e.version() == 3));
    }

    #[test]
    fn hidden_entries_are_never_selected() {
        let mut enc = encyclopedia(2);
        hide(&mut enc, "term_0", HideReason::UserSelected).unwrap();
        let report = process_batch(&mut enc, &Succeed, 10, false);
        assert_eq!(report.processed, 1);
        assert!(!enc.entries[0].has_feature("wikipedia"));
    }

    #[test]
    fn batch_records_session() {
        let mut enc = encyclopedia(3);
        process_batch(&mut enc, &Succeed, 2, true);
        let session = enc.metadata.last_session.as_ref().unwrap();
        assert_eq!(session.entries_processed, 2);
        assert_eq!(session.last_entry_id.as_deref(), Some("term_1"));
    }

    #[test]
    fn progress_report() {
        let mut enc = encyclopedia(4);
        process_batch(&mut enc, &Succeed, 1, true);
        hide(&mut enc, "term_3", HideReason::GeneralTerm).unwrap();
        let p = progress(&enc, "wikipedia");
        assert_eq!((p.done, p.total, p.remaining), (1, 4, 2));
        assert_eq!(p.to_string(), "wikipedia: 1/4 (25.0%), 2 remaining");
    }

    #[test]
    fn hide_and_unhide() {
        let mut enc = encyclopedia(1);
        let before = enc.entries[0].history().to_vec();
        hide(&mut enc, "term_0", HideReason::FalseWikipedia).unwrap();
        let e = &enc.entries[0];
        assert_eq!(e.status, Status::Hidden);
        assert_eq!(e.history().len(), before.len() + 1);
        assert_eq!(&e.history()[..before.len()], &before[..]);
        assert!(next_unprocessed(&enc).is_none());
        assert!(hide(&mut enc, "term_0", HideReason::UserSelected).is_err());

        unhide(&mut enc, "term_0").unwrap();
        assert_eq!(enc.entries[0].status, Status::Unprocessed);
        assert_eq!(enc.entries[0].hide_reason, None);
        assert_eq!(enc.entries[0].version(), 3);
        assert!(matches!(
            unhide(&mut enc, "term_0"),
            Err(Error::InvalidTransition(_))
        ));
        assert!(matches!(unhide(&mut enc, "nope"), Err(Error::UnknownEntry(_))));

        let kinds: Vec<ActionKind> = enc.metadata.actions.iter().map(|a| a.action).collect();
        assert_eq!(kinds, vec![ActionKind::Hide, ActionKind::Unhide]);
    }

    #[test]
    fn disambiguation_selection() {
        let mut enc = encyclopedia(2);
        {
            let e = &mut enc.entries[0];
            e.category = Some(Category::Disambiguation);
            e.disambiguation_options = ["a", "b", "c"]
                .iter()
                .map(|l| DisambiguationOption {
                    label: l.to_string(),
                    url: format!("https://en.wikipedia.org/wiki/{}", l),
                })
                .collect();
        }
        let pick = |l: &str| format!("https://en.wikipedia.org/wiki/{}", l);

        select_disambiguation(&mut enc, "term_0", &[pick("c"), pick("a")]).unwrap();
        assert_eq!(enc.entries[0].selected_options, vec![pick("a"), pick("c")]);
        assert_eq!(enc.entries[0].version(), 2);

        assert!(select_disambiguation(&mut enc, "term_0", &[pick("z")]).is_err());
        assert!(select_disambiguation(&mut enc, "term_1", &[]).is_err());
        assert_eq!(enc.entries[0].version(), 2);
    }
}
