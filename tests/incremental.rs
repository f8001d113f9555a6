use std::fs;
use std::path::Path;

use encyclopedia::config::Settings;
use encyclopedia::entry::{Category, HideReason, HistoryAction, Status};
use encyclopedia::io;
use encyclopedia::lookup::{LookupFailure, LookupResult, MapLookup};
use encyclopedia::pipeline::{Create, Pipeline};
use encyclopedia::state::{self, FeatureRegistry, ImagesFeature, WikipediaFeature};

const TERMS: &str = "# climate terms\nalbedo\nsea ice\npermafrost\ncutx\nflaky\n";

fn page(title: &str, id: &str) -> LookupResult {
    LookupResult {
        title: title.into(),
        wikipedia_url: Some(format!(
            "https://en.wikipedia.org/wiki/{}",
            title.replace(' ', "_")
        )),
        wikidata_id: Some(id.parse().unwrap()),
        description_html: Some(format!("<p><b>{}</b> is a climate term.</p>", title)),
        ..Default::default()
    }
}

fn lookup() -> MapLookup {
    MapLookup::new()
        .with_result("albedo", page("Albedo", "Q101038"))
        .with_result("sea ice", page("Sea ice", "Q213926"))
        .with_result("permafrost", page("Permafrost", "Q179918"))
        .with_failure("flaky", LookupFailure::Transport("connection reset".into()))
}

fn create(dir: &Path) -> std::path::PathBuf {
    let src = dir.join("terms.txt");
    let dst = dir.join("climate.html");
    fs::write(&src, TERMS).unwrap();
    let settings = Settings::default();
    Create::new(src, dst.clone(), &settings)
        .with_title(Some("Climate".into()))
        .run()
        .unwrap();
    dst
}

#[test_log::test]
fn batches_resume_until_done() {
    let dir = tempfile::tempdir().unwrap();
    let path = create(dir.path());
    let registry = FeatureRegistry::new().with(Box::new(WikipediaFeature::new(lookup())));

    let first = state::run_batch(&path, &registry, "wikipedia", 2, true).unwrap();
    assert_eq!((first.processed, first.skipped, first.failed), (2, 0, 0));

    let second = state::run_batch(&path, &registry, "wikipedia", 2, true).unwrap();
    // permafrost found, cutx unknown to the lookup
    assert_eq!((second.processed, second.skipped, second.failed), (1, 1, 0));

    let third = state::run_batch(&path, &registry, "wikipedia", 2, true).unwrap();
    assert_eq!((third.processed, third.failed), (0, 1));
    assert_eq!(third.remaining, 1);

    let enc = io::load(&path).unwrap();
    let flaky = enc.find("flaky").unwrap();
    assert_eq!(flaky.status, Status::Unprocessed);
    assert_eq!(
        flaky.history().last().unwrap().action,
        HistoryAction::FeatureFailed
    );
    assert_eq!(enc.find("cutx").unwrap().status, Status::Skipped);
    let albedo = enc.find("albedo").unwrap();
    assert_eq!(albedo.status, Status::Processed);
    assert_eq!(albedo.wikidata_id.as_ref().unwrap().as_str(), "Q101038");
    assert!(albedo.has_description());
    assert_eq!(enc.metadata.feature_counts["wikipedia"], 3);
    assert_eq!(
        enc.metadata.last_session.as_ref().unwrap().last_entry_id.as_deref(),
        Some("flaky")
    );
    assert_eq!(state::next_unprocessed(&enc).unwrap().id, "flaky");
}

#[test_log::test]
fn empty_batch_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = create(dir.path());
    let always = MapLookup::new()
        .with_result("albedo", page("Albedo", "Q101038"))
        .with_result("sea ice", page("Sea ice", "Q213926"))
        .with_result("permafrost", page("Permafrost", "Q179918"))
        .with_result("cutx", page("Cutx", "Q1"))
        .with_result("flaky", page("Flaky", "Q2"));
    let registry = FeatureRegistry::new().with(Box::new(WikipediaFeature::new(always)));

    for _ in 0..3 {
        state::run_batch(&path, &registry, "wikipedia", 2, true).unwrap();
    }
    let before = fs::read_to_string(&path).unwrap();
    let fourth = state::run_batch(&path, &registry, "wikipedia", 2, true).unwrap();
    assert!(fourth.is_empty());
    assert_eq!(fourth.processed, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test_log::test]
fn images_after_wikipedia() {
    let dir = tempfile::tempdir().unwrap();
    let path = create(dir.path());
    let mut albedo = page("Albedo", "Q101038");
    albedo.image_url = Some("https://en.wikipedia.org/wiki/File:Albedo-e_hg.svg".into());
    let images = MapLookup::new()
        .with_result("Albedo", albedo)
        .with_result("Sea ice", page("Sea ice", "Q213926"));
    let registry = FeatureRegistry::new()
        .with(Box::new(WikipediaFeature::new(lookup())))
        .with(Box::new(ImagesFeature::new(images)));

    state::run_batch(&path, &registry, "wikipedia", 10, true).unwrap();
    let report = state::run_batch(&path, &registry, "images", 10, true).unwrap();
    assert_eq!((report.processed, report.skipped, report.failed), (1, 4, 0));
    assert_eq!(report.remaining, 0);

    let enc = io::load(&path).unwrap();
    let albedo = enc.find("albedo").unwrap();
    assert!(albedo.has_feature("images"));
    assert_eq!(
        albedo.image_url.as_deref(),
        Some("https://en.wikipedia.org/wiki/File:Albedo-e_hg.svg")
    );
    // skipped by images, still processed by wikipedia
    assert_eq!(enc.find("sea_ice").unwrap().status, Status::Processed);
    // flaky has no page yet: skipped by images, still waiting for wikipedia
    assert_eq!(enc.find("flaky").unwrap().status, Status::Skipped);
    assert_eq!(state::remaining(&enc, "wikipedia"), 1);
}

#[test_log::test]
fn unknown_feature_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = create(dir.path());
    let registry = FeatureRegistry::new();
    assert!(state::run_batch(&path, &registry, "images", 2, true).is_err());
}

#[test_log::test]
fn renormalize_after_enrichment_merges_new_synonyms() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("terms.txt");
    let path = dir.path().join("climate.html");
    fs::write(&src, "climate change\nglobal warming\n").unwrap();
    let settings = Settings::default();
    Create::new(src, path.clone(), &settings).run().unwrap();

    let same = page("Climate change", "Q7942");
    let registry = FeatureRegistry::new().with(Box::new(WikipediaFeature::new(
        MapLookup::new()
            .with_result("climate change", same.clone())
            .with_result("global warming", same),
    )));
    state::run_batch(&path, &registry, "wikipedia", 10, true).unwrap();

    let merged_path = dir.path().join("merged.html");
    let stats = Create::new(path, merged_path.clone(), &settings)
        .run()
        .unwrap();
    assert_eq!(stats.total_entries, 1);

    let enc = io::load(&merged_path).unwrap();
    let entry = &enc.entries[0];
    assert_eq!(entry.id, "Q7942");
    assert_eq!(entry.synonyms, vec!["climate change", "global warming"]);
    assert!(entry.has_feature("wikipedia"));
    assert_eq!(entry.status, Status::Processed);
    assert_eq!(entry.category, Some(Category::TrueMatch));
    assert_eq!(entry.history().last().unwrap().action, HistoryAction::Merged);
}

#[test_log::test]
fn user_transitions_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = create(dir.path());

    let mut enc = io::load(&path).unwrap();
    state::hide(&mut enc, "albedo", HideReason::FalseWikipedia).unwrap();
    io::save(&enc, &path).unwrap();

    let enc = io::load(&path).unwrap();
    let albedo = enc.find("albedo").unwrap();
    assert_eq!(albedo.status, Status::Hidden);
    assert_eq!(albedo.hide_reason, Some(HideReason::FalseWikipedia));
    assert!(fs::read_to_string(&path)
        .unwrap()
        .contains("data-reason=\"false_wikipedia\" checked"));
}
