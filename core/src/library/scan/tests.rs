use super::*;
use crate::library::BundleErrorKind;
use crate::test_utils::{write_bundle, write_game_bundle};
use serde_json::json;
use std::collections::HashMap;
use tempfile::TempDir;

/// Records every callback in the order it happened.
#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

#[derive(Debug, PartialEq)]
enum Event {
    Bundle {
        path: PathBuf,
        title: Option<String>,
        error: Option<BundleErrorKind>,
    },
    Complete(usize),
}

impl ScanObserver for Recorder {
    fn on_bundle(&mut self, bundle: &GameBundle) {
        self.events.push(Event::Bundle {
            path: bundle.path.clone(),
            title: bundle.header().and_then(|h| h.title()).map(String::from),
            error: bundle.error().map(BundleError::kind),
        });
    }

    fn on_complete(&mut self, result: &ScanResult) {
        self.events.push(Event::Complete(result.len()));
    }
}

impl Recorder {
    fn bundle_events(&self) -> HashMap<PathBuf, (Option<String>, Option<BundleErrorKind>)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Bundle { path, title, error } => {
                    Some((path.clone(), (title.clone(), *error)))
                }
                Event::Complete(_) => None,
            })
            .collect()
    }
}

/// Writes the a/b/c fixture: one good, one headerless, one corrupt.
fn write_mixed_fixture(dir: &Path) -> Vec<PathBuf> {
    vec![
        write_bundle(dir, "a.zip", &[("header.json", br#"{"title":"Foo"}"#)]),
        write_bundle(dir, "b.zip", &[("readme.txt", b"no header here")]),
        write_bundle(dir, "c.zip", &[("header.json", b"{title: Foo")]),
    ]
}

// =============================================================
// Callback contract
// =============================================================

#[tokio::test]
async fn test_scan_mixed_bundles_reports_each_once() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_mixed_fixture(temp_dir.path());
    let mut recorder = Recorder::default();

    scan_bundles(paths.clone(), &mut recorder).await;

    assert_eq!(recorder.events.len(), 4);
    let seen = recorder.bundle_events();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[&paths[0]], (Some("Foo".to_string()), None));
    assert_eq!(seen[&paths[1]], (None, Some(BundleErrorKind::NotFound)));
    assert_eq!(seen[&paths[2]], (None, Some(BundleErrorKind::Parse)));
}

#[tokio::test]
async fn test_scan_completion_fires_last_and_once() {
    let temp_dir = TempDir::new().unwrap();
    let mut paths = write_mixed_fixture(temp_dir.path());
    paths.push(temp_dir.path().join("missing.zip"));
    for i in 0..8 {
        paths.push(write_game_bundle(
            temp_dir.path(),
            &format!("game{}.zip", i),
            &format!(r#"{{"title":"Game {}"}}"#, i),
        ));
    }
    let mut recorder = Recorder::default();

    scan_bundles(paths.clone(), &mut recorder).await;

    let completions: Vec<usize> = recorder
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Complete(n) => Some(*n),
            Event::Bundle { .. } => None,
        })
        .collect();
    assert_eq!(completions, vec![paths.len()]);
    assert_eq!(recorder.events.last(), Some(&Event::Complete(paths.len())));
    assert_eq!(recorder.events.len(), paths.len() + 1);
}

#[tokio::test]
async fn test_scan_empty_input_still_completes() {
    let mut recorder = Recorder::default();

    let result = scan_bundles(Vec::<PathBuf>::new(), &mut recorder).await;

    assert!(result.is_empty());
    assert_eq!(recorder.events, vec![Event::Complete(0)]);
}

#[tokio::test]
async fn test_scan_accepts_closure_observer() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_mixed_fixture(temp_dir.path());
    let mut calls = 0;

    let result = scan_bundles(paths, &mut |_bundle: &GameBundle| calls += 1).await;

    assert_eq!(calls, 3);
    assert_eq!(result.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scan_all_failures_on_multi_thread_runtime() {
    let temp_dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..16)
        .map(|i| temp_dir.path().join(format!("absent{}.zip", i)))
        .collect();
    let mut recorder = Recorder::default();

    let result = scan_bundles(paths.clone(), &mut recorder).await;

    assert_eq!(result.len(), 16);
    assert_eq!(result.failures().count(), 16);
    assert_eq!(recorder.bundle_events().len(), 16);
    assert_eq!(recorder.events.last(), Some(&Event::Complete(16)));
}

// =============================================================
// ScanResult shape
// =============================================================

#[tokio::test]
async fn test_scan_result_in_input_order() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_mixed_fixture(temp_dir.path());

    let result = scan_bundles(paths.clone(), &mut |_: &GameBundle| {}).await;

    let result_paths: Vec<&PathBuf> = result.iter().map(|b| &b.path).collect();
    assert_eq!(result_paths, paths.iter().collect::<Vec<_>>());

    let bundles = result.bundles();
    assert_eq!(bundles[0].header().unwrap().as_value(), &json!({"title": "Foo"}));
    assert!(matches!(
        bundles[1].error(),
        Some(BundleError::MissingHeader { .. })
    ));
    assert!(matches!(
        bundles[2].error(),
        Some(BundleError::InvalidHeader { .. })
    ));
}

#[tokio::test]
async fn test_scan_result_exactly_one_of_header_or_error() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_mixed_fixture(temp_dir.path());

    let result = scan_bundles(paths, &mut |_: &GameBundle| {}).await;

    for bundle in &result {
        assert_ne!(bundle.header().is_some(), bundle.error().is_some());
    }
    assert_eq!(result.games().count(), 1);
    assert_eq!(result.failures().count(), 2);
}

#[tokio::test]
async fn test_scan_duplicate_paths_counted_separately() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_game_bundle(temp_dir.path(), "a.zip", r#"{"title":"Foo"}"#);
    let mut calls = 0;

    let result = scan_bundles(
        vec![path.clone(), path.clone()],
        &mut |_: &GameBundle| calls += 1,
    )
    .await;

    assert_eq!(calls, 2);
    assert_eq!(result.games().count(), 2);
}

// =============================================================
// scan_directory
// =============================================================

#[tokio::test]
async fn test_scan_directory_lists_then_scans() {
    let temp_dir = TempDir::new().unwrap();
    write_mixed_fixture(temp_dir.path());
    std::fs::write(temp_dir.path().join("notes.txt"), b"ignored").unwrap();
    let mut recorder = Recorder::default();

    let result = scan_directory(temp_dir.path(), &mut recorder).await.unwrap();

    assert_eq!(result.len(), 3);
    let titles: Vec<&str> = result.games().filter_map(|(_, h)| h.title()).collect();
    assert_eq!(titles, vec!["Foo"]);
    assert_eq!(recorder.events.last(), Some(&Event::Complete(3)));
}

#[tokio::test]
async fn test_scan_directory_missing_dir_fails_without_callbacks() {
    let temp_dir = TempDir::new().unwrap();
    let mut recorder = Recorder::default();

    let result = scan_directory(&temp_dir.path().join("nope"), &mut recorder).await;

    assert!(result.is_err());
    assert!(recorder.events.is_empty());
}

// =============================================================
// Lost tasks
// =============================================================

/// Loads normally, except that any bundle named `boom.zip` panics its task.
async fn load_or_panic(path: PathBuf) -> GameBundle {
    if path.ends_with("boom.zip") {
        panic!("reader crashed on {}", path.display());
    }
    load_bundle(path).await
}

#[tokio::test]
async fn test_scan_panicked_task_reported_once_as_interrupted() {
    let temp_dir = TempDir::new().unwrap();
    let mut paths = write_mixed_fixture(temp_dir.path());
    let boom = write_game_bundle(temp_dir.path(), "boom.zip", r#"{"title":"Boom"}"#);
    paths.insert(1, boom.clone());
    let mut recorder = Recorder::default();

    let result = scan_with(paths.clone(), &mut recorder, load_or_panic).await;

    assert_eq!(recorder.events.len(), paths.len() + 1);
    assert_eq!(recorder.events.last(), Some(&Event::Complete(paths.len())));
    let seen = recorder.bundle_events();
    assert_eq!(seen.len(), paths.len());
    assert_eq!(seen[&boom], (None, Some(BundleErrorKind::Interrupted)));
    assert_eq!(seen[&paths[0]], (Some("Foo".to_string()), None));

    // Still in input order, with the lost task in its own slot
    let result_paths: Vec<&PathBuf> = result.iter().map(|b| &b.path).collect();
    assert_eq!(result_paths, paths.iter().collect::<Vec<_>>());
    assert!(matches!(
        result.bundles()[1].error(),
        Some(BundleError::Interrupted { path, .. }) if path == &boom
    ));
}

#[tokio::test]
async fn test_scan_every_task_panicking_still_completes() {
    let temp_dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..3)
        .map(|i| temp_dir.path().join(format!("{}", i)).join("boom.zip"))
        .collect();
    let mut recorder = Recorder::default();

    let result = scan_with(paths.clone(), &mut recorder, load_or_panic).await;

    assert_eq!(result.failures().count(), 3);
    assert_eq!(recorder.bundle_events().len(), 3);
    assert_eq!(recorder.events.last(), Some(&Event::Complete(3)));
    assert_eq!(recorder.events.len(), 4);
}
