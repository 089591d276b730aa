//! Concurrent bundle scanning
//!
//! Every path gets its own task and every task is awaited, so one broken
//! bundle never stops the others from being reported. Per-bundle callbacks
//! fire as reads finish (completion order); the returned [`ScanResult`] is
//! ordered like the input.

use std::path::{Path, PathBuf};

use gameshelf_shared::GameHeader;
use tokio::task::JoinSet;

use super::bundle::{GameBundle, load_bundle};
use super::error::{BundleError, ListError};
use super::listing::list_bundle_paths;

#[cfg(test)]
mod tests;

/// Receives scan progress.
///
/// `on_bundle` is called exactly once per input path. `on_complete` is
/// called exactly once, after the last `on_bundle` has returned.
pub trait ScanObserver {
    fn on_bundle(&mut self, bundle: &GameBundle);

    fn on_complete(&mut self, _result: &ScanResult) {}
}

impl<F> ScanObserver for F
where
    F: FnMut(&GameBundle),
{
    fn on_bundle(&mut self, bundle: &GameBundle) {
        self(bundle)
    }
}

/// All bundles from one scan, one per input path, in input order.
#[derive(Debug, Default)]
pub struct ScanResult {
    bundles: Vec<GameBundle>,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn bundles(&self) -> &[GameBundle] {
        &self.bundles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameBundle> {
        self.bundles.iter()
    }

    /// Bundles whose header was read successfully.
    pub fn games(&self) -> impl Iterator<Item = (&Path, &GameHeader)> {
        self.bundles
            .iter()
            .filter_map(|b| b.header().map(|h| (b.path.as_path(), h)))
    }

    /// Errors of the bundles that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BundleError> {
        self.bundles.iter().filter_map(GameBundle::error)
    }

    pub fn into_bundles(self) -> Vec<GameBundle> {
        self.bundles
    }
}

impl IntoIterator for ScanResult {
    type Item = GameBundle;
    type IntoIter = std::vec::IntoIter<GameBundle>;

    fn into_iter(self) -> Self::IntoIter {
        self.bundles.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a GameBundle;
    type IntoIter = std::slice::Iter<'a, GameBundle>;

    fn into_iter(self) -> Self::IntoIter {
        self.bundles.iter()
    }
}

/// Read the header of every bundle in `paths` concurrently.
///
/// All reads start immediately. The scan itself cannot fail: each path
/// settles as a [`GameBundle`] holding either its header or its error.
pub async fn scan_bundles<I, P, O>(paths: I, observer: &mut O) -> ScanResult
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
    O: ScanObserver + ?Sized,
{
    let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
    scan_with(paths, observer, load_bundle).await
}

/// Runs `load` for every path on its own task and joins them all.
async fn scan_with<O, L, F>(paths: Vec<PathBuf>, observer: &mut O, load: L) -> ScanResult
where
    O: ScanObserver + ?Sized,
    L: Fn(PathBuf) -> F,
    F: Future<Output = GameBundle> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for (index, path) in paths.iter().cloned().enumerate() {
        let load = load(path);
        tasks.spawn(async move { (index, load.await) });
    }

    let mut slots: Vec<Option<GameBundle>> = paths.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, bundle)) => {
                report(observer, &bundle);
                slots[index] = Some(bundle);
            }
            Err(e) => tracing::warn!("Bundle scan task failed: {}", e),
        }
    }

    // A task that died without handing back its bundle still gets reported once
    let bundles: Vec<GameBundle> = slots
        .into_iter()
        .zip(paths)
        .map(|(slot, path)| {
            slot.unwrap_or_else(|| {
                let bundle = GameBundle::new(
                    path.clone(),
                    Err(BundleError::Interrupted {
                        path,
                        reason: "task ended without a result".to_string(),
                    }),
                );
                report(observer, &bundle);
                bundle
            })
        })
        .collect();

    let result = ScanResult { bundles };
    tracing::info!(
        "Scanned {} bundles ({} ok, {} failed)",
        result.len(),
        result.games().count(),
        result.failures().count()
    );
    observer.on_complete(&result);
    result
}

/// List the bundles in `dir` and scan them all.
///
/// Only listing can fail; individual bundles report their own errors.
pub async fn scan_directory<O>(dir: &Path, observer: &mut O) -> Result<ScanResult, ListError>
where
    O: ScanObserver + ?Sized,
{
    let paths = list_bundle_paths(dir).await?;
    tracing::debug!("Found {} bundles in {}", paths.len(), dir.display());
    Ok(scan_bundles(paths, observer).await)
}

fn report<O: ScanObserver + ?Sized>(observer: &mut O, bundle: &GameBundle) {
    match &bundle.outcome {
        Ok(_) => tracing::debug!("Read header from {}", bundle.path.display()),
        Err(e) => tracing::warn!("{}", e),
    }
    observer.on_bundle(bundle);
}
