//! Gameshelf host
//!
//! Scans a games directory, unpacks every readable bundle under the asset
//! root, and serves that root on a loopback port until Ctrl-C.
//!
//! ```text
//! gameshelf [--save] [GAMES_DIR]
//! ```
//!
//! `GAMES_DIR` overrides `library.games_dir` from `config.toml`; with
//! `--save` the override is written back to `config.toml`.

use anyhow::{Context, Result};
use gameshelf_core::LocalAssetServer;
use gameshelf_core::config::{self, Config};
use gameshelf_core::library::{GameBundle, ScanObserver, ScanResult, extract_bundle, scan_directory};
use gameshelf_shared::HEADER_ENTRY;
use std::env;
use std::path::{Path, PathBuf};

/// Subdirectory of the asset root that bundles are unpacked into.
const BUNDLES_DIR: &str = "bundles";

/// Logs scan progress as bundles settle.
struct LogObserver;

impl ScanObserver for LogObserver {
    fn on_bundle(&mut self, bundle: &GameBundle) {
        match &bundle.outcome {
            Ok(header) => tracing::info!(
                "Found '{}' in {}",
                header.title().unwrap_or("untitled"),
                bundle.path.display()
            ),
            Err(e) => tracing::warn!("Skipping bundle: {}", e),
        }
    }

    fn on_complete(&mut self, result: &ScanResult) {
        tracing::info!(
            "Library scan complete: {} of {} bundles readable",
            result.games().count(),
            result.len()
        );
    }
}

/// A bundle that was unpacked and can be addressed through the server.
struct HostedGame {
    title: String,
    header_path: String,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = config::load();
    let games_dir = games_dir_from_args(&args, &config);
    if save_requested(&args) && games_dir != config.library.games_dir {
        config.library.games_dir = games_dir.clone();
        if let Err(e) = config::save(&config) {
            tracing::warn!("Failed to save config: {:#}", e);
        }
    }
    let root = config.server.root_or_working_dir();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    rt.block_on(run(games_dir, root))
}

async fn run(games_dir: PathBuf, root: PathBuf) -> Result<()> {
    tracing::info!("Scanning {}", games_dir.display());
    let result = scan_directory(&games_dir, &mut LogObserver)
        .await
        .with_context(|| format!("Failed to scan {}", games_dir.display()))?;

    let mut hosted = Vec::new();
    for (path, header) in result.games() {
        let Some(slug) = bundle_slug(path) else {
            tracing::warn!("Skipping bundle with unusable name: {}", path.display());
            continue;
        };
        let src = path.to_path_buf();
        let dest = root.join(BUNDLES_DIR).join(slug);
        match tokio::task::spawn_blocking(move || extract_bundle(&src, &dest)).await? {
            Ok(_) => hosted.push(HostedGame {
                title: header.title().unwrap_or(slug).to_string(),
                header_path: format!("{}/{}/{}", BUNDLES_DIR, slug, HEADER_ENTRY),
            }),
            Err(e) => tracing::warn!("Failed to unpack {}: {}", path.display(), e),
        }
    }

    let server = LocalAssetServer::new(root)
        .listen()
        .await
        .context("Failed to start asset server")?;
    for game in &hosted {
        tracing::info!("{} -> {}", game.title, server.href(&game.header_path));
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutting down");
    server.shutdown().await;
    Ok(())
}

/// First positional argument, falling back to the configured games directory.
fn games_dir_from_args(args: &[String], config: &Config) -> PathBuf {
    args.iter()
        .skip(1)
        .find(|arg| !arg.starts_with('-'))
        .map(PathBuf::from)
        .unwrap_or_else(|| config.library.games_dir.clone())
}

fn save_requested(args: &[String]) -> bool {
    args.iter().skip(1).any(|arg| arg == "--save")
}

/// Directory name a bundle is unpacked under: its file stem.
fn bundle_slug(path: &Path) -> Option<&str> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && !s.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_games_dir_from_positional_arg() {
        let config = Config::default();
        let dir = games_dir_from_args(&args(&["gameshelf", "/tmp/games"]), &config);
        assert_eq!(dir, PathBuf::from("/tmp/games"));
    }

    #[test]
    fn test_games_dir_skips_flags() {
        let config = Config::default();
        let dir = games_dir_from_args(&args(&["gameshelf", "--verbose", "games"]), &config);
        assert_eq!(dir, PathBuf::from("games"));
    }

    #[test]
    fn test_games_dir_falls_back_to_config() {
        let config = Config::default();
        let dir = games_dir_from_args(&args(&["gameshelf"]), &config);
        assert_eq!(dir, config.library.games_dir);
    }

    #[test]
    fn test_save_requested() {
        assert!(save_requested(&args(&["gameshelf", "--save", "games"])));
        assert!(save_requested(&args(&["gameshelf", "games", "--save"])));
        assert!(!save_requested(&args(&["gameshelf", "games"])));
        // The program name is never a flag
        assert!(!save_requested(&args(&["--save"])));
    }

    #[test]
    fn test_games_dir_ignores_save_flag() {
        let config = Config::default();
        let dir = games_dir_from_args(&args(&["gameshelf", "--save", "/srv/games"]), &config);
        assert_eq!(dir, PathBuf::from("/srv/games"));
    }

    #[test]
    fn test_bundle_slug() {
        assert_eq!(bundle_slug(Path::new("/games/paddle.zip")), Some("paddle"));
        assert_eq!(bundle_slug(Path::new("space invaders.v2.zip")), Some("space invaders.v2"));
        assert_eq!(bundle_slug(Path::new(".zip")), None);
    }
}
