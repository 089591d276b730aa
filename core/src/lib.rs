//! Gameshelf Core - bundle scanning and asset serving
//!
//! This crate provides the pieces a host UI needs to show a shelf of games
//! packaged as zip bundles.
//!
//! # Architecture
//!
//! - [`library`] - Lists bundles in a directory and reads each bundle's
//!   `header.json` concurrently, reporting failures per bundle
//! - [`server`] - Loopback HTTP server exposing files (including extracted
//!   bundle contents) to the host UI
//! - [`config`] - `config.toml` loading with defaults

pub mod config;
pub mod library;
pub mod server;
#[cfg(test)]
pub mod test_utils;

// Re-export the common entry points
pub use library::{
    BundleError, BundleErrorKind, GameBundle, ListError, ScanObserver, ScanResult, list_bundles,
    read_game_header, scan_bundles, scan_directory,
};
pub use server::{LocalAssetServer, ServerBinding, ServerError, ServerHandle};

pub use gameshelf_shared::GameHeader;
