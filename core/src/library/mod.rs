//! Game library scanning
//!
//! Finds game bundles in a directory and reads their headers concurrently.
//! A broken bundle is reported on its own and never fails the scan.

mod bundle;
mod error;
mod listing;
mod scan;

pub use bundle::{GameBundle, extract_bundle, load_bundle, read_game_header, read_game_header_from};
pub use error::{BundleError, BundleErrorKind, ExtractError, ListError};
pub use listing::{list_bundle_paths, list_bundles};
pub use scan::{ScanObserver, ScanResult, scan_bundles, scan_directory};
