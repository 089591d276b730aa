//! Centralized constants for Gameshelf.
//!
//! Bundle naming conventions live here so the lister, the header reader and
//! the host binary cannot drift apart.

/// Name of the metadata entry every game bundle carries at its root.
pub const HEADER_ENTRY: &str = "header.json";

/// Filename suffix used to recognise bundles. Matched case-sensitively.
pub const BUNDLE_SUFFIX: &str = ".zip";

/// Host the asset server binds to and builds URLs with.
pub const LOOPBACK_HOST: &str = "127.0.0.1";
