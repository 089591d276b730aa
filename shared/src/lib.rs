//! Shared types for the Gameshelf game library.
//!
//! Everything here is plain data plus small helpers so the core pipeline,
//! the host binary, and tests agree on bundle conventions.

pub mod constants;
pub mod fs;
pub mod local;

pub use constants::{BUNDLE_SUFFIX, HEADER_ENTRY, LOOPBACK_HOST};
pub use fs::{MAX_CONFIG_BYTES, MAX_HEADER_BYTES, read_file_with_limit, read_to_end_with_limit};
pub use local::GameHeader;
