//! package.json reading and writing
//!
//! This module provides functionality to:
//! - Load declared dependencies from package.json
//! - Capture indentation for round-trip-safe rewriting
//! - Apply upgrade decisions and persist atomically

mod formatting;
mod package_json;
mod writer;

pub use formatting::{Indent, ManifestFormatting};
pub use package_json::Manifest;
pub use writer::{read_manifest, write_manifest, ApplyResult, UpgradeWriter};

/// File name of the npm manifest
pub const MANIFEST_FILENAME: &str = "package.json";
