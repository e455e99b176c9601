//! Core domain models for upgradeps
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency declarations and their groups
//! - Range normalization into comparable versions
//! - Version delta classification
//! - Per-package resolutions and per-entry upgrade outcomes

mod delta;
mod dependency;
mod resolution;
mod update_result;
mod version_spec;

pub use delta::{classify, classify_versions, upgrade_delta, VersionDelta};
pub use dependency::{Dependency, DependencyGroup};
pub use resolution::{PackageResolution, TransitiveAudit};
pub use update_result::{Decision, SkipReason, UpgradeOutcome};
pub use version_spec::NormalizedVersion;
