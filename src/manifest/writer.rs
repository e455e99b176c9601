//! Manifest upgrade and write operations
//!
//! This module provides:
//! - UpgradeWriter for applying resolutions to declared entries
//! - Per-entry decisions for skip list and minor-only policy
//! - Atomic persistence (temp file in the same directory, then rename)

use super::Manifest;
use crate::domain::{
    upgrade_delta, Dependency, NormalizedVersion, PackageResolution, SkipReason, UpgradeOutcome,
};
use crate::error::ManifestError;
use crate::update::UpgradePolicy;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Applies resolutions to a manifest under a policy
pub struct UpgradeWriter<'a> {
    policy: &'a UpgradePolicy,
}

/// Result of applying resolutions to a manifest
#[derive(Debug, Default)]
pub struct ApplyResult {
    /// One outcome per declared entry, in manifest order
    pub outcomes: Vec<UpgradeOutcome>,
    /// Whether at least one entry was rewritten in memory
    pub changed: bool,
}

impl ApplyResult {
    /// Number of rewritten entries
    pub fn upgrade_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_upgrade()).count()
    }
}

impl<'a> UpgradeWriter<'a> {
    pub fn new(policy: &'a UpgradePolicy) -> Self {
        Self { policy }
    }

    /// Decide every entry and rewrite the eligible ones in `manifest`
    ///
    /// Entries without a resolution were not found in the registry.
    pub fn apply(
        &self,
        manifest: &mut Manifest,
        dependencies: &[Dependency],
        resolutions: &HashMap<String, PackageResolution>,
    ) -> ApplyResult {
        let mut result = ApplyResult::default();

        for dependency in dependencies {
            let outcome = self.decide(dependency, resolutions.get(&dependency.name));
            if let Some(new_range) = outcome.new_range() {
                if manifest.set_range(dependency.group, &dependency.name, new_range) {
                    result.changed = true;
                    tracing::debug!(
                        package = %dependency.name,
                        group = %dependency.group,
                        range = new_range,
                        "rewrote entry"
                    );
                }
            }
            result.outcomes.push(outcome);
        }

        result
    }

    /// Decide a single entry
    pub fn decide(
        &self,
        dependency: &Dependency,
        resolution: Option<&PackageResolution>,
    ) -> UpgradeOutcome {
        let Some(resolution) = resolution else {
            return UpgradeOutcome::not_found(dependency.clone());
        };

        let Some(current) = NormalizedVersion::parse(&dependency.range) else {
            return UpgradeOutcome::skip(
                dependency.clone(),
                Some(resolution.latest_version.clone()),
                SkipReason::Unparsable,
            );
        };

        // Judged from this entry's own range, not the first declaration
        let latest = resolution.target_for(&current).to_string();
        let annotated = latest == resolution.latest_version;
        let annotate = |outcome: UpgradeOutcome| {
            if annotated {
                outcome
                    .with_audit(resolution.audit.clone())
                    .with_published_at(resolution.published_at)
            } else {
                outcome
            }
        };
        let base = |reason| {
            annotate(UpgradeOutcome::skip(
                dependency.clone(),
                Some(latest.clone()),
                reason,
            ))
        };

        let Some(target) = NormalizedVersion::parse(&latest) else {
            return base(SkipReason::Unparsable);
        };
        let Some(delta) = upgrade_delta(&current, &target) else {
            return base(SkipReason::AlreadyLatest);
        };

        // Held back when no declared major has a minor-only target at all
        let major_under_minor_only = self.policy.minor_only && delta.is_major();
        if major_under_minor_only && resolution.minor_targets.is_empty() {
            return base(SkipReason::HeldBack);
        }
        if self.policy.is_skipped(&dependency.name) {
            return base(SkipReason::SkipListed).with_delta(Some(delta));
        }
        if major_under_minor_only {
            return base(SkipReason::MajorExcluded).with_delta(Some(delta));
        }

        annotate(UpgradeOutcome::upgrade(
            dependency.clone(),
            &latest,
            delta,
            self.policy.range_for(&latest),
        ))
    }
}

/// Read a manifest file content safely
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Write content to a manifest file atomically
///
/// Content goes to a temp file next to `path`, is synced, and then renamed
/// over the target. Permissions of an existing target are kept.
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let write = || -> std::io::Result<()> {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.sync_all()?;
        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(&temp_path, metadata.permissions())?;
        }
        fs::rename(&temp_path, path)
    };

    write().map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ManifestError::write_error(path, e)
    })
}
