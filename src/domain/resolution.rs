//! Per-package resolution results

use super::{NormalizedVersion, VersionDelta};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outdated-ness summary of a target version's own dependencies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransitiveAudit {
    /// Number of dependencies declared by the target version
    pub dependencies: usize,
    /// Count of outdated inner dependencies per delta class
    pub outdated: BTreeMap<VersionDelta, usize>,
}

impl TransitiveAudit {
    /// Records one inner dependency and its delta, if any
    pub fn record(&mut self, delta: Option<VersionDelta>) {
        self.dependencies += 1;
        if let Some(delta) = delta {
            *self.outdated.entry(delta).or_insert(0) += 1;
        }
    }

    /// Total number of outdated inner dependencies
    pub fn outdated_count(&self) -> usize {
        self.outdated.values().sum()
    }
}

/// What the registry says about one distinct package name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageResolution {
    pub name: String,
    /// Normalized first-declared range, absent when it does not normalize
    pub current: Option<NormalizedVersion>,
    /// Target version the package would move to
    pub latest_version: String,
    /// dist-tags latest, which differs from `latest_version` under minor-only policy
    pub registry_latest: String,
    /// Minor-only targets per declared major, for majors that have one
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub minor_targets: BTreeMap<u64, String>,
    pub delta: Option<VersionDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<TransitiveAudit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Minor-only policy found no reachable version while a major one exists
    pub held_back: bool,
}

impl PackageResolution {
    /// Creates a resolution without audit or publish data
    pub fn new(
        name: impl Into<String>,
        current: Option<NormalizedVersion>,
        latest_version: impl Into<String>,
        delta: Option<VersionDelta>,
    ) -> Self {
        let latest_version = latest_version.into();
        Self {
            name: name.into(),
            current,
            registry_latest: latest_version.clone(),
            latest_version,
            minor_targets: BTreeMap::new(),
            delta,
            audit: None,
            published_at: None,
            held_back: false,
        }
    }

    pub fn with_audit(mut self, audit: TransitiveAudit) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_registry_latest(mut self, registry_latest: impl Into<String>) -> Self {
        self.registry_latest = registry_latest.into();
        self
    }

    pub fn with_minor_targets(mut self, minor_targets: BTreeMap<u64, String>) -> Self {
        self.minor_targets = minor_targets;
        self
    }

    /// Target for a declaration whose own range normalizes to `current`
    ///
    /// The minor-only target of its major when there is one, otherwise dist-tags latest.
    pub fn target_for(&self, current: &NormalizedVersion) -> &str {
        self.minor_targets
            .get(&current.version().major)
            .unwrap_or(&self.registry_latest)
    }

    pub fn held_back(mut self) -> Self {
        self.held_back = true;
        self.delta = None;
        self
    }
}
