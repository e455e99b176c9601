//! Upgrade decision result types

use super::{Dependency, TransitiveAudit, VersionDelta};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Reason why a declared entry was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Installed range already matches the target
    AlreadyLatest,
    /// Package is on the skip list
    SkipListed,
    /// Major change excluded by minor-only policy
    MajorExcluded,
    /// Only a major upgrade exists and minor-only policy is active
    HeldBack,
    /// Registry has no such package
    NotFound,
    /// Declared range does not normalize to a version
    Unparsable,
}

impl SkipReason {
    /// Returns true if this skip is reported only in verbose mode
    pub fn is_quiet(&self) -> bool {
        matches!(
            self,
            SkipReason::AlreadyLatest | SkipReason::HeldBack | SkipReason::Unparsable
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyLatest => write!(f, "already at latest"),
            SkipReason::SkipListed => write!(f, "skipped by --skip"),
            SkipReason::MajorExcluded => write!(f, "major excluded by --minor-only"),
            SkipReason::HeldBack => write!(f, "held back by --minor-only"),
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::Unparsable => write!(f, "unparsable range"),
        }
    }
}

/// Decision taken for one declared entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    /// Entry is rewritten to `new_range`
    Upgrade { new_range: String },
    /// Entry is left as declared
    Skip { reason: SkipReason },
}

/// Outcome for a single declared entry, in manifest order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeOutcome {
    pub dependency: Dependency,
    /// Target version, absent when the package was not found
    pub latest: Option<String>,
    pub delta: Option<VersionDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<TransitiveAudit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub decision: Decision,
}

impl UpgradeOutcome {
    /// Creates an upgrade outcome
    pub fn upgrade(
        dependency: Dependency,
        latest: impl Into<String>,
        delta: VersionDelta,
        new_range: impl Into<String>,
    ) -> Self {
        Self {
            dependency,
            latest: Some(latest.into()),
            delta: Some(delta),
            audit: None,
            published_at: None,
            decision: Decision::Upgrade {
                new_range: new_range.into(),
            },
        }
    }

    /// Creates a skip outcome
    pub fn skip(dependency: Dependency, latest: Option<String>, reason: SkipReason) -> Self {
        Self {
            dependency,
            latest,
            delta: None,
            audit: None,
            published_at: None,
            decision: Decision::Skip { reason },
        }
    }

    /// Creates a skip outcome for a package the registry does not know
    pub fn not_found(dependency: Dependency) -> Self {
        Self::skip(dependency, None, SkipReason::NotFound)
    }

    pub fn with_delta(mut self, delta: Option<VersionDelta>) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_audit(mut self, audit: Option<TransitiveAudit>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Returns true if the entry is rewritten
    pub fn is_upgrade(&self) -> bool {
        matches!(self.decision, Decision::Upgrade { .. })
    }

    /// Returns the skip reason, if skipped
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.decision {
            Decision::Skip { reason } => Some(reason),
            Decision::Upgrade { .. } => None,
        }
    }

    /// Returns the rewritten range, if upgraded
    pub fn new_range(&self) -> Option<&str> {
        match &self.decision {
            Decision::Upgrade { new_range } => Some(new_range),
            Decision::Skip { .. } => None,
        }
    }

    /// Returns true if the outcome belongs in the report
    pub fn is_visible(&self, verbose: bool) -> bool {
        match self.skip_reason() {
            Some(reason) if reason.is_quiet() => verbose,
            _ => true,
        }
    }
}

impl fmt::Display for UpgradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.decision {
            Decision::Upgrade { new_range } => write!(
                f,
                "{}: {} → {}",
                self.dependency.name, self.dependency.range, new_range
            ),
            Decision::Skip { reason } => {
                write!(f, "{}: skipped ({})", self.dependency.name, reason)
            }
        }
    }
}
