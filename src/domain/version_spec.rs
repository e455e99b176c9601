//! Range normalization for npm version ranges
//!
//! Turns a declared range into a comparable version:
//! - `^1.2.3`, `~1.2.3`, `=1.2.3`, `v1.2.3` → `1.2.3`
//! - `1.x`, `1.2.*` → `1.0.0`, `1.2.0`
//! - `^2.3` → `2.3.0`
//!
//! Comparator sets (`>=1 <2`), tags, URLs and git specs do not normalize.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\^|~>?|=)?\s*v?([0-9xX*]+(?:\.[0-9xX*]+){0,2})([-+][0-9A-Za-z.+-]*)?$")
        .unwrap()
});

/// A version derived from a range string, used only for comparison
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedVersion(semver::Version);

impl NormalizedVersion {
    /// Normalize a range string, returning None when it is not a simple version range
    pub fn parse(range: &str) -> Option<Self> {
        let caps = RANGE_RE.captures(range.trim())?;
        let core = caps.get(1)?.as_str();
        let qualifier = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        let mut segments = Vec::with_capacity(3);
        for segment in core.split('.') {
            if segment.chars().all(|c| c.is_ascii_digit()) {
                segments.push(segment);
            } else if matches!(segment, "x" | "X" | "*") {
                segments.push("0");
            } else {
                return None;
            }
        }
        while segments.len() < 3 {
            segments.push("0");
        }

        let text = format!("{}{}", segments.join("."), qualifier);
        semver::Version::parse(&text).ok().map(Self)
    }

    /// The underlying semver version
    pub fn version(&self) -> &semver::Version {
        &self.0
    }

    /// Returns true if the version carries a prerelease qualifier
    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }
}

impl fmt::Display for NormalizedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NormalizedVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}
