//! Dependency declaration structures

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A dependency group of package.json
///
/// Variant order is the order groups are read, reported and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DependencyGroup {
    #[serde(rename = "dependencies")]
    Dependencies,
    #[serde(rename = "devDependencies")]
    DevDependencies,
    #[serde(rename = "peerDependencies")]
    PeerDependencies,
    #[serde(rename = "optionalDependencies")]
    OptionalDependencies,
    #[serde(rename = "bundledDependencies")]
    BundledDependencies,
}

impl DependencyGroup {
    /// All groups in manifest processing order
    pub const ALL: [DependencyGroup; 5] = [
        DependencyGroup::Dependencies,
        DependencyGroup::DevDependencies,
        DependencyGroup::PeerDependencies,
        DependencyGroup::OptionalDependencies,
        DependencyGroup::BundledDependencies,
    ];

    /// Groups processed when neither flags nor config select any
    pub const DEFAULT: [DependencyGroup; 2] = [
        DependencyGroup::Dependencies,
        DependencyGroup::DevDependencies,
    ];

    /// The package.json key of this group
    pub fn key(&self) -> &'static str {
        match self {
            DependencyGroup::Dependencies => "dependencies",
            DependencyGroup::DevDependencies => "devDependencies",
            DependencyGroup::PeerDependencies => "peerDependencies",
            DependencyGroup::OptionalDependencies => "optionalDependencies",
            DependencyGroup::BundledDependencies => "bundledDependencies",
        }
    }

}

impl FromStr for DependencyGroup {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dependencies" | "prod" => Ok(DependencyGroup::Dependencies),
            "devDependencies" | "dev" => Ok(DependencyGroup::DevDependencies),
            "peerDependencies" | "peer" => Ok(DependencyGroup::PeerDependencies),
            "optionalDependencies" | "optional" => Ok(DependencyGroup::OptionalDependencies),
            "bundledDependencies" | "bundled" => Ok(DependencyGroup::BundledDependencies),
            other => Err(ConfigError::InvalidGroup {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single `name: range` entry of one dependency group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// Range string exactly as declared (e.g. `^1.2.3`)
    pub range: String,
    /// The group this entry belongs to
    pub group: DependencyGroup,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(name: impl Into<String>, range: impl Into<String>, group: DependencyGroup) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
            group,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} [{}]", self.name, self.range, self.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_keys() {
        let keys: Vec<&str> = DependencyGroup::ALL.iter().map(|g| g.key()).collect();
        assert_eq!(
            keys,
            vec![
                "dependencies",
                "devDependencies",
                "peerDependencies",
                "optionalDependencies",
                "bundledDependencies"
            ]
        );
    }

    #[test]
    fn test_group_from_str_aliases() {
        assert_eq!(
            "dev".parse::<DependencyGroup>().unwrap(),
            DependencyGroup::DevDependencies
        );
        assert_eq!(
            "peerDependencies".parse::<DependencyGroup>().unwrap(),
            DependencyGroup::PeerDependencies
        );
        assert_eq!(
            "bundled".parse::<DependencyGroup>().unwrap(),
            DependencyGroup::BundledDependencies
        );
    }

    #[test]
    fn test_group_from_str_invalid() {
        let err = "devDeps".parse::<DependencyGroup>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGroup { .. }));
    }

    #[test]
    fn test_group_from_str_accepts_only_read_key() {
        let err = "bundleDependencies".parse::<DependencyGroup>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGroup { .. }));
    }

    #[test]
    fn test_group_ordering_follows_manifest_order() {
        assert!(DependencyGroup::Dependencies < DependencyGroup::DevDependencies);
        assert!(DependencyGroup::OptionalDependencies < DependencyGroup::BundledDependencies);
    }

    #[test]
    fn test_dependency_display() {
        let dep = Dependency::new("lodash", "^4.17.21", DependencyGroup::Dependencies);
        assert_eq!(format!("{}", dep), "lodash@^4.17.21 [dependencies]");
    }

    #[test]
    fn test_serde_group_uses_manifest_key() {
        let json = serde_json::to_string(&DependencyGroup::DevDependencies).unwrap();
        assert_eq!(json, "\"devDependencies\"");
    }
}
