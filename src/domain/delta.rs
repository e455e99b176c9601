//! Version delta classification

use crate::domain::NormalizedVersion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Magnitude of change between an installed and a candidate version
///
/// Variants are declared in increasing severity so `Ord` ranks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionDelta {
    Build,
    Prerelease,
    Patch,
    Prepatch,
    Minor,
    Preminor,
    Major,
    Premajor,
}

impl VersionDelta {
    /// Returns true for a change of the major segment
    pub fn is_major(&self) -> bool {
        matches!(self, VersionDelta::Major | VersionDelta::Premajor)
    }

    /// Lowercase label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            VersionDelta::Build => "build",
            VersionDelta::Prerelease => "prerelease",
            VersionDelta::Patch => "patch",
            VersionDelta::Prepatch => "prepatch",
            VersionDelta::Minor => "minor",
            VersionDelta::Preminor => "preminor",
            VersionDelta::Major => "major",
            VersionDelta::Premajor => "premajor",
        }
    }
}

impl fmt::Display for VersionDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify the change from `from` to `to`
///
/// Both sides are normalized first. Returns None when they are equal or
/// when either side does not normalize.
pub fn classify(from: &str, to: &str) -> Option<VersionDelta> {
    let from = NormalizedVersion::parse(from)?;
    let to = NormalizedVersion::parse(to)?;
    classify_versions(&from, &to)
}

/// Classify the change between two already normalized versions
pub fn classify_versions(from: &NormalizedVersion, to: &NormalizedVersion) -> Option<VersionDelta> {
    if from == to {
        return None;
    }

    let (a, b) = (from.version(), to.version());
    let pre = to.is_prerelease();

    let delta = if a.major != b.major {
        if pre {
            VersionDelta::Premajor
        } else {
            VersionDelta::Major
        }
    } else if a.minor != b.minor {
        if pre {
            VersionDelta::Preminor
        } else {
            VersionDelta::Minor
        }
    } else if a.patch != b.patch {
        if pre {
            VersionDelta::Prepatch
        } else {
            VersionDelta::Patch
        }
    } else if a.pre != b.pre {
        VersionDelta::Prerelease
    } else {
        VersionDelta::Build
    };

    Some(delta)
}

/// Classify an upgrade; a target not newer than the installed version yields None
pub fn upgrade_delta(
    installed: &NormalizedVersion,
    target: &NormalizedVersion,
) -> Option<VersionDelta> {
    if target <= installed {
        return None;
    }
    classify_versions(installed, target)
}
