//! Registry access for fetching package version information
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - The `Registry` capability used by the resolution engine
//! - npm Registry implementation

mod client;
mod npm;

pub use client::{HttpClient, RequestContext};
pub use npm::{encode_package_name, NpmRegistry, DEFAULT_REGISTRY_URL};

use crate::error::RegistryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One published version of a package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedVersion {
    /// Dependencies declared by this version (`name → range`)
    pub dependencies: BTreeMap<String, String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Registry metadata for a package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packument {
    pub name: String,
    /// The `latest` dist-tag
    pub latest: Option<String>,
    pub versions: BTreeMap<String, PublishedVersion>,
}

impl Packument {
    /// Metadata of one version
    pub fn version(&self, version: &str) -> Option<&PublishedVersion> {
        self.versions.get(version)
    }

    /// Publish time of one version
    pub fn published_at(&self, version: &str) -> Option<DateTime<Utc>> {
        self.version(version).and_then(|v| v.published_at)
    }
}

/// Trait for package registries
#[async_trait]
pub trait Registry: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &str;

    /// Fetch the `latest` dist-tag of a package
    ///
    /// Fails with `PackageNotFound` when the package does not exist or has
    /// no `latest` tag.
    async fn latest_version(&self, package: &str) -> Result<String, RegistryError>;

    /// Fetch all versions with publish times and declared dependencies
    async fn packument(&self, package: &str) -> Result<Packument, RegistryError>;
}
