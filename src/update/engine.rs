//! Resolution engine
//!
//! Queries the registry for every distinct package name concurrently,
//! selects a target version per policy and classifies the change. All
//! queries settle before any result is used. Inner dependencies of the
//! audited targets are then looked up once per distinct name.

use super::UpgradePolicy;
use crate::domain::{
    upgrade_delta, Dependency, NormalizedVersion, PackageResolution, TransitiveAudit, VersionDelta,
};
use crate::error::RegistryError;
use crate::registry::{Packument, Registry};
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Resolves declared dependencies against a registry
pub struct ResolutionEngine {
    registry: Arc<dyn Registry>,
    policy: UpgradePolicy,
}

/// A resolution waiting for its transitive audit
struct Resolved {
    resolution: PackageResolution,
    /// Dependencies of the target version, when it gets audited
    inner: Option<BTreeMap<String, String>>,
}

impl ResolutionEngine {
    pub fn new(registry: Arc<dyn Registry>, policy: UpgradePolicy) -> Self {
        Self { registry, policy }
    }

    /// Resolve every distinct package name in `dependencies`
    ///
    /// The first declaration of a name provides the installed range. Under
    /// minor-only policy every declared major gets its own target.
    /// Packages the registry does not know are left out of the map. Any
    /// other registry failure fails the whole resolution.
    pub async fn resolve(
        &self,
        dependencies: &[Dependency],
    ) -> Result<HashMap<String, PackageResolution>, RegistryError> {
        let mut unique: Vec<&Dependency> = Vec::new();
        let mut declared: HashMap<&str, Vec<NormalizedVersion>> = HashMap::new();
        for dep in dependencies {
            let versions = declared.entry(dep.name.as_str()).or_insert_with(|| {
                unique.push(dep);
                Vec::new()
            });
            if let Some(version) = NormalizedVersion::parse(&dep.range) {
                versions.push(version);
            }
        }

        tracing::info!(
            packages = unique.len(),
            registry = self.registry.registry_name(),
            "querying versions"
        );

        let queries = unique.iter().map(|dep| {
            let versions = declared.get(dep.name.as_str()).map(Vec::as_slice).unwrap_or_default();
            async move {
                let result = self.resolve_one(dep, versions).await;
                (dep.name.clone(), result)
            }
        });
        let results = join_all(queries).await;

        let mut resolved = Vec::with_capacity(results.len());
        let mut fatal = None;
        for (name, result) in results {
            match result {
                Ok(entry) => {
                    tracing::debug!(
                        package = %name,
                        latest = %entry.resolution.latest_version,
                        delta = ?entry.resolution.delta,
                        held_back = entry.resolution.held_back,
                        "resolved"
                    );
                    resolved.push((name, entry));
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!(package = %name, "package not found in registry");
                }
                Err(e) => {
                    tracing::error!(package = %name, error = %e, "registry query failed");
                    fatal.get_or_insert(e);
                }
            }
        }
        if let Some(e) = fatal {
            return Err(e);
        }

        let inner_latest = self.inner_latest(&resolved).await?;

        Ok(resolved
            .into_iter()
            .map(|(name, Resolved { resolution, inner })| {
                let resolution = match inner {
                    Some(inner) => resolution.with_audit(audit_of(&inner, &inner_latest)),
                    None => resolution,
                };
                (name, resolution)
            })
            .collect())
    }

    fn needs_packument(&self) -> bool {
        self.policy.minor_only || self.policy.audit()
    }

    async fn resolve_one(
        &self,
        dependency: &Dependency,
        declared: &[NormalizedVersion],
    ) -> Result<Resolved, RegistryError> {
        let current = NormalizedVersion::parse(&dependency.range);

        if !self.needs_packument() {
            let latest = self.registry.latest_version(&dependency.name).await?;
            let delta = delta_to(current.as_ref(), &latest);
            return Ok(Resolved {
                resolution: PackageResolution::new(&dependency.name, current, latest, delta),
                inner: None,
            });
        }

        let mut packument = self.registry.packument(&dependency.name).await?;
        let Some(latest) = packument.latest.clone() else {
            return Err(RegistryError::package_not_found(
                &dependency.name,
                self.registry.registry_name(),
            ));
        };

        let mut held_back = false;
        let mut targets = BTreeMap::new();
        let target = if self.policy.minor_only {
            targets = minor_targets(declared, &latest, &packument);
            match select_minor_target(current.as_ref(), &latest, &packument) {
                Some(version) => version,
                None => {
                    held_back = is_major_jump(current.as_ref(), &latest);
                    latest.clone()
                }
            }
        } else {
            latest.clone()
        };

        let delta = delta_to(current.as_ref(), &target);
        let mut resolution =
            PackageResolution::new(&dependency.name, current, target.clone(), delta)
                .with_registry_latest(latest)
                .with_minor_targets(targets);
        if let Some(published_at) = packument.published_at(&target) {
            resolution = resolution.with_published_at(published_at);
        }
        if held_back {
            return Ok(Resolved {
                resolution: resolution.held_back(),
                inner: None,
            });
        }

        let inner = if self.policy.audit() && resolution.delta.is_some() {
            packument.versions.remove(&target).map(|v| v.dependencies)
        } else {
            None
        };

        Ok(Resolved { resolution, inner })
    }

    /// Latest version of every inner dependency of the audited targets
    ///
    /// Each distinct name is queried once per run. Names the registry does
    /// not know are left out.
    async fn inner_latest(
        &self,
        resolved: &[(String, Resolved)],
    ) -> Result<HashMap<String, String>, RegistryError> {
        let names: BTreeSet<&str> = resolved
            .iter()
            .filter_map(|(_, entry)| entry.inner.as_ref())
            .flat_map(|inner| inner.keys().map(String::as_str))
            .collect();
        if names.is_empty() {
            return Ok(HashMap::new());
        }

        tracing::info!(packages = names.len(), "auditing inner dependencies");
        let lookups = names.into_iter().map(|name| async move {
            let result = self.registry.latest_version(name).await;
            (name, result)
        });

        let mut latest = HashMap::new();
        let mut fatal = None;
        for (name, result) in join_all(lookups).await {
            match result {
                Ok(version) => {
                    latest.insert(name.to_string(), version);
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(package = %name, "inner dependency not found");
                }
                Err(e) => {
                    tracing::error!(package = %name, error = %e, "inner dependency query failed");
                    fatal.get_or_insert(e);
                }
            }
        }

        match fatal {
            Some(e) => Err(e),
            None => Ok(latest),
        }
    }
}

/// Histogram of how far behind a version's own dependencies are
///
/// Inner ranges at or ahead of their registry latest are up to date.
fn audit_of(inner: &BTreeMap<String, String>, latest: &HashMap<String, String>) -> TransitiveAudit {
    let mut audit = TransitiveAudit::default();
    for (name, range) in inner {
        if let Some(latest) = latest.get(name) {
            audit.record(delta_to(NormalizedVersion::parse(range).as_ref(), latest));
        }
    }
    audit
}

/// Minor-only target of every declared major that has one
fn minor_targets(
    declared: &[NormalizedVersion],
    latest: &str,
    packument: &Packument,
) -> BTreeMap<u64, String> {
    let mut targets = BTreeMap::new();
    for current in declared {
        if let Some(target) = select_minor_target(Some(current), latest, packument) {
            targets.entry(current.version().major).or_insert(target);
        }
    }
    targets
}

fn delta_to(current: Option<&NormalizedVersion>, target: &str) -> Option<VersionDelta> {
    let target = NormalizedVersion::parse(target)?;
    upgrade_delta(current?, &target)
}

fn is_major_jump(current: Option<&NormalizedVersion>, latest: &str) -> bool {
    match (current, NormalizedVersion::parse(latest)) {
        (Some(current), Some(latest)) => latest.version().major > current.version().major,
        _ => false,
    }
}

/// Highest stable version within the installed major, newer than installed and not above latest
pub fn select_minor_target(
    current: Option<&NormalizedVersion>,
    latest: &str,
    packument: &Packument,
) -> Option<String> {
    let current = current?.version();
    let ceiling = semver::Version::parse(latest).ok();

    packument
        .versions
        .keys()
        .filter_map(|raw| semver::Version::parse(raw).ok().map(|v| (v, raw)))
        .filter(|(v, _)| v.pre.is_empty())
        .filter(|(v, _)| v.major == current.major && v > current)
        .filter(|(v, _)| ceiling.as_ref().map_or(true, |c| v <= c))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, raw)| raw.clone())
}
