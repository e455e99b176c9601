//! Upgrade orchestrator for coordinating the entire run
//!
//! This module provides:
//! - Workflow coordination: read manifest → query versions → classify → write
//! - Dry-run mode support
//! - The node_modules sync trigger
//!
//! Presentation is left to `output`; a run produces a `RunReport`.

use crate::domain::{PackageResolution, UpgradeOutcome};
use crate::error::{AppError, SyncError};
use crate::manifest::{Manifest, UpgradeWriter, MANIFEST_FILENAME};
use crate::package_manager::{sync_node_modules, NodePackageManager, PackageManagerRunner};
use crate::registry::{HttpClient, NpmRegistry, Registry};
use crate::update::{ResolutionEngine, UpgradePolicy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Orchestrator for coordinating the upgrade workflow
pub struct Orchestrator {
    policy: UpgradePolicy,
    registry: Arc<dyn Registry>,
}

/// Result of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub manifest: PathBuf,
    /// One outcome per declared entry, in manifest order
    pub outcomes: Vec<UpgradeOutcome>,
    /// Resolutions keyed by package name
    pub resolutions: BTreeMap<String, PackageResolution>,
    /// At least one entry was eligible for rewrite
    pub changed: bool,
    /// The manifest was written
    pub written: bool,
    pub dry_run: bool,
    /// Written, sync requested and node_modules exists
    pub sync_warranted: bool,
    /// Install command to suggest when node_modules is left unsynced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_hint: Option<String>,
    /// node_modules was resynchronized
    pub synced: bool,
}

impl RunReport {
    /// Number of eligible upgrades
    pub fn upgrade_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_upgrade()).count()
    }

    /// Outcomes that belong in the report
    pub fn visible_outcomes(&self, verbose: bool) -> impl Iterator<Item = &UpgradeOutcome> {
        self.outcomes.iter().filter(move |o| o.is_visible(verbose))
    }
}

impl Orchestrator {
    /// Create an orchestrator backed by the npm registry (or the policy's override)
    pub fn new(policy: UpgradePolicy) -> Result<Self, AppError> {
        let client = HttpClient::new()?;
        let registry = match policy.registry.as_deref() {
            Some(url) => NpmRegistry::with_base_url(client, url),
            None => NpmRegistry::new(client),
        };
        Ok(Self::with_registry(policy, Arc::new(registry)))
    }

    /// Create an orchestrator with a custom registry (for testing)
    pub fn with_registry(policy: UpgradePolicy, registry: Arc<dyn Registry>) -> Self {
        Self { policy, registry }
    }

    pub fn policy(&self) -> &UpgradePolicy {
        &self.policy
    }

    /// Run the upgrade workflow for the project in `dir`
    ///
    /// Manifest problems fail before any registry query. Registry transport
    /// failures fail before anything is written.
    pub async fn run(&self, dir: &Path) -> Result<RunReport, AppError> {
        let manifest_path = dir.join(MANIFEST_FILENAME);
        let mut manifest = Manifest::load(&manifest_path)?;
        let dependencies = manifest.dependencies(&self.policy.groups_in_scope());
        tracing::info!(
            path = %manifest_path.display(),
            dependencies = dependencies.len(),
            "read manifest"
        );

        let engine = ResolutionEngine::new(self.registry.clone(), self.policy.clone());
        let resolutions = engine.resolve(&dependencies).await?;

        let applied =
            UpgradeWriter::new(&self.policy).apply(&mut manifest, &dependencies, &resolutions);

        let written = applied.changed && !self.policy.dry_run;
        if written {
            manifest.save()?;
            tracing::info!(
                path = %manifest_path.display(),
                upgrades = applied.upgrade_count(),
                "wrote manifest"
            );
        }

        let node_modules = dir.join("node_modules").is_dir();
        let sync_warranted = written && self.policy.sync && node_modules;
        let sync_hint = (written && !self.policy.sync && node_modules)
            .then(|| NodePackageManager::detect(dir, self.policy.force_npm).command_line());

        Ok(RunReport {
            manifest: manifest_path,
            outcomes: applied.outcomes,
            resolutions: resolutions.into_iter().collect(),
            changed: applied.changed,
            written,
            dry_run: self.policy.dry_run,
            sync_warranted,
            sync_hint,
            synced: false,
        })
    }

    /// Resynchronize node_modules when the report warrants it
    pub fn sync<R: PackageManagerRunner>(
        &self,
        dir: &Path,
        report: &mut RunReport,
        runner: &R,
    ) -> Result<(), SyncError> {
        if !report.sync_warranted {
            return Ok(());
        }
        let result = sync_node_modules(runner, dir, self.policy.force_npm)?;
        tracing::debug!(command = %result.command, "node_modules synced");
        report.synced = true;
        Ok(())
    }
}
