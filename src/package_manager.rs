//! Package manager integration for syncing node_modules after upgrades
//!
//! This module provides:
//! - Detection of the project's package manager from lock files
//! - Removal of stale lock files
//! - Execution of the install command

use crate::error::SyncError;
use std::fmt;
use std::path::Path;
use std::process::{Command, Output};

/// Node.js package managers that can sync node_modules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

/// Lock files checked in order of preference
const LOCK_FILES: [(&str, NodePackageManager); 5] = [
    ("pnpm-lock.yaml", NodePackageManager::Pnpm),
    ("yarn.lock", NodePackageManager::Yarn),
    ("bun.lockb", NodePackageManager::Bun),
    ("bun.lock", NodePackageManager::Bun),
    ("package-lock.json", NodePackageManager::Npm),
];

impl NodePackageManager {
    /// Detect the package manager from lock files, defaulting to npm
    pub fn detect(working_dir: &Path, force_npm: bool) -> Self {
        if force_npm {
            return NodePackageManager::Npm;
        }
        LOCK_FILES
            .iter()
            .find(|(file, _)| working_dir.join(file).exists())
            .map(|(_, pm)| *pm)
            .unwrap_or(NodePackageManager::Npm)
    }

    /// Get the install command for this package manager
    pub fn install_command(&self) -> [&'static str; 2] {
        match self {
            NodePackageManager::Npm => ["npm", "install"],
            NodePackageManager::Yarn => ["yarn", "install"],
            NodePackageManager::Pnpm => ["pnpm", "install"],
            NodePackageManager::Bun => ["bun", "install"],
        }
    }

    /// Install command as a single line
    pub fn command_line(&self) -> String {
        self.install_command().join(" ")
    }
}

impl fmt::Display for NodePackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.install_command()[0])
    }
}

/// Result of a package manager installation
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// The command that was executed
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Standard error from the command
    pub stderr: String,
}

impl InstallResult {
    fn from_output(manager: NodePackageManager, output: Output) -> Self {
        Self {
            command: manager.command_line(),
            success: output.status.success(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Trait for running package manager install commands
pub trait PackageManagerRunner {
    /// Run the install command in the specified directory
    ///
    /// Fails only when the command cannot be started; an unsuccessful exit is
    /// reported through `InstallResult::success`.
    fn run_install(
        &self,
        manager: NodePackageManager,
        working_dir: &Path,
    ) -> Result<InstallResult, SyncError>;
}

/// Default package manager runner that executes real commands
#[derive(Debug, Default)]
pub struct SystemPackageManager;

impl SystemPackageManager {
    /// Create a new system package manager
    pub fn new() -> Self {
        Self
    }
}

impl PackageManagerRunner for SystemPackageManager {
    fn run_install(
        &self,
        manager: NodePackageManager,
        working_dir: &Path,
    ) -> Result<InstallResult, SyncError> {
        let [program, arg] = manager.install_command();
        let output = Command::new(program)
            .arg(arg)
            .current_dir(working_dir)
            .output()
            .map_err(|e| SyncError::Spawn {
                command: manager.command_line(),
                source: e,
            })?;
        Ok(InstallResult::from_output(manager, output))
    }
}

/// Remove every known lock file from `working_dir`
pub fn remove_lock_files(working_dir: &Path) -> Result<(), SyncError> {
    for (file, _) in LOCK_FILES {
        let path = working_dir.join(file);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| SyncError::LockFileRemoval {
                path: path.clone(),
                source: e,
            })?;
            tracing::debug!(path = %path.display(), "removed lock file");
        }
    }
    Ok(())
}

/// Resynchronize node_modules with the rewritten manifest
///
/// The package manager is detected before lock files are removed.
pub fn sync_node_modules<R: PackageManagerRunner>(
    runner: &R,
    working_dir: &Path,
    force_npm: bool,
) -> Result<InstallResult, SyncError> {
    let manager = NodePackageManager::detect(working_dir, force_npm);
    remove_lock_files(working_dir)?;

    tracing::info!(command = %manager.command_line(), "syncing node_modules");
    let result = runner.run_install(manager, working_dir)?;
    if !result.success {
        return Err(SyncError::CommandFailed {
            command: result.command,
            stderr: result.stderr.trim().to_string(),
        });
    }
    Ok(result)
}
