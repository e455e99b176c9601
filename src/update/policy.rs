//! Upgrade policy
//!
//! This module provides the UpgradePolicy struct that encapsulates every
//! option affecting resolution, writing and sync. It is built once per run
//! by merging CLI flags over the configuration file over defaults.

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::domain::DependencyGroup;
use crate::error::ConfigError;
use std::collections::BTreeSet;

/// Immutable policy snapshot for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradePolicy {
    /// Groups to process, in manifest order
    pub groups: Vec<DependencyGroup>,
    /// Package names never rewritten
    pub skip: BTreeSet<String>,
    /// Only process devDependencies
    pub dev_only: bool,
    /// Never apply major upgrades
    pub minor_only: bool,
    /// Write `{latest}` instead of `^{latest}`
    pub fixed: bool,
    /// Registry base URL override
    pub registry: Option<String>,
    /// Report without writing
    pub dry_run: bool,
    /// Report up-to-date and held back entries too
    pub verbose: bool,
    /// Skip the transitive audit
    pub minimal: bool,
    /// Resync node_modules after writing
    pub sync: bool,
    /// Use npm for sync regardless of lock files
    pub force_npm: bool,
}

impl Default for UpgradePolicy {
    fn default() -> Self {
        Self {
            groups: DependencyGroup::DEFAULT.to_vec(),
            skip: BTreeSet::new(),
            dev_only: false,
            minor_only: false,
            fixed: false,
            registry: None,
            dry_run: false,
            verbose: false,
            minimal: false,
            sync: false,
            force_npm: false,
        }
    }
}

impl UpgradePolicy {
    /// Create a policy with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge CLI flags and the optional configuration file
    ///
    /// Precedence per field: flag, then config file, then default.
    pub fn merge(args: &CliArgs, config: Option<&ConfigFile>) -> Result<Self, ConfigError> {
        let config = config.cloned().unwrap_or_default();

        let groups = if !args.groups.is_empty() {
            parse_groups(&args.groups)?
        } else if let Some(groups) = config.groups.as_deref() {
            parse_groups(groups)?
        } else {
            DependencyGroup::DEFAULT.to_vec()
        };

        let skip = if !args.skip.is_empty() {
            collect_names(&args.skip)
        } else {
            collect_names(config.skip.as_deref().unwrap_or_default())
        };

        let registry = match args.registry.clone().or(config.registry) {
            Some(url) => Some(validate_registry(&url)?),
            None => None,
        };

        Ok(Self {
            groups,
            skip,
            dev_only: args.dev_only || config.dev_only.unwrap_or(false),
            minor_only: args.minor_only || config.minor_only.unwrap_or(false),
            fixed: args.fixed || config.fixed.unwrap_or(false),
            registry,
            dry_run: args.dry_run || config.test.unwrap_or(false),
            verbose: args.verbose || config.verbose.unwrap_or(false),
            minimal: args.minimal || config.minimal.unwrap_or(false),
            sync: args.modules || config.modules.unwrap_or(false),
            force_npm: args.npm || config.npm.unwrap_or(false),
        })
    }

    pub fn with_skip(mut self, names: Vec<String>) -> Self {
        self.skip = collect_names(&names);
        self
    }

    pub fn with_dev_only(mut self, dev_only: bool) -> Self {
        self.dev_only = dev_only;
        self
    }

    pub fn with_minor_only(mut self, minor_only: bool) -> Self {
        self.minor_only = minor_only;
        self
    }

    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_minimal(mut self, minimal: bool) -> Self {
        self.minimal = minimal;
        self
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Groups actually read from the manifest
    pub fn groups_in_scope(&self) -> Vec<DependencyGroup> {
        if self.dev_only {
            vec![DependencyGroup::DevDependencies]
        } else {
            self.groups.clone()
        }
    }

    /// Check if a package is on the skip list
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip.contains(name)
    }

    /// Whether target versions get a transitive audit
    pub fn audit(&self) -> bool {
        !self.minimal
    }

    /// Range written for a target version
    pub fn range_for(&self, version: &str) -> String {
        if self.fixed {
            version.to_string()
        } else {
            format!("^{}", version)
        }
    }
}

fn parse_groups(values: &[String]) -> Result<Vec<DependencyGroup>, ConfigError> {
    let mut groups = values
        .iter()
        .map(|value| value.parse::<DependencyGroup>())
        .collect::<Result<Vec<_>, _>>()?;
    groups.sort();
    groups.dedup();
    Ok(groups)
}

fn collect_names(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_registry(value: &str) -> Result<String, ConfigError> {
    let url = reqwest::Url::parse(value).map_err(|e| ConfigError::InvalidRegistry {
        value: value.to_string(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidRegistry {
            value: value.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> CliArgs {
        let mut full = vec!["upgradeps"];
        full.extend_from_slice(argv);
        CliArgs::parse_from(full)
    }

    #[test]
    fn test_defaults() {
        let policy = UpgradePolicy::merge(&args(&[]), None).unwrap();
        assert_eq!(policy, UpgradePolicy::default());
        assert_eq!(
            policy.groups_in_scope(),
            vec![
                DependencyGroup::Dependencies,
                DependencyGroup::DevDependencies
            ]
        );
        assert!(policy.audit());
    }

    #[test]
    fn test_flags_override_config() {
        let config = ConfigFile {
            groups: Some(vec!["peerDependencies".to_string()]),
            skip: Some(vec!["react".to_string()]),
            registry: Some("https://config.example.com".to_string()),
            ..Default::default()
        };
        let policy = UpgradePolicy::merge(
            &args(&[
                "-g",
                "optionalDependencies",
                "-s",
                "vue",
                "-r",
                "https://flag.example.com/",
            ]),
            Some(&config),
        )
        .unwrap();

        assert_eq!(policy.groups, vec![DependencyGroup::OptionalDependencies]);
        assert!(policy.is_skipped("vue"));
        assert!(!policy.is_skipped("react"));
        assert_eq!(policy.registry.as_deref(), Some("https://flag.example.com"));
    }

    #[test]
    fn test_config_over_defaults() {
        let config = ConfigFile {
            groups: Some(vec!["dev".to_string(), "dependencies".to_string()]),
            minor_only: Some(true),
            test: Some(true),
            minimal: Some(true),
            modules: Some(true),
            ..Default::default()
        };
        let policy = UpgradePolicy::merge(&args(&[]), Some(&config)).unwrap();

        assert_eq!(
            policy.groups,
            vec![
                DependencyGroup::Dependencies,
                DependencyGroup::DevDependencies
            ]
        );
        assert!(policy.minor_only);
        assert!(policy.dry_run);
        assert!(!policy.audit());
        assert!(policy.sync);
        assert!(!policy.fixed);
    }

    #[test]
    fn test_invalid_group() {
        let err = UpgradePolicy::merge(&args(&["-g", "deps"]), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGroup { .. }));
    }

    #[test]
    fn test_invalid_registry() {
        let err = UpgradePolicy::merge(&args(&["-r", "not a url"]), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegistry { .. }));

        let err = UpgradePolicy::merge(&args(&["-r", "ftp://example.com"]), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegistry { .. }));
    }

    #[test]
    fn test_skip_ignores_empty_names() {
        let policy = UpgradePolicy::merge(&args(&["-s", "a,,b, "]), None).unwrap();
        assert_eq!(policy.skip.len(), 2);
        assert!(policy.is_skipped("a"));
        assert!(policy.is_skipped("b"));
    }

    #[test]
    fn test_dev_only_scope() {
        let policy = UpgradePolicy::new().with_dev_only(true);
        assert_eq!(
            policy.groups_in_scope(),
            vec![DependencyGroup::DevDependencies]
        );
    }

    #[test]
    fn test_range_for() {
        assert_eq!(UpgradePolicy::new().range_for("1.0.1"), "^1.0.1");
        assert_eq!(UpgradePolicy::new().with_fixed(true).range_for("1.0.1"), "1.0.1");
    }
}
