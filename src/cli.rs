//! CLI argument parsing module for upgradeps

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Upgrade package.json dependencies to their latest published versions
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "upgradeps",
    version,
    about = "Upgrade package.json dependencies to their latest published versions"
)]
pub struct CliArgs {
    /// Project directory containing package.json (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Dependency groups to process, comma separated (e.g. dependencies,peerDependencies)
    #[arg(short, long, value_delimiter = ',', action = ArgAction::Append)]
    pub groups: Vec<String>,

    /// Packages to leave untouched, comma separated (can be specified multiple times)
    #[arg(short, long, value_delimiter = ',', action = ArgAction::Append)]
    pub skip: Vec<String>,

    /// Only process devDependencies
    #[arg(short, long)]
    pub dev_only: bool,

    /// Never apply major upgrades; pick the newest version within the installed major
    #[arg(short = 'o', long)]
    pub minor_only: bool,

    /// Write exact versions instead of caret ranges
    #[arg(short, long)]
    pub fixed: bool,

    /// npm registry base URL
    #[arg(short, long)]
    pub registry: Option<String>,

    /// Query versions without writing package.json
    #[arg(short = 't', long = "test", visible_alias = "dry-run")]
    pub dry_run: bool,

    /// Show up-to-date and held back packages too
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip the audit of each target version's own dependencies
    #[arg(short = 'x', long)]
    pub minimal: bool,

    /// Sync node_modules after upgrading
    #[arg(short = 'm', long)]
    pub modules: bool,

    /// Force npm as the package manager when syncing
    #[arg(short, long)]
    pub npm: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Configuration file (default: upgradeps.toml in the project directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["upgradeps"]);
        assert_eq!(args.path, PathBuf::from("."));
        assert!(args.groups.is_empty());
        assert!(args.skip.is_empty());
        assert!(!args.dev_only);
        assert!(!args.minor_only);
        assert!(!args.fixed);
        assert!(args.registry.is_none());
        assert!(!args.dry_run);
        assert!(!args.verbose);
        assert!(!args.minimal);
        assert!(!args.modules);
        assert!(!args.npm);
        assert!(!args.json);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_path_argument() {
        let args = CliArgs::parse_from(["upgradeps", "/some/path"]);
        assert_eq!(args.path, PathBuf::from("/some/path"));
    }

    #[test]
    fn test_dry_run_flags() {
        let args = CliArgs::parse_from(["upgradeps", "-t"]);
        assert!(args.dry_run);

        let args = CliArgs::parse_from(["upgradeps", "--test"]);
        assert!(args.dry_run);

        let args = CliArgs::parse_from(["upgradeps", "--dry-run"]);
        assert!(args.dry_run);
    }

    #[test]
    fn test_skip_comma_separated_and_repeated() {
        let args = CliArgs::parse_from(["upgradeps", "-s", "react,react-dom", "--skip", "jest"]);
        assert_eq!(args.skip, vec!["react", "react-dom", "jest"]);
    }

    #[test]
    fn test_groups() {
        let args = CliArgs::parse_from(["upgradeps", "-g", "dependencies,peerDependencies"]);
        assert_eq!(args.groups, vec!["dependencies", "peerDependencies"]);
    }

    #[test]
    fn test_short_flags() {
        let args = CliArgs::parse_from(["upgradeps", "-d", "-o", "-f", "-v", "-x", "-m", "-n"]);
        assert!(args.dev_only);
        assert!(args.minor_only);
        assert!(args.fixed);
        assert!(args.verbose);
        assert!(args.minimal);
        assert!(args.modules);
        assert!(args.npm);
    }

    #[test]
    fn test_registry_and_config() {
        let args = CliArgs::parse_from([
            "upgradeps",
            "-r",
            "https://npm.example.com",
            "--config",
            "ci/upgradeps.toml",
        ]);
        assert_eq!(args.registry.as_deref(), Some("https://npm.example.com"));
        assert_eq!(args.config, Some(PathBuf::from("ci/upgradeps.toml")));
    }

    #[test]
    fn test_combined_flags() {
        let args = CliArgs::parse_from([
            "upgradeps",
            "/path/to/project",
            "--test",
            "--minor-only",
            "--skip",
            "lodash",
            "--json",
        ]);
        assert_eq!(args.path, PathBuf::from("/path/to/project"));
        assert!(args.dry_run);
        assert!(args.minor_only);
        assert_eq!(args.skip, vec!["lodash"]);
        assert!(args.json);
    }
}
