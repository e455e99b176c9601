//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One line per reported entry with a tick or cross mark
//! - Delta class indication (major/minor/patch and prerelease forms)
//! - Publish date and transitive audit annotations
//! - Summary line for the run

use crate::domain::{NormalizedVersion, SkipReason, TransitiveAudit, UpgradeOutcome, VersionDelta};
use crate::orchestrator::RunReport;
use crate::output::OutputFormatter;
use colored::{ColoredString, Colorize};
use std::io::Write;

const TICK: &str = "✔";
const CROSS: &str = "✖";
const ARROW: &str = "→";

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbose: bool,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter with color option
    pub fn with_color(verbose: bool, color: bool) -> Self {
        Self { verbose, color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn delta_label(&self, delta: VersionDelta) -> String {
        let label = format!("[{}]", delta);
        match delta {
            VersionDelta::Major | VersionDelta::Premajor => self.paint(&label, |s| s.red().bold()),
            VersionDelta::Minor | VersionDelta::Preminor => self.paint(&label, |s| s.yellow()),
            VersionDelta::Patch | VersionDelta::Prepatch => self.paint(&label, |s| s.green()),
            VersionDelta::Build | VersionDelta::Prerelease => self.paint(&label, |s| s.dimmed()),
        }
    }

    fn audit_label(&self, audit: &TransitiveAudit) -> String {
        let text = if audit.outdated.is_empty() {
            format!("({} deps, up to date)", audit.dependencies)
        } else {
            let breakdown: Vec<String> = audit
                .outdated
                .iter()
                .rev()
                .map(|(delta, count)| format!("{} {}", count, delta))
                .collect();
            format!(
                "({} deps, {} outdated: {})",
                audit.dependencies,
                audit.outdated_count(),
                breakdown.join(", ")
            )
        };
        self.paint(&text, |s| s.dimmed())
    }

    /// Format a single outcome line
    pub fn format_outcome(&self, outcome: &UpgradeOutcome, dry_run: bool) -> String {
        let range = &outcome.dependency.range;
        let current = NormalizedVersion::parse(range)
            .map(|v| v.to_string())
            .unwrap_or_else(|| range.clone());

        let mark = match outcome.skip_reason() {
            None if !dry_run => self.paint(TICK, |s| s.green()),
            Some(SkipReason::AlreadyLatest) => self.paint(TICK, |s| s.green()),
            _ => self.paint(CROSS, |s| s.yellow()),
        };

        let mut parts = vec![
            self.paint(&outcome.dependency.name, |s| s.cyan()),
            mark,
            current,
        ];

        match (outcome.skip_reason(), outcome.latest.as_deref()) {
            (Some(SkipReason::NotFound), _) | (_, None) => {
                parts.push(self.paint("(not found)", |s| s.red()));
                return parts.join(" ");
            }
            (Some(SkipReason::AlreadyLatest), Some(_)) => {
                parts.push(self.paint("[latest]", |s| s.dimmed()));
                return parts.join(" ");
            }
            (_, Some(latest)) => {
                parts.push(self.paint(ARROW, |s| s.yellow()));
                parts.push(latest.to_string());
            }
        }

        if let Some(delta) = outcome.delta {
            parts.push(self.delta_label(delta));
        }
        if let Some(published_at) = outcome.published_at {
            parts.push(self.paint(&published_at.format("(%Y/%m/%d)").to_string(), |s| {
                s.dimmed()
            }));
        }
        if let Some(audit) = &outcome.audit {
            parts.push(self.audit_label(audit));
        }

        let note = match outcome.skip_reason() {
            Some(SkipReason::SkipListed) => Some("(skipped)"),
            Some(SkipReason::MajorExcluded) => Some("(major excluded)"),
            Some(SkipReason::HeldBack) => Some("(held back)"),
            Some(SkipReason::Unparsable) => Some("(unparsable range)"),
            _ => None,
        };
        if let Some(note) = note {
            parts.push(self.paint(note, |s| s.yellow()));
        }

        parts.join(" ")
    }

    /// Final summary lines for the run
    pub fn format_summary(&self, report: &RunReport) -> Vec<String> {
        let mut lines = Vec::new();

        if !report.changed {
            lines.push(self.paint("no updates", |s| s.blue()));
            return lines;
        }

        if report.dry_run {
            lines.push(self.paint(
                "package.json not upgraded, run without -t to upgrade",
                |s| s.yellow(),
            ));
            return lines;
        }

        if let Some(command) = &report.sync_hint {
            lines.push(self.paint(
                &format!("node_modules not synced, run {} to sync", command),
                |s| s.yellow(),
            ));
        }
        let subject = if report.synced {
            "dependencies"
        } else {
            "package.json"
        };
        lines.push(self.paint(&format!("{} upgraded", subject), |s| s.blue()));
        lines
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            writer,
            "{}",
            self.paint(
                concat!("upgradeps v", env!("CARGO_PKG_VERSION")),
                |s| s.green()
            )
        )?;

        for outcome in report.visible_outcomes(self.verbose) {
            writeln!(writer, "{}", self.format_outcome(outcome, report.dry_run))?;
        }

        for line in self.format_summary(report) {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}
