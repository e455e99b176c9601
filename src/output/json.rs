//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the run report
//! - Per-entry upgrade/skip information in manifest order

use crate::domain::{Decision, TransitiveAudit, UpgradeOutcome, VersionDelta};
use crate::orchestrator::RunReport;
use crate::output::OutputFormatter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Include quiet entries (already latest, held back, unparsable)
    verbose: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    manifest: String,
    dry_run: bool,
    changed: bool,
    written: bool,
    synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    sync_hint: Option<&'a str>,
    summary: JsonSummary,
    dependencies: Vec<JsonEntry<'a>>,
}

/// Summary statistics
#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    upgrades: usize,
    skips: usize,
}

/// JSON representation of one declared entry
#[derive(Serialize)]
struct JsonEntry<'a> {
    name: &'a str,
    group: &'static str,
    current: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delta: Option<VersionDelta>,
    #[serde(flatten)]
    decision: &'a Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audit: Option<&'a TransitiveAudit>,
}

impl<'a> From<&'a UpgradeOutcome> for JsonEntry<'a> {
    fn from(outcome: &'a UpgradeOutcome) -> Self {
        Self {
            name: &outcome.dependency.name,
            group: outcome.dependency.group.key(),
            current: &outcome.dependency.range,
            latest: outcome.latest.as_deref(),
            delta: outcome.delta,
            decision: &outcome.decision,
            published_at: outcome.published_at,
            audit: outcome.audit.as_ref(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let upgrades = report.upgrade_count();
        let output = JsonOutput {
            manifest: report.manifest.display().to_string(),
            dry_run: report.dry_run,
            changed: report.changed,
            written: report.written,
            synced: report.synced,
            sync_hint: report.sync_hint.as_deref(),
            summary: JsonSummary {
                total: report.outcomes.len(),
                upgrades,
                skips: report.outcomes.len() - upgrades,
            },
            dependencies: report
                .visible_outcomes(self.verbose)
                .map(JsonEntry::from)
                .collect(),
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
