//! upgradeps - upgrade package.json dependencies CLI tool
//!
//! Reads package.json in the target directory, looks up the latest version
//! of every dependency on the npm registry and rewrites the ranges.

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use upgradeps::cli::CliArgs;
use upgradeps::config::ConfigFile;
use upgradeps::logging;
use upgradeps::orchestrator::{Orchestrator, RunReport};
use upgradeps::output::{create_formatter, OutputConfig};
use upgradeps::package_manager::SystemPackageManager;
use upgradeps::update::UpgradePolicy;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = logging::init(args.verbose) {
        eprintln!("failed to initialize logging: {}", e);
    }

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::error!(error = %e, "upgradeps failed");
            eprintln!("{} {:#}", "✖".red(), e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = ConfigFile::load(&args.path, args.config.as_deref())?;
    let policy = UpgradePolicy::merge(&args, config.as_ref())?;
    tracing::debug!(?policy, "resolved policy");

    let orchestrator = Orchestrator::new(policy)?;
    let mut report = orchestrator.run(&args.path).await?;

    let sync_result = orchestrator.sync(&args.path, &mut report, &SystemPackageManager::new());

    print_report(&args, orchestrator.policy(), &report)?;

    sync_result.context("failed to sync node_modules")?;
    Ok(ExitCode::SUCCESS)
}

fn print_report(args: &CliArgs, policy: &UpgradePolicy, report: &RunReport) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    let color = stdout.is_terminal();
    let formatter =
        create_formatter(OutputConfig::from_cli(args.json, policy.verbose).with_color(color));

    formatter.format(report, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}
