//! `repoguard scan`

use super::{github_client, repository_ref};
use crate::cli::progress::{follow, progress_enabled};
use crate::cli::{Output, OutputFormat, ScanArgs};
use crate::config::RepoguardConfig;
use crate::report::{ScanReport, json, text};
use crate::session::ScanOrchestrator;
use anyhow::{Context, Result};
use std::sync::Arc;

pub async fn execute(args: ScanArgs, mut config: RepoguardConfig, output: &Output) -> Result<u8> {
    apply_overrides(&args, &mut config);
    config.validate().context("Invalid configuration")?;

    let repository = repository_ref(&args.remote, &config)?;
    let rules = Arc::new(config.rules.build_rule_set()?);
    let client = github_client(&config)?;

    output.verbose(&format!(
        "{} rules, concurrency {}, up to {} files",
        rules.len(),
        config.scan.max_concurrency,
        config.scan.max_files_per_scan
    ));

    let orchestrator =
        ScanOrchestrator::new(Arc::new(client), rules).with_branch_policy(config.github.branch_policy());
    let handle = orchestrator.start_scan(repository, &config.scan);

    let show_progress =
        args.format == OutputFormat::Text && !args.no_progress && !output.is_quiet();
    let progress = tokio::spawn(follow(
        orchestrator.subscribe_progress(&handle),
        progress_enabled(show_progress),
    ));

    let snapshot = tokio::select! {
        snapshot = handle.wait() => snapshot,
        _ = tokio::signal::ctrl_c() => {
            orchestrator.cancel_scan(&handle);
            handle.wait().await
        }
    };
    // The stream ends on the terminal status
    let _ = progress.await;

    let report = ScanReport::from_snapshot(&snapshot, &config.report);
    match args.format {
        OutputFormat::Text => output.print(&text::render(&report)),
        OutputFormat::Json => output.print(&json::render(&report).context("Failed to render report")?),
    }

    let code = report.exit_code();
    tracing::debug!("Exiting with {}", code);
    Ok(code)
}

fn apply_overrides(args: &ScanArgs, config: &mut RepoguardConfig) {
    if let Some(concurrency) = args.concurrency {
        config.scan.max_concurrency = concurrency;
    }
    if let Some(max_files) = args.max_files {
        config.scan.max_files_per_scan = max_files;
    }
    if !args.ext.is_empty() {
        config.scan.file_extension_allowlist = args.ext.clone();
    }
}
