//! Human-readable report

use super::{ScanReport, Verdict};
use crate::rules::Severity;
use console::style;
use std::fmt::Write;

fn severity_label(severity: Severity) -> String {
    let label = format!("{:<6}", severity.as_str().to_uppercase());
    match severity {
        Severity::High => style(label).red().bold().to_string(),
        Severity::Medium => style(label).yellow().bold().to_string(),
        Severity::Low => style(label).cyan().to_string(),
    }
}

fn verdict_label(verdict: Verdict) -> String {
    let label = verdict.to_string();
    match verdict {
        Verdict::Clean => style(label).green().bold().to_string(),
        Verdict::IssuesFound => style(label).red().bold().to_string(),
        Verdict::Incomplete => style(label).yellow().bold().to_string(),
        Verdict::Failed => style(label).red().bold().to_string(),
    }
}

/// Render the report for a terminal
pub fn render(report: &ScanReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    let target = match &report.branch {
        Some(branch) => format!("{}@{}", report.repository, branch),
        None => report.repository.clone(),
    };
    writeln!(out, "{}", style(format!("Scan of {target}")).bold().underlined())?;
    writeln!(out, "  {:<12} {}", style("Verdict").dim(), verdict_label(report.verdict))?;
    writeln!(
        out,
        "  {:<12} {}/{} scanned ({} failed, {} unreadable)",
        style("Files").dim(),
        report.files_scanned,
        report.files_total,
        report.failed.len(),
        report.unreadable.len()
    )?;
    writeln!(
        out,
        "  {:<12} {} high, {} medium, {} low",
        style("Issues").dim(),
        report.totals.high,
        report.totals.medium,
        report.totals.low
    )?;
    writeln!(
        out,
        "  {:<12} {} ({})",
        style("Risk score").dim(),
        report.risk,
        report.risk_level
    )?;

    if let Some(error) = &report.error {
        writeln!(out, "\n{} {}", style("✖").red().bold(), style(error).red())?;
    }

    for file in &report.findings {
        writeln!(out, "\n{} {}", severity_label(file.worst), style(&file.path).bold())?;
        for issue in &file.issues {
            writeln!(
                out,
                "  {} {} {} {}",
                style(format!("L{}:{}", issue.line, issue.column)).dim(),
                severity_label(issue.severity),
                style(&issue.rule_id).magenta(),
                issue.message
            )?;
            writeln!(out, "      {}", style(&issue.context_snippet).dim())?;
            if !issue.recommendation.is_empty() {
                writeln!(out, "      {} {}", style("→").green(), issue.recommendation)?;
            }
        }
    }

    if !report.failed.is_empty() {
        writeln!(out, "\n{}", style("Files that could not be fetched").yellow().bold())?;
        for file in &report.failed {
            writeln!(out, "  • {} ({})", file.path, file.reason)?;
        }
    }

    if !report.warnings.is_empty() {
        writeln!(out)?;
        for warning in &report.warnings {
            writeln!(out, "{} {}", style("⚠").yellow(), warning)?;
        }
    }

    if report.verdict == Verdict::Clean {
        writeln!(out, "\n{} No issues found", style("✔").green())?;
    }
    Ok(())
}
