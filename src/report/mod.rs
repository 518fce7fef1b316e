//! Scan reports
//!
//! A [`ScanReport`] is derived from a finished [`SessionSnapshot`] and keeps
//! "clean" apart from "incomplete": a scan with failed fetches is never
//! reported as clean.

pub mod json;
pub mod scoring;
pub mod text;

pub use scoring::{RiskLevel, RiskScore, ScoreWeights};

use crate::config::ReportConfig;
use crate::rules::Severity;
use crate::scanner::{Issue, SeverityTotals, SkippedFile, worst_issue};
use crate::session::{ScanStatus, SessionSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Overall outcome of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every candidate scanned, nothing found
    Clean,
    IssuesFound,
    /// Nothing found, but some files could not be fetched or the scan is
    /// still running
    Incomplete,
    /// The session errored or was cancelled
    Failed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Clean => "clean",
            Verdict::IssuesFound => "issues found",
            Verdict::Incomplete => "incomplete",
            Verdict::Failed => "failed",
        })
    }
}

/// Issues of one file, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFindings {
    pub path: String,
    pub worst: Severity,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub repository: String,
    pub branch: Option<String>,
    pub status: ScanStatus,
    pub verdict: Verdict,
    pub files_total: usize,
    pub files_scanned: usize,
    pub totals: SeverityTotals,
    pub risk: RiskScore,
    pub risk_level: RiskLevel,
    /// Worst files first, then by path
    pub findings: Vec<FileFindings>,
    pub failed: Vec<SkippedFile>,
    pub unreadable: Vec<SkippedFile>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ScanReport {
    pub fn from_snapshot(snapshot: &SessionSnapshot, config: &ReportConfig) -> Self {
        let totals = snapshot.issues.totals;
        let risk = RiskScore::compute(&totals, &config.score_weights, config.score_cap);

        let mut findings: Vec<FileFindings> = snapshot
            .issues
            .files_with_issues()
            .filter_map(|(path, issues)| {
                worst_issue(issues).map(|worst| FileFindings {
                    path: path.clone(),
                    worst: worst.severity,
                    issues: issues.clone(),
                })
            })
            .collect();
        findings.sort_by(|a, b| b.worst.cmp(&a.worst).then_with(|| a.path.cmp(&b.path)));

        Self {
            repository: snapshot.repository.clone(),
            branch: snapshot.branch.clone(),
            status: snapshot.status,
            verdict: verdict(snapshot),
            files_total: snapshot.files_total,
            files_scanned: snapshot.files_scanned,
            totals,
            risk,
            risk_level: risk.level(),
            findings,
            failed: snapshot.issues.failed.clone(),
            unreadable: snapshot.issues.unreadable.clone(),
            warnings: snapshot.warnings.clone(),
            error: snapshot.error.as_ref().map(ToString::to_string),
            started_at: snapshot.started_at,
            finished_at: snapshot.finished_at,
        }
    }

    pub fn has_high_severity(&self) -> bool {
        self.totals.high > 0
    }

    /// Process exit code: 2 failed, 1 high-severity issues, else 0
    pub fn exit_code(&self) -> u8 {
        if self.verdict == Verdict::Failed {
            2
        } else if self.has_high_severity() {
            1
        } else {
            0
        }
    }
}

fn verdict(snapshot: &SessionSnapshot) -> Verdict {
    match snapshot.status {
        ScanStatus::Error | ScanStatus::Cancelled => Verdict::Failed,
        _ if snapshot.issues.total_issues() > 0 => Verdict::IssuesFound,
        ScanStatus::Complete if snapshot.issues.failed.is_empty() => Verdict::Clean,
        _ => Verdict::Incomplete,
    }
}
