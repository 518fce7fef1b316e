//! Aggregated issues for one session

use super::types::{FileOutcome, FileScanResult, Issue};
use crate::rules::Severity;
use serde::Serialize;
use std::collections::BTreeMap;

/// Issue counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityTotals {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityTotals {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut totals = Self::default();
        for issue in issues {
            *totals.slot(issue.severity) += 1;
        }
        totals
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    fn slot(&mut self, severity: Severity) -> &mut usize {
        match severity {
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
        }
    }

    fn add(&mut self, other: SeverityTotals) {
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
    }

    fn subtract(&mut self, other: SeverityTotals) {
        self.high = self.high.saturating_sub(other.high);
        self.medium = self.medium.saturating_sub(other.medium);
        self.low = self.low.saturating_sub(other.low);
    }
}

/// A file that produced no scannable content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Point-in-time copy of an [`IssueIndex`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueSnapshot {
    /// Every processed path; an empty list means scanned and clean
    pub by_path: BTreeMap<String, Vec<Issue>>,
    pub totals: SeverityTotals,
    /// Fetches that failed (soft warnings)
    pub failed: Vec<SkippedFile>,
    /// Non-text content that was skipped
    pub unreadable: Vec<SkippedFile>,
}

impl IssueSnapshot {
    pub fn total_issues(&self) -> usize {
        self.totals.total()
    }

    pub fn files_with_issues(&self) -> impl Iterator<Item = (&String, &Vec<Issue>)> {
        self.by_path.iter().filter(|(_, issues)| !issues.is_empty())
    }
}

/// Per-path results plus running severity totals
///
/// Recording a path again replaces its previous entry outright, so totals
/// never double count.
#[derive(Debug, Clone, Default)]
pub struct IssueIndex {
    results: BTreeMap<String, FileScanResult>,
    totals: SeverityTotals,
}

impl IssueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file's result, returning the one it replaced
    pub fn record(&mut self, result: FileScanResult) -> Option<FileScanResult> {
        self.totals.add(SeverityTotals::from_issues(&result.issues));
        let previous = self.results.insert(result.path.clone(), result);
        if let Some(previous) = &previous {
            self.totals.subtract(SeverityTotals::from_issues(&previous.issues));
        }
        previous
    }

    pub fn get(&self, path: &str) -> Option<&FileScanResult> {
        self.results.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.results.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn totals(&self) -> SeverityTotals {
        self.totals
    }

    pub fn results(&self) -> impl Iterator<Item = &FileScanResult> {
        self.results.values()
    }

    pub fn snapshot(&self) -> IssueSnapshot {
        let mut snapshot = IssueSnapshot {
            totals: self.totals,
            ..IssueSnapshot::default()
        };
        for (path, result) in &self.results {
            snapshot.by_path.insert(path.clone(), result.issues.clone());
            match &result.outcome {
                FileOutcome::Scanned => {}
                FileOutcome::FetchFailed { reason } => snapshot.failed.push(SkippedFile {
                    path: path.clone(),
                    reason: reason.clone(),
                }),
                FileOutcome::Unreadable { reason } => snapshot.unreadable.push(SkippedFile {
                    path: path.clone(),
                    reason: reason.clone(),
                }),
            }
        }
        snapshot
    }
}
