use crate::rules::{Category, Severity};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One rule match on one line of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub rule_id: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Byte column of the match start (1-indexed)
    pub column: usize,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub recommendation: String,
    /// Matched text, truncated for display
    pub matched_text: String,
    /// Surrounding line text, truncated for display
    pub context_snippet: String,
}

/// Display limits applied when issues are created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLimits {
    pub max_match_len: usize,
    pub max_snippet_len: usize,
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            max_match_len: 80,
            max_snippet_len: 160,
        }
    }
}

/// How a single file's scan ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Content was matched against the rules
    Scanned,
    /// Not text; skipped without being a failure
    Unreadable { reason: String },
    /// The fetch failed; recorded with zero issues and flagged
    FetchFailed { reason: String },
}

/// Result for one file
///
/// An entry exists only once the file has been processed; a `Scanned` entry
/// with no issues means the file is clean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileScanResult {
    pub path: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
    /// Ordered by line, then by rule order within a line
    pub issues: Vec<Issue>,
    pub scanned_at: DateTime<Utc>,
}

/// Worst issue on one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSummary {
    pub line: usize,
    pub severity: Severity,
    /// Rule of the first issue with the line's worst severity
    pub rule_id: String,
    pub issue_count: usize,
}

impl FileScanResult {
    pub fn scanned(path: impl Into<String>, issues: Vec<Issue>) -> Self {
        Self {
            path: path.into(),
            outcome: FileOutcome::Scanned,
            issues,
            scanned_at: Utc::now(),
        }
    }

    pub fn unreadable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outcome: FileOutcome::Unreadable {
                reason: reason.into(),
            },
            issues: Vec::new(),
            scanned_at: Utc::now(),
        }
    }

    pub fn fetch_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outcome: FileOutcome::FetchFailed {
                reason: reason.into(),
            },
            issues: Vec::new(),
            scanned_at: Utc::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, FileOutcome::FetchFailed { .. })
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self.outcome, FileOutcome::Unreadable { .. })
    }

    /// Scanned successfully with nothing found
    pub fn is_clean(&self) -> bool {
        self.outcome == FileOutcome::Scanned && self.issues.is_empty()
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        worst_issue(&self.issues).map(|issue| issue.severity)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// One summary per line that has issues, in line order
    pub fn line_summaries(&self) -> Vec<LineSummary> {
        let mut summaries: Vec<LineSummary> = Vec::new();
        for chunk in self.issues.chunk_by(|a, b| a.line == b.line) {
            if let Some(worst) = worst_issue(chunk) {
                summaries.push(LineSummary {
                    line: worst.line,
                    severity: worst.severity,
                    rule_id: worst.rule_id.clone(),
                    issue_count: chunk.len(),
                });
            }
        }
        summaries
    }
}

/// Highest severity wins; the first occurrence wins ties
pub fn worst_issue(issues: &[Issue]) -> Option<&Issue> {
    issues.iter().fold(None, |worst: Option<&Issue>, issue| match worst {
        Some(current) if current.severity >= issue.severity => Some(current),
        _ => Some(issue),
    })
}
