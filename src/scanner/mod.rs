//! Line matching and issue aggregation
//!
//! [`LineMatcher`] turns one file's text into [`Issue`]s; [`IssueIndex`]
//! keeps the per-path results of a session and its running totals.

pub mod index;
pub mod matcher;
pub mod types;

pub use index::{IssueIndex, IssueSnapshot, SeverityTotals, SkippedFile};
pub use matcher::{LineMatcher, context_snippet, truncate_chars};
pub use types::{FileOutcome, FileScanResult, Issue, LineSummary, MatchLimits, worst_issue};
