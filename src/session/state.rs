//! Explicit scan state machine
//!
//! Every transition is a named `(status, event)` pair. Pairs without a
//! transition are ignored, so no undefined intermediate state is reachable.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    #[default]
    Idle,
    FetchingTree,
    Scanning,
    Complete,
    Error,
    Cancelled,
}

impl ScanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Complete | ScanStatus::Error | ScanStatus::Cancelled)
    }

    /// A session in this state owns the orchestrator
    pub fn is_active(&self) -> bool {
        matches!(self, ScanStatus::FetchingTree | ScanStatus::Scanning)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Idle => "idle",
            ScanStatus::FetchingTree => "fetching_tree",
            ScanStatus::Scanning => "scanning",
            ScanStatus::Complete => "complete",
            ScanStatus::Error => "error",
            ScanStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    Start,
    /// Tree built; `files_total` candidates will be scanned
    TreeResolved { files_total: usize },
    /// No branch candidate produced a tree
    TreeFailed,
    /// One candidate finished, whatever its outcome
    FileFinished,
    /// The remote rejected the credentials
    AuthRejected,
    Cancel,
}

/// Status plus the counters that drive completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStateMachine {
    status: ScanStatus,
    files_total: usize,
    files_scanned: usize,
}

impl ScanStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn files_total(&self) -> usize {
        self.files_total
    }

    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// Apply an event, returning whether anything changed
    pub fn apply(&mut self, event: ScanEvent) -> bool {
        use ScanEvent as E;
        use ScanStatus as S;

        let before = *self;
        match (self.status, event) {
            (S::Idle, E::Start) => {
                self.status = S::FetchingTree;
            }
            (S::FetchingTree, E::TreeResolved { files_total: 0 }) => {
                self.files_total = 0;
                self.status = S::Complete;
            }
            (S::FetchingTree, E::TreeResolved { files_total }) => {
                self.files_total = files_total;
                self.files_scanned = 0;
                self.status = S::Scanning;
            }
            (S::FetchingTree, E::TreeFailed) => {
                self.status = S::Error;
            }
            (S::Scanning, E::FileFinished) => {
                self.files_scanned += 1;
                if self.files_scanned >= self.files_total {
                    self.status = S::Complete;
                }
            }
            (S::FetchingTree | S::Scanning, E::AuthRejected) => {
                self.status = S::Error;
            }
            (S::Idle | S::FetchingTree | S::Scanning, E::Cancel) => {
                self.status = S::Cancelled;
            }
            _ => {}
        }
        *self != before
    }
}
