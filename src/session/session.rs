//! Session data, handles and the progress stream

use super::state::{ScanEvent, ScanStateMachine, ScanStatus};
use crate::error::ScanError;
use crate::github::RepositoryRef;
use crate::parallel::CancelToken;
use crate::scanner::{FileScanResult, IssueIndex, IssueSnapshot};
use crate::tree::TreeNode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;
use uuid::Uuid;

/// One scan attempt against one repository
///
/// Only the orchestrator writes to it; consumers read snapshots.
#[derive(Debug)]
pub struct ScanSession {
    pub repository: RepositoryRef,
    pub machine: ScanStateMachine,
    /// Branch the tree was resolved against
    pub branch: Option<String>,
    pub tree: Vec<TreeNode>,
    pub index: IssueIndex,
    pub error: Option<ScanError>,
    /// Non-fatal conditions worth reporting
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ScanSession {
    fn new(repository: RepositoryRef) -> Self {
        Self {
            repository,
            machine: ScanStateMachine::new(),
            branch: None,
            tree: Vec::new(),
            index: IssueIndex::new(),
            error: None,
            warnings: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn status(&self) -> ScanStatus {
        self.machine.status()
    }

    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            files_scanned: self.machine.files_scanned(),
            files_total: self.machine.files_total(),
            status: self.machine.status(),
        }
    }
}

/// Progress tick delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    pub files_scanned: usize,
    pub files_total: usize,
    pub status: ScanStatus,
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self {
            files_scanned: 0,
            files_total: 0,
            status: ScanStatus::Idle,
        }
    }
}

/// Read-only copy of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub repository: String,
    pub status: ScanStatus,
    pub files_total: usize,
    pub files_scanned: usize,
    pub branch: Option<String>,
    pub tree: Vec<TreeNode>,
    pub issues: IssueSnapshot,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ScanError>,
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

fn serialize_error<S: serde::Serializer>(error: &Option<ScanError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

/// State shared between the orchestrator's driver task and every handle
#[derive(Debug)]
pub(crate) struct SessionShared {
    id: Uuid,
    session: RwLock<ScanSession>,
    progress: watch::Sender<ScanProgress>,
    cancel: CancelToken,
}

impl SessionShared {
    pub(crate) fn new(repository: RepositoryRef) -> Arc<Self> {
        let (progress, _rx) = watch::channel(ScanProgress::default());
        Arc::new(Self {
            id: Uuid::new_v4(),
            session: RwLock::new(ScanSession::new(repository)),
            progress,
            cancel: CancelToken::new(),
        })
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ScanSession> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ScanSession> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Mutate the session and apply `event` in one critical section
    ///
    /// Returns false, without running `update`, when the session is already
    /// terminal: late results never land after completion, failure or
    /// cancellation.
    pub(crate) fn transition<F>(&self, event: Option<ScanEvent>, update: F) -> bool
    where
        F: FnOnce(&mut ScanSession),
    {
        let progress = {
            let mut session = self.write();
            if session.status().is_terminal() {
                return false;
            }
            update(&mut session);
            if let Some(event) = event {
                session.machine.apply(event);
            }
            if session.status().is_terminal() && session.finished_at.is_none() {
                session.finished_at = Some(Utc::now());
            }
            session.progress()
        };
        self.progress.send_if_modified(|current| {
            let changed = *current != progress;
            *current = progress;
            changed
        });
        true
    }

    pub(crate) fn record_file(&self, result: FileScanResult) -> bool {
        self.transition(Some(ScanEvent::FileFinished), |session| {
            session.index.record(result);
        })
    }

    pub(crate) fn fail(&self, error: ScanError) -> bool {
        let event = match error {
            ScanError::AuthExpired => ScanEvent::AuthRejected,
            _ => ScanEvent::TreeFailed,
        };
        self.transition(Some(event), |session| session.error = Some(error))
    }

    pub(crate) fn cancel(&self) -> bool {
        self.cancel.cancel();
        self.transition(Some(ScanEvent::Cancel), |_| {})
    }

    pub(crate) fn warn(&self, warning: String) {
        tracing::warn!("{}", warning);
        self.transition(None, |session| session.warnings.push(warning));
    }
}

/// Consumer handle to one session
///
/// Cheap to clone; stays readable after the session ends.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub(crate) shared: Arc<SessionShared>,
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn repository(&self) -> RepositoryRef {
        self.shared.read().repository.clone()
    }

    pub fn status(&self) -> ScanStatus {
        self.shared.read().status()
    }

    pub fn progress(&self) -> ScanProgress {
        self.shared.read().progress()
    }

    /// Stream of progress updates; starts with the current state
    ///
    /// Updates coalesce: a consumer that falls behind skips intermediate
    /// ticks and sees the latest counts. `files_scanned` never decreases and
    /// the terminal status is always delivered.
    pub fn subscribe_progress(&self) -> ProgressStream {
        ProgressStream::new(self.shared.progress.subscribe())
    }

    /// Current issues, partial while scanning
    pub fn issue_index(&self) -> IssueSnapshot {
        self.shared.read().index.snapshot()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.shared.read();
        SessionSnapshot {
            id: self.shared.id,
            repository: session.repository.full_name(),
            status: session.status(),
            files_total: session.machine.files_total(),
            files_scanned: session.machine.files_scanned(),
            branch: session.branch.clone(),
            tree: session.tree.clone(),
            issues: session.index.snapshot(),
            error: session.error.clone(),
            warnings: session.warnings.clone(),
            started_at: session.started_at,
            finished_at: session.finished_at,
        }
    }

    /// Stop dispatching and discard any result that arrives later
    pub fn cancel(&self) {
        if self.shared.cancel() {
            tracing::info!("Scan {} cancelled", self.shared.id);
        }
    }

    /// Wait for a terminal status and return the final snapshot
    pub async fn wait(&self) -> SessionSnapshot {
        let mut rx = self.shared.progress.subscribe();
        // The sender lives in `shared`, which this handle keeps alive
        let _ = rx.wait_for(|progress| progress.status.is_terminal()).await;
        self.snapshot()
    }
}

/// Progress updates for one session
///
/// Backed by a watch channel, so a slow consumer sees the latest state
/// rather than every tick; `files_scanned` never goes backwards. Ends after
/// the first terminal status.
#[derive(Debug)]
pub struct ProgressStream {
    rx: watch::Receiver<ScanProgress>,
    started: bool,
    finished: bool,
}

impl ProgressStream {
    fn new(rx: watch::Receiver<ScanProgress>) -> Self {
        Self {
            rx,
            started: false,
            finished: false,
        }
    }

    pub async fn next(&mut self) -> Option<ScanProgress> {
        if self.finished {
            return None;
        }
        if self.started {
            if self.rx.changed().await.is_err() {
                self.finished = true;
                return None;
            }
        } else {
            self.started = true;
        }

        let progress = *self.rx.borrow_and_update();
        if progress.status.is_terminal() {
            self.finished = true;
        }
        Some(progress)
    }
}
