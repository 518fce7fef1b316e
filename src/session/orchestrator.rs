//! Scan orchestration: one driver task per session, the only writer to it

use super::session::{ProgressStream, SessionHandle, SessionShared};
use super::state::ScanEvent;
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::github::{ContentFetcher, FetchedContent, MAX_INLINE_CONTENT_BYTES, RepoApi, RepositoryRef};
use crate::parallel::{Flow, Pacer, Scheduler};
use crate::rules::RuleSet;
use crate::scanner::{FileScanResult, IssueSnapshot, LineMatcher, MatchLimits};
use crate::tree::{
    BranchPolicy, CandidateFile, ResolvedTree, build_tree, collect_candidates, fetch_repository_tree,
    format_size,
};
use std::sync::{Arc, Mutex, PoisonError};

/// Owns scan sessions and is the only writer to them
///
/// At most one session is active per orchestrator. Starting a scan while one
/// is fetching its tree or scanning returns the active session's handle.
pub struct ScanOrchestrator {
    api: Arc<dyn RepoApi>,
    rules: Arc<RuleSet>,
    branch_policy: BranchPolicy,
    active: Mutex<Option<SessionHandle>>,
}

impl ScanOrchestrator {
    pub fn new(api: Arc<dyn RepoApi>, rules: Arc<RuleSet>) -> Self {
        Self {
            api,
            rules,
            branch_policy: BranchPolicy::default(),
            active: Mutex::new(None),
        }
    }

    pub fn with_branch_policy(mut self, policy: BranchPolicy) -> Self {
        self.branch_policy = policy;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Start a fresh session and drive it on the current tokio runtime
    ///
    /// Must be called from within a runtime. A no-op returning the active
    /// handle while another session is still running.
    pub fn start_scan(&self, repository: RepositoryRef, config: &ScanConfig) -> SessionHandle {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = active.as_ref() {
            if handle.status().is_active() {
                tracing::debug!(
                    "Scan {} still running; ignoring start for {}",
                    handle.id(),
                    repository.full_name()
                );
                return handle.clone();
            }
        }

        let shared = SessionShared::new(repository);
        shared.transition(Some(ScanEvent::Start), |_| {});
        let handle = SessionHandle {
            shared: shared.clone(),
        };
        *active = Some(handle.clone());

        let driver = ScanDriver {
            api: self.api.clone(),
            rules: self.rules.clone(),
            config: config.clone(),
            branch_policy: self.branch_policy.clone(),
            shared,
        };
        tokio::spawn(driver.run());

        handle
    }

    /// Handle of the most recent session, if any
    pub fn current_session(&self) -> Option<SessionHandle> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Coalescing progress stream; see [`SessionHandle::subscribe_progress`]
    pub fn subscribe_progress(&self, handle: &SessionHandle) -> ProgressStream {
        handle.subscribe_progress()
    }

    /// Issue snapshot; reading never mutates the session
    pub fn get_issue_index(&self, handle: &SessionHandle) -> IssueSnapshot {
        handle.issue_index()
    }

    pub fn cancel_scan(&self, handle: &SessionHandle) {
        handle.cancel();
    }
}

/// Background task that takes one session from `FetchingTree` to a terminal state
struct ScanDriver {
    api: Arc<dyn RepoApi>,
    rules: Arc<RuleSet>,
    config: ScanConfig,
    branch_policy: BranchPolicy,
    shared: Arc<SessionShared>,
}

impl ScanDriver {
    async fn run(self) {
        let repository = self.shared.read().repository.clone();
        let cancel = self.shared.cancel_token().clone();
        tracing::info!("Fetching tree for {}", repository.full_name());

        let resolved = tokio::select! {
            resolved = self.fetch_tree(&repository) => resolved,
            _ = cancel.cancelled() => return,
        };
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::error!("Scan of {} failed: {}", repository.full_name(), err);
                self.shared.fail(err);
                return;
            }
        };

        let Some(candidates) = self.publish_tree(&repository, &resolved) else {
            return;
        };
        if candidates.is_empty() {
            tracing::info!("No candidate files in {}", repository.full_name());
            return;
        }

        self.scan_candidates(repository, resolved.branch, candidates).await;
    }

    async fn fetch_tree(&self, repository: &RepositoryRef) -> ScanResult<ResolvedTree> {
        let retry = self.config.retry_policy();
        fetch_repository_tree(self.api.as_ref(), repository, &self.branch_policy, &retry).await
    }

    /// Build the tree, pick candidates and move to `Scanning`
    ///
    /// `None` when the session ended meanwhile.
    fn publish_tree(&self, repository: &RepositoryRef, resolved: &ResolvedTree) -> Option<Vec<CandidateFile>> {
        let tree = build_tree(&resolved.listing.tree);
        let mut candidates = collect_candidates(&tree, &self.config.candidate_filter());

        if resolved.listing.truncated {
            self.shared.warn(format!(
                "Tree listing for {} was truncated by the remote; some files were not scanned",
                repository.full_name()
            ));
        }
        if candidates.len() > self.config.max_files_per_scan {
            self.shared.warn(format!(
                "{} candidate files found; scanning the first {}",
                candidates.len(),
                self.config.max_files_per_scan
            ));
            candidates.truncate(self.config.max_files_per_scan);
        }

        let files_total = candidates.len();
        let branch = resolved.branch.clone();
        let published = self
            .shared
            .transition(Some(ScanEvent::TreeResolved { files_total }), |session| {
                session.branch = Some(branch);
                session.tree = tree;
            });
        tracing::info!(
            "Tree for {}@{} resolved: {} candidate files",
            repository.full_name(),
            resolved.branch,
            files_total
        );
        published.then_some(candidates)
    }

    async fn scan_candidates(&self, repository: RepositoryRef, branch: String, candidates: Vec<CandidateFile>) {
        let (oversized, fetchable): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| candidate.size.is_some_and(|size| size > MAX_INLINE_CONTENT_BYTES));

        for candidate in oversized {
            tracing::debug!("Skipping {}: too large to inline", candidate.path);
            self.shared.record_file(FileScanResult::unreadable(
                candidate.path,
                format!("larger than {}", format_size(MAX_INLINE_CONTENT_BYTES)),
            ));
        }

        let paths: Vec<String> = fetchable.iter().map(|c| c.path.clone()).collect();
        let pacer = Arc::new(Pacer::new());
        let cancel = self.shared.cancel_token().clone();
        let scheduler = Scheduler::new(self.config.scheduler_config(), pacer.clone(), cancel);
        let task = FileTask {
            fetcher: ContentFetcher::new(self.api.clone(), pacer, self.config.retry_policy()),
            rules: self.rules.clone(),
            limits: self.config.match_limits(),
            repository: Arc::new(repository),
            branch: Arc::from(branch),
        };

        let shared = &self.shared;
        let summary = scheduler
            .run(
                fetchable,
                |candidate| {
                    let task = task.clone();
                    async move { task.scan(candidate).await }
                },
                |outcome: ScanResult<FileScanResult>| match outcome {
                    Ok(result) => {
                        if shared.record_file(result) {
                            Flow::Continue
                        } else {
                            Flow::Halt
                        }
                    }
                    Err(err) => {
                        tracing::error!("Aborting scan: {}", err);
                        shared.fail(err);
                        Flow::Halt
                    }
                },
            )
            .await;

        if summary.halted || summary.cancelled {
            return;
        }

        // A worker that died without a result must not stall completion
        let missing: Vec<String> = {
            let session = shared.read();
            paths.into_iter().filter(|path| !session.index.contains(path)).collect()
        };
        for path in missing {
            tracing::warn!("No result for {}; recording as failed", path);
            shared.record_file(FileScanResult::fetch_failed(path, "scan task aborted"));
        }

        let progress = shared.read().progress();
        tracing::info!(
            "Scan finished with status {} ({}/{} files)",
            progress.status,
            progress.files_scanned,
            progress.files_total
        );
    }
}

/// Everything one file needs, cloned into each task
#[derive(Clone)]
struct FileTask {
    fetcher: ContentFetcher,
    rules: Arc<RuleSet>,
    limits: MatchLimits,
    repository: Arc<RepositoryRef>,
    branch: Arc<str>,
}

impl FileTask {
    /// Fetch and match one file
    ///
    /// Only session-fatal errors are returned as `Err`; per-file failures
    /// become a flagged result.
    async fn scan(&self, candidate: CandidateFile) -> ScanResult<FileScanResult> {
        let path = candidate.path;
        match self.fetcher.fetch(&self.repository, &self.branch, &path).await {
            Ok(FetchedContent::Text(text)) => {
                let result = LineMatcher::new(&self.rules, self.limits).scan_file(&path, &text);
                tracing::debug!("Scanned {} ({} issues)", path, result.issues.len());
                Ok(result)
            }
            Ok(FetchedContent::Unreadable(reason)) => {
                tracing::debug!("Skipping {}: {}", path, reason);
                Ok(FileScanResult::unreadable(path, reason.to_string()))
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::warn!("{}", err);
                let reason = match err {
                    ScanError::FetchFailed { reason, .. } => reason,
                    other => other.to_string(),
                };
                Ok(FileScanResult::fetch_failed(path, reason))
            }
        }
    }
}
