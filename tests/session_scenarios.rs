//! End-to-end session behavior against an in-memory remote

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use repoguard::config::ScanConfig;
use repoguard::error::ScanError;
use repoguard::github::{
    ApiError, ContentResponse, RepoApi, RepositoryRef, TreeEntry, TreeListing,
};
use repoguard::report::{ScanReport, Verdict};
use repoguard::rules::{Category, RuleSet, Severity};
use repoguard::scanner::worst_issue;
use repoguard::session::{ScanOrchestrator, ScanStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum FakeFile {
    Text(String),
    Bytes(Vec<u8>),
    Status(u16),
    Unauthorized,
    /// Rate limited this many times, then served
    RateLimited(usize, String),
}

#[derive(Default)]
struct FakeApi {
    default_branch: Option<String>,
    trees: HashMap<String, TreeListing>,
    files: HashMap<String, FakeFile>,
    latency: Duration,
    /// Returned, in order, by the first tree calls
    tree_errors: Mutex<VecDeque<ApiError>>,
    tree_latency: Duration,
    default_branch_error: Option<ApiError>,
    tree_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    content_calls: AtomicUsize,
    rate_limit_hits: Mutex<HashMap<String, usize>>,
}

impl FakeApi {
    fn new() -> Self {
        Self::default()
    }

    fn branch(mut self, branch: &str, entries: Vec<TreeEntry>) -> Self {
        self.trees.insert(
            branch.to_string(),
            TreeListing {
                sha: Some(format!("sha-{branch}")),
                tree: entries,
                truncated: false,
            },
        );
        self
    }

    fn file(mut self, path: &str, file: FakeFile) -> Self {
        self.files.insert(path.to_string(), file);
        self
    }

    fn text(self, path: &str, text: &str) -> Self {
        self.file(path, FakeFile::Text(text.to_string()))
    }

    fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn truncated(mut self, branch: &str) -> Self {
        if let Some(listing) = self.trees.get_mut(branch) {
            listing.truncated = true;
        }
        self
    }

    fn tree_error(self, error: ApiError) -> Self {
        self.tree_errors.lock().unwrap().push_back(error);
        self
    }

    fn tree_latency(mut self, latency: Duration) -> Self {
        self.tree_latency = latency;
        self
    }

    fn tree_calls(&self) -> usize {
        self.tree_calls.load(Ordering::SeqCst)
    }

    fn calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }
}

fn encoded(bytes: &[u8]) -> ContentResponse {
    ContentResponse {
        content: Some(STANDARD.encode(bytes)),
        encoding: Some("base64".to_string()),
        size: bytes.len() as u64,
        ..ContentResponse::default()
    }
}

#[async_trait]
impl RepoApi for FakeApi {
    async fn default_branch(&self, _repo: &RepositoryRef) -> Result<Option<String>, ApiError> {
        match &self.default_branch_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.default_branch.clone()),
        }
    }

    async fn tree(&self, _repo: &RepositoryRef, branch: &str) -> Result<TreeListing, ApiError> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.tree_latency).await;
        let queued = self.tree_errors.lock().unwrap().pop_front();
        if let Some(err) = queued {
            return Err(err);
        }
        self.trees
            .get(branch)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(branch.to_string()))
    }

    async fn content(
        &self,
        _repo: &RepositoryRef,
        _git_ref: &str,
        path: &str,
    ) -> Result<ContentResponse, ApiError> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.files.get(path) {
            Some(FakeFile::Text(text)) => Ok(encoded(text.as_bytes())),
            Some(FakeFile::Bytes(bytes)) => Ok(encoded(bytes)),
            Some(FakeFile::Status(status)) => Err(ApiError::Status {
                status: *status,
                message: "upstream error".to_string(),
            }),
            Some(FakeFile::Unauthorized) => Err(ApiError::Unauthorized),
            Some(FakeFile::RateLimited(times, text)) => {
                let mut hits = self.rate_limit_hits.lock().unwrap();
                let seen = hits.entry(path.to_string()).or_default();
                if *seen < *times {
                    *seen += 1;
                    Err(ApiError::RateLimited { retry_after: None })
                } else {
                    Ok(encoded(text.as_bytes()))
                }
            }
            None => Err(ApiError::NotFound(path.to_string())),
        }
    }
}

fn scan_config(max_concurrency: usize) -> ScanConfig {
    ScanConfig {
        max_concurrency,
        batch_pause_ms: 0,
        rate_limit_backoff_ms: 5,
        ..ScanConfig::default()
    }
}

fn orchestrator(api: Arc<FakeApi>) -> ScanOrchestrator {
    ScanOrchestrator::new(api, Arc::new(RuleSet::builtin().unwrap()))
}

fn repo() -> RepositoryRef {
    RepositoryRef::new("octo", "demo")
}

const LEAKED_KEY_LINE: &str = "API_KEY = \"sk-abcdEFGH1234567890abcd\"\n";

#[tokio::test]
async fn test_secret_in_source_file() {
    let api = Arc::new(
        FakeApi::new()
            .branch("main", vec![TreeEntry::blob("app.py", 40)])
            .text("app.py", LEAKED_KEY_LINE),
    );
    let snapshot = orchestrator(api).start_scan(repo(), &scan_config(4)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    let issues = &snapshot.issues.by_path["app.py"];
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].line, 1);
    assert_eq!(issues[0].severity, Severity::High);
    assert_eq!(issues[0].category, Category::Secrets);
    assert_eq!(snapshot.issues.totals.high, 1);
}

#[tokio::test]
async fn test_env_file_has_no_secret_issues() {
    let api = Arc::new(
        FakeApi::new()
            .branch("main", vec![TreeEntry::blob(".env", 40), TreeEntry::blob("config/prod.env", 60)])
            .text(".env", LEAKED_KEY_LINE)
            .text("config/prod.env", "API_KEY=sk-abcdEFGH1234567890abcd\nrun = eval(payload)\n"),
    );
    let snapshot = orchestrator(api).start_scan(repo(), &scan_config(4)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.files_scanned, 2);
    assert!(snapshot.issues.by_path[".env"].is_empty());

    let prod = &snapshot.issues.by_path["config/prod.env"];
    assert!(prod.iter().all(|issue| issue.category != Category::Secrets));
    assert!(prod.iter().any(|issue| issue.category == Category::Insecure));
}

#[tokio::test]
async fn test_auth_failure_stops_the_scan() {
    let mut entries = Vec::new();
    let mut api = FakeApi::new();
    for i in 0..5 {
        let path = format!("f{i}.py");
        entries.push(TreeEntry::blob(&path, 10));
        api = api.file(&path, FakeFile::Unauthorized);
    }
    let api = Arc::new(api.branch("main", entries));

    let snapshot = orchestrator(api.clone()).start_scan(repo(), &scan_config(1)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Error);
    assert_eq!(snapshot.error, Some(ScanError::AuthExpired));
    assert_eq!(snapshot.files_scanned, 0);
    assert_eq!(snapshot.files_total, 5);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(api.calls(), 1, "no fetch may follow a rejected token");
}

#[tokio::test]
async fn test_auth_failure_freezes_progress_mid_scan() {
    let api = Arc::new(
        FakeApi::new()
            .branch(
                "main",
                vec![
                    TreeEntry::blob("a.py", 1),
                    TreeEntry::blob("b.py", 1),
                    TreeEntry::blob("c.py", 1),
                    TreeEntry::blob("d.py", 1),
                ],
            )
            .text("a.py", "ok = 1\n")
            .text("b.py", "ok = 2\n")
            .file("c.py", FakeFile::Unauthorized)
            .text("d.py", "ok = 4\n"),
    );
    let handle = orchestrator(api.clone()).start_scan(repo(), &scan_config(1));
    let snapshot = handle.wait().await;

    assert_eq!(snapshot.status, ScanStatus::Error);
    assert_eq!(snapshot.files_scanned, 2);
    assert!(!snapshot.issues.by_path.contains_key("d.py"));
    assert_eq!(api.calls(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_is_bounded() {
    let mut entries = Vec::new();
    let mut api = FakeApi::new().latency(Duration::from_millis(10));
    for i in 0..50 {
        let path = format!("src/module_{i:02}.py");
        entries.push(TreeEntry::blob(&path, 20));
        api = api.text(&path, "def handler():\n    return 1\n");
    }
    let api = Arc::new(api.branch("main", entries));

    let snapshot = orchestrator(api.clone()).start_scan(repo(), &scan_config(10)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.files_scanned, 50);
    assert_eq!(snapshot.files_total, 50);
    let peak = api.peak.load(Ordering::SeqCst);
    assert!(peak <= 10, "peak in-flight fetches was {peak}");
    assert_eq!(api.calls(), 50);
}

#[tokio::test]
async fn test_cancel_mid_scan_freezes_results() {
    let mut entries = Vec::new();
    let mut api = FakeApi::new().latency(Duration::from_millis(15));
    for i in 0..50 {
        let path = format!("f{i:02}.js");
        entries.push(TreeEntry::blob(&path, 20));
        api = api.text(&path, "// TODO tidy\n");
    }
    let api = Arc::new(api.branch("main", entries));
    let orchestrator = orchestrator(api.clone());
    let handle = orchestrator.start_scan(repo(), &scan_config(5));

    let mut progress = orchestrator.subscribe_progress(&handle);
    while let Some(tick) = progress.next().await {
        if tick.files_scanned >= 20 {
            orchestrator.cancel_scan(&handle);
            break;
        }
    }

    let frozen = handle.snapshot();
    assert_eq!(frozen.status, ScanStatus::Cancelled);
    assert!(frozen.files_scanned >= 20 && frozen.files_scanned < 50);

    // In-flight fetches finish; none of their results may land
    tokio::time::sleep(Duration::from_millis(120)).await;
    let later = handle.snapshot();
    assert_eq!(later.files_scanned, frozen.files_scanned);
    assert_eq!(later.issues, frozen.issues);
    assert_eq!(later.issues.by_path.len(), frozen.files_scanned);
    assert!(api.calls() < 50);
}

#[tokio::test]
async fn test_progress_stream_is_monotonic_and_ends() {
    let mut entries = Vec::new();
    let mut api = FakeApi::new().latency(Duration::from_millis(2));
    for i in 0..8 {
        let path = format!("f{i}.py");
        entries.push(TreeEntry::blob(&path, 5));
        api = api.text(&path, "x = 1\n");
    }
    let orchestrator = orchestrator(Arc::new(api.branch("main", entries)));
    let handle = orchestrator.start_scan(repo(), &scan_config(3));

    let mut stream = handle.subscribe_progress();
    let mut last = 0;
    let mut final_status = None;
    while let Some(tick) = stream.next().await {
        assert!(tick.files_scanned >= last);
        last = tick.files_scanned;
        final_status = Some(tick.status);
    }
    assert_eq!(final_status, Some(ScanStatus::Complete));
    assert_eq!(last, 8);
}

#[tokio::test]
async fn test_zero_candidates_complete_immediately() {
    let api = Arc::new(
        FakeApi::new().branch("main", vec![TreeEntry::blob("logo.png", 500), TreeEntry::tree("assets")]),
    );
    let snapshot = orchestrator(api.clone()).start_scan(repo(), &scan_config(4)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.files_total, 0);
    assert!(snapshot.issues.by_path.is_empty());
    assert_eq!(snapshot.issues.total_issues(), 0);
    assert_eq!(api.calls(), 0);
    assert_eq!(snapshot.tree.len(), 2);
}

#[tokio::test]
async fn test_branch_fallback_and_default_branch() {
    let api = Arc::new(
        FakeApi::new()
            .branch("master", vec![TreeEntry::blob("a.py", 1)])
            .text("a.py", "x = 1\n"),
    );
    let snapshot = orchestrator(api).start_scan(repo(), &scan_config(2)).wait().await;
    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.branch.as_deref(), Some("master"));

    let mut api = FakeApi::new()
        .branch("trunk", vec![TreeEntry::blob("a.py", 1)])
        .text("a.py", "x = 1\n");
    api.default_branch = Some("trunk".to_string());
    let snapshot = orchestrator(Arc::new(api)).start_scan(repo(), &scan_config(2)).wait().await;
    assert_eq!(snapshot.branch.as_deref(), Some("trunk"));
}

#[tokio::test]
async fn test_tree_unavailable_is_fatal() {
    let api = Arc::new(FakeApi::new().branch("gh-pages", vec![TreeEntry::blob("a.py", 1)]));
    let snapshot = orchestrator(api).start_scan(repo(), &scan_config(2)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Error);
    match snapshot.error {
        Some(ScanError::TreeUnavailable { tried, .. }) => assert_eq!(tried, vec!["main", "master"]),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_explicit_branch_candidates_are_used_in_order() {
    let api = Arc::new(
        FakeApi::new()
            .branch("release", vec![TreeEntry::blob("a.py", 1)])
            .branch("main", vec![])
            .text("a.py", "x = 1\n"),
    );
    let repository = repo().with_branches(["missing", "release", "main"]);
    let snapshot = orchestrator(api).start_scan(repository, &scan_config(2)).wait().await;
    assert_eq!(snapshot.branch.as_deref(), Some("release"));
    assert_eq!(snapshot.files_total, 1);
}

#[tokio::test]
async fn test_fetch_failure_is_not_fatal() {
    let api = Arc::new(
        FakeApi::new()
            .branch(
                "main",
                vec![TreeEntry::blob("good.py", 1), TreeEntry::blob("bad.py", 1)],
            )
            .text("good.py", "x = 1\n")
            .file("bad.py", FakeFile::Status(502)),
    );
    let snapshot = orchestrator(api).start_scan(repo(), &scan_config(2)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.files_scanned, 2);
    assert_eq!(snapshot.issues.failed.len(), 1);
    assert_eq!(snapshot.issues.failed[0].path, "bad.py");
    assert!(snapshot.issues.by_path["bad.py"].is_empty());

    let report = ScanReport::from_snapshot(&snapshot, &Default::default());
    assert_eq!(report.verdict, Verdict::Incomplete);
}

#[tokio::test]
async fn test_binary_and_oversized_files_are_skipped() {
    let api = Arc::new(
        FakeApi::new()
            .branch(
                "main",
                vec![
                    TreeEntry::blob("data.txt", 10),
                    TreeEntry::blob("huge.json", 5 * 1024 * 1024),
                    TreeEntry::blob("ok.py", 1),
                ],
            )
            .file("data.txt", FakeFile::Bytes(vec![0, 159, 146, 150, 0, 0, 1, 2]))
            .text("ok.py", "x = 1\n"),
    );
    let snapshot = orchestrator(api.clone()).start_scan(repo(), &scan_config(2)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.files_scanned, 3);
    assert!(snapshot.issues.failed.is_empty());
    let unreadable: Vec<_> = snapshot.issues.unreadable.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(unreadable, vec!["data.txt", "huge.json"]);
    // The oversized file is never requested
    assert_eq!(api.calls(), 2);

    let report = ScanReport::from_snapshot(&snapshot, &Default::default());
    assert_eq!(report.verdict, Verdict::Clean);
}

#[tokio::test]
async fn test_rate_limit_backs_off_and_recovers() {
    let api = Arc::new(
        FakeApi::new()
            .branch("main", vec![TreeEntry::blob("a.py", 1)])
            .file("a.py", FakeFile::RateLimited(2, "x = eval(y)\n".to_string())),
    );
    let snapshot = orchestrator(api.clone()).start_scan(repo(), &scan_config(1)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.issues.by_path["a.py"].len(), 1);
    assert_eq!(api.calls(), 3);
}

#[tokio::test]
async fn test_persistent_rate_limit_degrades_to_fetch_failure() {
    let api = Arc::new(
        FakeApi::new()
            .branch("main", vec![TreeEntry::blob("a.py", 1)])
            .file("a.py", FakeFile::RateLimited(100, String::new())),
    );
    let config = ScanConfig {
        rate_limit_retries: 2,
        ..scan_config(1)
    };
    let snapshot = orchestrator(api.clone()).start_scan(repo(), &config).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.issues.failed.len(), 1);
    assert_eq!(api.calls(), 3);
}

#[tokio::test]
async fn test_mixed_severity_line() {
    let api = Arc::new(
        FakeApi::new()
            .branch("main", vec![TreeEntry::blob("job.py", 1)])
            .text("job.py", "result = eval(expr)  # TODO sandbox this\n"),
    );
    let snapshot = orchestrator(api).start_scan(repo(), &scan_config(1)).wait().await;

    let issues = &snapshot.issues.by_path["job.py"];
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|issue| issue.line == 1));
    assert_eq!(worst_issue(issues).unwrap().severity, Severity::High);
    assert_eq!(snapshot.issues.totals.high, 1);
    assert_eq!(snapshot.issues.totals.low, 1);
}

#[tokio::test]
async fn test_rescan_is_deterministic_and_reads_are_idempotent() {
    let api = Arc::new(
        FakeApi::new()
            .branch("main", vec![TreeEntry::blob("a.py", 1), TreeEntry::blob("b.py", 1)])
            .text("a.py", LEAKED_KEY_LINE)
            .text("b.py", "password = \"hunter22\"\nDEBUG = True\n"),
    );
    let orchestrator = orchestrator(api);

    let first = orchestrator.start_scan(repo(), &scan_config(2));
    first.wait().await;
    assert_eq!(orchestrator.get_issue_index(&first), orchestrator.get_issue_index(&first));

    let second = orchestrator.start_scan(repo(), &scan_config(2));
    assert_ne!(first.id(), second.id());
    second.wait().await;

    assert_eq!(
        orchestrator.get_issue_index(&first).by_path,
        orchestrator.get_issue_index(&second).by_path
    );
}

#[tokio::test]
async fn test_start_while_active_is_ignored() {
    let api = Arc::new(
        FakeApi::new()
            .latency(Duration::from_millis(30))
            .branch("main", vec![TreeEntry::blob("a.py", 1)])
            .text("a.py", "x = 1\n"),
    );
    let orchestrator = orchestrator(api.clone());

    let first = orchestrator.start_scan(repo(), &scan_config(1));
    let again = orchestrator.start_scan(RepositoryRef::new("other", "repo"), &scan_config(1));
    assert_eq!(first.id(), again.id());
    assert_eq!(orchestrator.current_session(), Some(first.clone()));

    first.wait().await;
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn test_max_files_truncates_with_warning() {
    let mut entries = Vec::new();
    let mut api = FakeApi::new();
    for i in 0..6 {
        let path = format!("f{i}.py");
        entries.push(TreeEntry::blob(&path, 1));
        api = api.text(&path, "x = 1\n");
    }
    let api = Arc::new(api.branch("main", entries));
    let config = ScanConfig {
        max_files_per_scan: 4,
        ..scan_config(2)
    };
    let snapshot = orchestrator(api.clone()).start_scan(repo(), &config).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.files_total, 4);
    assert_eq!(api.calls(), 4);
    assert_eq!(snapshot.warnings.len(), 1);
}

#[tokio::test]
async fn test_rate_limited_tree_is_retried_not_fatal() {
    let api = Arc::new(
        FakeApi::new()
            .branch("main", vec![TreeEntry::blob("a.py", 1)])
            .text("a.py", "x = 1\n")
            .tree_error(ApiError::RateLimited {
                retry_after: Some(Duration::from_millis(5)),
            }),
    );
    let snapshot = orchestrator(api.clone()).start_scan(repo(), &scan_config(1)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.branch.as_deref(), Some("main"));
    assert_eq!(snapshot.files_scanned, 1);
    assert_eq!(api.tree_calls(), 2);
}

#[tokio::test]
async fn test_unauthorized_tree_is_auth_expired() {
    let api = Arc::new(
        FakeApi::new()
            .branch("main", vec![TreeEntry::blob("a.py", 1)])
            .text("a.py", "x = 1\n")
            .tree_error(ApiError::Unauthorized),
    );
    let snapshot = orchestrator(api.clone()).start_scan(repo(), &scan_config(1)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Error);
    assert_eq!(snapshot.error, Some(ScanError::AuthExpired));
    assert_eq!(snapshot.files_total, 0);
    assert!(snapshot.tree.is_empty());
    assert_eq!(api.tree_calls(), 1);
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_unauthorized_default_branch_lookup_is_auth_expired() {
    let mut api = FakeApi::new()
        .branch("main", vec![TreeEntry::blob("a.py", 1)])
        .text("a.py", "x = 1\n");
    api.default_branch_error = Some(ApiError::Unauthorized);
    let api = Arc::new(api);
    let snapshot = orchestrator(api.clone()).start_scan(repo(), &scan_config(1)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Error);
    assert_eq!(snapshot.error, Some(ScanError::AuthExpired));
    assert_eq!(api.tree_calls(), 0);
}

#[tokio::test]
async fn test_truncated_listing_adds_warning() {
    let api = Arc::new(
        FakeApi::new()
            .branch("main", vec![TreeEntry::blob("a.py", 1)])
            .truncated("main")
            .text("a.py", "x = 1\n"),
    );
    let snapshot = orchestrator(api).start_scan(repo(), &scan_config(1)).wait().await;

    assert_eq!(snapshot.status, ScanStatus::Complete);
    assert_eq!(snapshot.warnings.len(), 1);
    assert!(snapshot.warnings[0].contains("truncated"));
}

#[tokio::test]
async fn test_cancel_while_fetching_tree() {
    let api = Arc::new(
        FakeApi::new()
            .tree_latency(Duration::from_millis(60))
            .branch("main", vec![TreeEntry::blob("a.py", 1)])
            .text("a.py", "x = 1\n"),
    );
    let orchestrator = orchestrator(api.clone());
    let handle = orchestrator.start_scan(repo(), &scan_config(1));
    assert_eq!(handle.status(), ScanStatus::FetchingTree);

    orchestrator.cancel_scan(&handle);
    let snapshot = handle.wait().await;
    assert_eq!(snapshot.status, ScanStatus::Cancelled);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let later = handle.snapshot();
    assert_eq!(later.status, ScanStatus::Cancelled);
    assert!(later.tree.is_empty());
    assert_eq!(later.branch, None);
    assert_eq!(later.files_total, 0);
    assert_eq!(api.calls(), 0);
}
