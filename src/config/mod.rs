//! Configuration management for repoguard
//!
//! Settings are layered with `figment` (see [`core`]) and extracted into the
//! typed [`RepoguardConfig`]. Every section has serde defaults, so partial
//! files only need the keys they change.

pub mod core;

use crate::github::DEFAULT_API_URL;
use crate::github::RetryPolicy;
use crate::parallel::SchedulerConfig;
use crate::report::ScoreWeights;
use crate::rules::{ExclusionSpec, RuleSet, RuleSpec, builtin_rule_specs};
use crate::scanner::MatchLimits;
use crate::tree::{BranchPolicy, CandidateFilter, DEFAULT_EXTENSION_ALLOWLIST};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Upper bound on concurrent content requests
pub const MAX_CONCURRENCY_LIMIT: usize = 32;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoguardConfig {
    pub github: GithubConfig,
    pub scan: ScanConfig,
    pub rules: RulesConfig,
    pub report: ReportConfig,
}

/// Remote service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub user_agent: String,
    /// Bearer token; unauthenticated calls work for public repositories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Branch names tried in order when the repository names none
    pub branch_candidates: Vec<String>,
    /// Ask the remote for its default branch before the candidates
    pub resolve_default_branch: bool,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: format!("{}/{}", crate::PKG_NAME, crate::VERSION),
            token: None,
            branch_candidates: vec!["main".to_string(), "master".to_string()],
            resolve_default_branch: true,
        }
    }
}

impl GithubConfig {
    pub fn branch_policy(&self) -> BranchPolicy {
        BranchPolicy {
            fallback: self
                .branch_candidates
                .iter()
                .map(|branch| branch.trim().to_string())
                .filter(|branch| !branch.is_empty())
                .collect(),
            resolve_default: self.resolve_default_branch,
        }
    }
}

/// Per-session scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum content requests in flight
    pub max_concurrency: usize,
    /// Candidates beyond this count are dropped with a warning
    pub max_files_per_scan: usize,
    pub file_extension_allowlist: Vec<String>,
    /// Pause after every N dispatched requests
    pub batch_size: usize,
    pub batch_pause_ms: u64,
    pub rate_limit_retries: u32,
    pub rate_limit_backoff_ms: u64,
    pub max_match_len: usize,
    pub max_snippet_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            max_files_per_scan: 500,
            file_extension_allowlist: DEFAULT_EXTENSION_ALLOWLIST
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            batch_size: 20,
            batch_pause_ms: 250,
            rate_limit_retries: 3,
            rate_limit_backoff_ms: 1000,
            max_match_len: 80,
            max_snippet_len: 160,
        }
    }
}

impl ScanConfig {
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            max_concurrency: self.max_concurrency.clamp(1, MAX_CONCURRENCY_LIMIT),
            batch_size: self.batch_size,
            batch_pause: Duration::from_millis(self.batch_pause_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.rate_limit_retries,
            base_backoff: Duration::from_millis(self.rate_limit_backoff_ms),
            ..RetryPolicy::default()
        }
    }

    pub fn match_limits(&self) -> MatchLimits {
        MatchLimits {
            max_match_len: self.max_match_len,
            max_snippet_len: self.max_snippet_len,
        }
    }

    pub fn candidate_filter(&self) -> CandidateFilter {
        CandidateFilter::new(&self.file_extension_allowlist)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            anyhow::bail!(
                "scan.max_concurrency must be between 1 and {MAX_CONCURRENCY_LIMIT} (got {})",
                self.max_concurrency
            );
        }
        if self.batch_size == 0 {
            anyhow::bail!("scan.batch_size cannot be 0");
        }
        if self.max_files_per_scan == 0 {
            anyhow::bail!("scan.max_files_per_scan cannot be 0");
        }
        if self.candidate_filter().is_empty() {
            anyhow::bail!("scan.file_extension_allowlist cannot be empty");
        }
        Ok(())
    }
}

/// Rule selection and exclusions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub exclusions: Vec<ExclusionSpec>,
    /// Additional rules, evaluated after the built-in ones
    pub custom: Vec<RuleSpec>,
    /// Rule ids to drop, built-in or custom
    pub disabled: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            exclusions: vec![ExclusionSpec::secret_stores()],
            custom: Vec::new(),
            disabled: Vec::new(),
        }
    }
}

impl RulesConfig {
    /// Compile the active rule set
    pub fn build_rule_set(&self) -> Result<RuleSet> {
        let disabled: HashSet<&str> = self.disabled.iter().map(String::as_str).collect();
        let specs: Vec<RuleSpec> = builtin_rule_specs()
            .into_iter()
            .chain(self.custom.iter().cloned())
            .filter(|spec| !disabled.contains(spec.id.as_str()))
            .collect();
        let rules = RuleSet::new(specs, self.exclusions.clone()).context("Invalid rule configuration")?;
        tracing::debug!("Compiled {} rules", rules.len());
        Ok(rules)
    }
}

/// Report settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub score_weights: ScoreWeights,
    pub score_cap: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            score_weights: ScoreWeights::default(),
            score_cap: 100,
        }
    }
}

impl RepoguardConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;

        if self.github.branch_candidates.iter().all(|b| b.trim().is_empty()) {
            anyhow::bail!("github.branch_candidates must name at least one branch");
        }
        if self.github.api_url.trim().is_empty() {
            anyhow::bail!("github.api_url cannot be empty");
        }
        if self.report.score_cap == 0 {
            anyhow::bail!("report.score_cap cannot be 0");
        }

        self.rules.build_rule_set()?;
        Ok(())
    }

    /// Copy safe to print: the token is masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.github.token.is_some() {
            copy.github.token = Some("********".to_string());
        }
        copy
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.redacted()).context("Failed to serialize configuration")
    }
}
