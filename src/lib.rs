//! # repoguard - static security scanning for remote GitHub repositories
//!
//! repoguard lists a repository's tree through the GitHub REST API, picks
//! text files by extension, fetches them with bounded concurrency and runs a
//! regex rule set over every line. Nothing is cloned or executed.
//!
//! ## Features
//!
//! - **Rules**: secrets, PII, insecure code and review markers, each with a
//!   severity; secret-store files such as `.env` are exempt from secret rules
//! - **Sessions**: an explicit state machine from tree fetch to completion,
//!   with progress streaming, partial results and cancellation
//! - **Polite fetching**: a concurrency cap, batch pauses and shared
//!   rate-limit backoff
//! - **Reports**: text or JSON, with a verdict that never confuses an
//!   incomplete scan with a clean one
//!
//! ## Quick Start
//!
//! ```bash
//! repoguard scan octo-org/demo
//! GITHUB_TOKEN=... repoguard scan https://github.com/octo-org/private --format json
//! ```
//!
//! ```rust,no_run
//! use repoguard::config::ScanConfig;
//! use repoguard::github::{GitHubClient, RepositoryRef, DEFAULT_API_URL};
//! use repoguard::rules::RuleSet;
//! use repoguard::session::ScanOrchestrator;
//! use std::sync::Arc;
//!
//! # async fn demo() -> repoguard::Result<()> {
//! let client = GitHubClient::new(DEFAULT_API_URL, "repoguard")?;
//! let orchestrator = ScanOrchestrator::new(Arc::new(client), Arc::new(RuleSet::builtin()?));
//! let handle = orchestrator.start_scan(RepositoryRef::new("octo-org", "demo"), &ScanConfig::default());
//! let snapshot = handle.wait().await;
//! println!("{} high-severity issues", snapshot.issues.totals.high);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod parallel;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod session;
pub mod tree;

pub use cli::{Cli, Output};
pub use config::RepoguardConfig;
pub use error::{ScanError, ScanResult};

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
