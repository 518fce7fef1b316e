//! Error taxonomy for scan sessions
//!
//! Only [`ScanError::TreeUnavailable`] and [`ScanError::AuthExpired`] abort a
//! session. Everything else is recorded next to the results and the scan
//! carries on. Unreadable (binary) content is not an error at all; see
//! [`crate::github::FetchedContent::Unreadable`].

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the scan engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    /// No branch candidate resolved to a repository tree
    #[error("repository tree unavailable for {repository} (tried: {})", .tried.join(", "))]
    TreeUnavailable {
        repository: String,
        tried: Vec<String>,
    },

    /// The remote rejected our credentials
    #[error("authorization rejected by remote API; re-authenticate and retry")]
    AuthExpired,

    /// A single file could not be retrieved
    #[error("failed to fetch {path}: {reason}")]
    FetchFailed { path: String, reason: String },

    /// The remote asked us to slow down
    #[error("rate limited by remote API (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// A rule pattern failed to compile
    #[error("invalid rule '{id}': {reason}")]
    InvalidRule { id: String, reason: String },

    /// Two rules share an id
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),

    /// Invalid scan configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScanError {
    /// Whether this error ends the whole session
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::TreeUnavailable { .. } | ScanError::AuthExpired
        )
    }

    /// Short machine-friendly label used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::TreeUnavailable { .. } => "tree_unavailable",
            ScanError::AuthExpired => "auth_expired",
            ScanError::FetchFailed { .. } => "fetch_failed",
            ScanError::RateLimited { .. } => "rate_limited",
            ScanError::InvalidRule { .. } => "invalid_rule",
            ScanError::DuplicateRule(_) => "duplicate_rule",
            ScanError::Config(_) => "config",
        }
    }
}

/// Result alias for scan engine operations
pub type ScanResult<T> = std::result::Result<T, ScanError>;
