//! Content retrieval with base64 decoding and rate-limit backoff

use super::api::{ContentResponse, RepoApi, RepositoryRef};
use super::error::ApiError;
use crate::error::{ScanError, ScanResult};
use crate::parallel::Pacer;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Largest blob the contents endpoint inlines
pub const MAX_INLINE_CONTENT_BYTES: u64 = 1024 * 1024;

/// Why a file's content cannot be scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadableReason {
    /// Decoded bytes look binary
    Binary,
    /// Base64 or UTF-8 decoding failed
    Undecodable,
    /// The remote did not inline the content
    NotInlined,
}

impl fmt::Display for UnreadableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnreadableReason::Binary => "binary content",
            UnreadableReason::Undecodable => "content could not be decoded as text",
            UnreadableReason::NotInlined => "content not provided by remote",
        })
    }
}

/// Result of fetching one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedContent {
    Text(String),
    /// Expected outcome for non-text content; skipped, never a failure
    Unreadable(UnreadableReason),
}

/// How hard to push through rate limiting before giving up on a file
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based), honoring a server hint
    pub fn delay(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let computed = hint.unwrap_or_else(|| {
            self.base_backoff
                .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        });
        computed.min(self.max_backoff)
    }
}

/// Fetches file text through a [`RepoApi`]
#[derive(Clone)]
pub struct ContentFetcher {
    api: Arc<dyn RepoApi>,
    pacer: Arc<Pacer>,
    retry: RetryPolicy,
}

impl ContentFetcher {
    pub fn new(api: Arc<dyn RepoApi>, pacer: Arc<Pacer>, retry: RetryPolicy) -> Self {
        Self { api, pacer, retry }
    }

    /// Fetch one file
    ///
    /// 401 becomes [`ScanError::AuthExpired`]; rate limiting backs off the
    /// shared pacer and retries; anything else becomes
    /// [`ScanError::FetchFailed`] for this path only.
    pub async fn fetch(
        &self,
        repo: &RepositoryRef,
        git_ref: &str,
        path: &str,
    ) -> ScanResult<FetchedContent> {
        let mut attempt = 0u32;
        loop {
            match self.api.content(repo, git_ref, path).await {
                Ok(response) => return Ok(decode_content(&response)),
                Err(ApiError::Unauthorized) => return Err(ScanError::AuthExpired),
                Err(ApiError::RateLimited { retry_after }) => {
                    attempt += 1;
                    if attempt > self.retry.max_retries {
                        return Err(ScanError::FetchFailed {
                            path: path.to_string(),
                            reason: format!("still rate limited after {} retries", self.retry.max_retries),
                        });
                    }
                    let delay = self.retry.delay(attempt, retry_after);
                    tracing::warn!(
                        "Rate limited fetching {} (attempt {}), backing off {:?}",
                        path,
                        attempt,
                        delay
                    );
                    self.pacer.back_off(delay);
                    self.pacer.wait().await;
                }
                Err(err) => {
                    return Err(ScanError::FetchFailed {
                        path: path.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }
}

/// Decode a contents response into text, or classify it as unreadable
pub fn decode_content(response: &ContentResponse) -> FetchedContent {
    let Some(encoded) = response.content.as_deref() else {
        return FetchedContent::Unreadable(UnreadableReason::NotInlined);
    };
    if response.encoding.as_deref().is_some_and(|e| e != "base64") {
        return FetchedContent::Unreadable(UnreadableReason::NotInlined);
    }

    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = match STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => bytes,
        Err(_) => return FetchedContent::Unreadable(UnreadableReason::Undecodable),
    };

    if content_inspector::inspect(&bytes).is_binary() {
        return FetchedContent::Unreadable(UnreadableReason::Binary);
    }

    match String::from_utf8(bytes) {
        Ok(text) => FetchedContent::Text(text),
        Err(_) => FetchedContent::Unreadable(UnreadableReason::Undecodable),
    }
}
