//! Remote API seam and wire types

use super::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Repository to scan
///
/// Immutable once a scan starts; the orchestrator shares it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
    /// Branch names tried in order when resolving the tree
    #[serde(default)]
    pub branch_candidates: Vec<String>,
    /// Bearer token; `None` means unauthenticated (public repos only)
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch_candidates: Vec::new(),
            auth_token: None,
        }
    }

    /// Parse `owner/name`, also accepting a full `https://github.com/owner/name` URL
    pub fn parse(spec: &str) -> Option<Self> {
        let trimmed = spec
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("github.com/")
            .trim_end_matches('/')
            .trim_end_matches(".git");
        let mut parts = trimmed.split('/');
        let owner = parts.next().filter(|s| !s.is_empty())?;
        let name = parts.next().filter(|s| !s.is_empty())?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(owner, name))
    }

    pub fn with_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branch_candidates = branches.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Kind of an entry in the recursive tree listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodules (`commit`) and anything else we do not scan
    #[serde(other)]
    Other,
}

/// One entry of `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
            sha: None,
            size: Some(size),
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
            sha: None,
            size: None,
        }
    }
}

/// Full tree listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeListing {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    /// Set by the remote when the listing was cut short
    #[serde(default)]
    pub truncated: bool,
}

/// Body of `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Capabilities the scan engine needs from the remote service
#[async_trait]
pub trait RepoApi: Send + Sync {
    /// The repository's configured default branch, if the remote reports one
    async fn default_branch(&self, repo: &RepositoryRef) -> Result<Option<String>, ApiError>;

    /// Recursive tree listing for one branch
    async fn tree(&self, repo: &RepositoryRef, branch: &str) -> Result<TreeListing, ApiError>;

    /// Content of one file at `git_ref`
    async fn content(
        &self,
        repo: &RepositoryRef,
        git_ref: &str,
        path: &str,
    ) -> Result<ContentResponse, ApiError>;
}
