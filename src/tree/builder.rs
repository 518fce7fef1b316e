//! Flat path listing -> nested tree, with branch fallback

use super::node::{NodeKind, TreeNode};
use crate::error::{ScanError, ScanResult};
use crate::github::{ApiError, EntryKind, RepoApi, RepositoryRef, RetryPolicy, TreeEntry, TreeListing};
use std::collections::BTreeMap;
use std::future::Future;

/// Intermediate directory while building; `BTreeMap` keeps names sorted
#[derive(Default)]
struct DirBuilder {
    sha: Option<String>,
    dirs: BTreeMap<String, DirBuilder>,
    files: BTreeMap<String, FileLeaf>,
}

struct FileLeaf {
    size: Option<u64>,
    sha: Option<String>,
}

impl DirBuilder {
    fn dir_mut(&mut self, name: &str) -> &mut DirBuilder {
        // A directory always wins over a file of the same name
        self.files.remove(name);
        self.dirs.entry(name.to_string()).or_default()
    }

    fn into_nodes(self, prefix: &str) -> Vec<TreeNode> {
        let mut nodes = Vec::with_capacity(self.dirs.len() + self.files.len());

        for (name, dir) in self.dirs {
            let path = join_path(prefix, &name);
            let sha = dir.sha.clone();
            let children = dir.into_nodes(&path);
            nodes.push(TreeNode {
                path,
                name,
                kind: NodeKind::Directory,
                size: None,
                sha,
                children,
            });
        }

        for (name, leaf) in self.files {
            nodes.push(TreeNode {
                path: join_path(prefix, &name),
                name,
                kind: NodeKind::File,
                size: leaf.size,
                sha: leaf.sha,
                children: Vec::new(),
            });
        }

        nodes
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Build the nested forest from a flat listing
///
/// Intermediate segments are always directories; the last segment takes its
/// kind from the entry. Entries that are neither blobs nor trees are dropped.
pub fn build_tree(entries: &[TreeEntry]) -> Vec<TreeNode> {
    let mut root = DirBuilder::default();

    for entry in entries {
        if entry.kind == EntryKind::Other {
            continue;
        }
        let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };

        let mut current = &mut root;
        for segment in parents {
            current = current.dir_mut(segment);
        }

        match entry.kind {
            EntryKind::Tree => {
                let dir = current.dir_mut(last);
                if dir.sha.is_none() {
                    dir.sha = entry.sha.clone();
                }
            }
            EntryKind::Blob => {
                if !current.dirs.contains_key(*last) {
                    current.files.insert(
                        last.to_string(),
                        FileLeaf {
                            size: entry.size,
                            sha: entry.sha.clone(),
                        },
                    );
                }
            }
            EntryKind::Other => {}
        }
    }

    root.into_nodes("")
}

/// How the branch to scan is chosen when the repository names none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPolicy {
    /// Tried in order after the remote default branch
    pub fallback: Vec<String>,
    /// Ask the remote for its default branch first
    pub resolve_default: bool,
}

impl Default for BranchPolicy {
    fn default() -> Self {
        Self {
            fallback: vec!["main".to_string(), "master".to_string()],
            resolve_default: true,
        }
    }
}

/// Run one remote call, sleeping through rate limiting up to `retry.max_retries` times
async fn with_rate_limit_retry<T, F, Fut>(retry: &RetryPolicy, what: &str, mut call: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;
    loop {
        match call().await {
            Err(ApiError::RateLimited { retry_after }) if attempt < retry.max_retries => {
                attempt += 1;
                let delay = retry.delay(attempt, retry_after);
                tracing::warn!("Rate limited on {} (attempt {}), backing off {:?}", what, attempt, delay);
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

/// Ordered, de-duplicated branch names to try for `repo`
///
/// Explicit candidates on the repository win. Otherwise the remote default
/// branch (when asked for) comes first, then the policy's fallbacks. A failed
/// default-branch lookup is not fatal unless the remote rejects the token.
pub async fn branch_candidates(
    api: &dyn RepoApi,
    repo: &RepositoryRef,
    policy: &BranchPolicy,
    retry: &RetryPolicy,
) -> ScanResult<Vec<String>> {
    if !repo.branch_candidates.is_empty() {
        return Ok(repo.branch_candidates.clone());
    }

    let mut branches = Vec::new();
    if policy.resolve_default {
        let lookup = with_rate_limit_retry(retry, "default branch lookup", || api.default_branch(repo)).await;
        match lookup {
            Ok(Some(branch)) => branches.push(branch),
            Ok(None) => {}
            Err(ApiError::Unauthorized) => return Err(ScanError::AuthExpired),
            Err(err) => {
                tracing::debug!("Default branch lookup for {} failed: {}", repo.full_name(), err);
            }
        }
    }
    for branch in &policy.fallback {
        if !branches.contains(branch) {
            branches.push(branch.clone());
        }
    }
    Ok(branches)
}

/// A tree listing resolved against one branch candidate
#[derive(Debug, Clone)]
pub struct ResolvedTree {
    pub branch: String,
    pub listing: TreeListing,
}

/// Try each branch candidate in order until one yields a tree
///
/// 401 aborts immediately with [`ScanError::AuthExpired`]. Rate limiting backs
/// off and retries the same branch. Any other failure moves on to the next
/// candidate; when none is left the result is [`ScanError::TreeUnavailable`].
pub async fn resolve_tree(
    api: &dyn RepoApi,
    repo: &RepositoryRef,
    branches: &[String],
    retry: &RetryPolicy,
) -> ScanResult<ResolvedTree> {
    let mut tried = Vec::with_capacity(branches.len());

    for branch in branches {
        tried.push(branch.clone());
        let listing = with_rate_limit_retry(retry, "tree listing", || api.tree(repo, branch)).await;
        match listing {
            Ok(listing) => {
                tracing::debug!(
                    "Resolved {} at branch '{}' ({} entries)",
                    repo.full_name(),
                    branch,
                    listing.tree.len()
                );
                return Ok(ResolvedTree {
                    branch: branch.clone(),
                    listing,
                });
            }
            Err(ApiError::Unauthorized) => return Err(ScanError::AuthExpired),
            Err(ApiError::NotFound(_)) => {
                tracing::debug!("Branch '{}' not found for {}", branch, repo.full_name());
            }
            Err(err) => {
                tracing::warn!(
                    "Tree request for {}@{} failed: {}",
                    repo.full_name(),
                    branch,
                    err
                );
            }
        }
    }

    Err(ScanError::TreeUnavailable {
        repository: repo.full_name(),
        tried,
    })
}

/// Resolve the branch list for `repo` and fetch the first tree that exists
pub async fn fetch_repository_tree(
    api: &dyn RepoApi,
    repo: &RepositoryRef,
    policy: &BranchPolicy,
    retry: &RetryPolicy,
) -> ScanResult<ResolvedTree> {
    let branches = branch_candidates(api, repo, policy, retry).await?;
    resolve_tree(api, repo, &branches, retry).await
}
