//! Repository tree construction and candidate selection
//!
//! A flat listing from the remote tree endpoint becomes a nested forest of
//! [`TreeNode`]s (directories first, then names, at every level). Candidate
//! files are picked from that forest by extension before any content request.

pub mod builder;
pub mod candidates;
pub mod node;

pub use builder::{
    BranchPolicy, ResolvedTree, branch_candidates, build_tree, fetch_repository_tree, resolve_tree,
};
pub use candidates::{
    BINARY_EXTENSIONS, CandidateFile, CandidateFilter, DEFAULT_EXTENSION_ALLOWLIST,
    collect_candidates, extension_key,
};
pub use node::{NodeKind, TreeNode, count_files, find_node, format_size, walk_forest};
