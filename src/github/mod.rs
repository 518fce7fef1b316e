//! Remote repository access
//!
//! [`RepoApi`] is the only seam to the network. [`GitHubClient`] implements it
//! over the GitHub REST API; tests substitute in-memory fakes.

pub mod api;
pub mod client;
pub mod error;
pub mod fetcher;

pub use api::{
    ContentResponse, EntryKind, RepoApi, RepositoryRef, TreeEntry, TreeListing,
};
pub use client::{DEFAULT_API_URL, GitHubClient};
pub use error::ApiError;
pub use fetcher::{
    ContentFetcher, FetchedContent, MAX_INLINE_CONTENT_BYTES, RetryPolicy, UnreadableReason,
    decode_content,
};
