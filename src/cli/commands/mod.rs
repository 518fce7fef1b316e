pub mod config;
pub mod rules;
pub mod scan;
pub mod tree;

use crate::cli::RemoteArgs;
use crate::config::RepoguardConfig;
use crate::github::{GitHubClient, RepositoryRef};
use anyhow::{Context, Result};

/// Repository reference from positional and flag arguments
///
/// A token on the command line (or `GITHUB_TOKEN`) wins over the configured one.
pub(crate) fn repository_ref(args: &RemoteArgs, config: &RepoguardConfig) -> Result<RepositoryRef> {
    let repository = RepositoryRef::parse(&args.repository).with_context(|| {
        format!(
            "Invalid repository '{}'; expected owner/name or a GitHub URL",
            args.repository
        )
    })?;
    let token = args.token.clone().or_else(|| config.github.token.clone());
    Ok(repository.with_branches(args.branches.clone()).with_token(token))
}

pub(crate) fn github_client(config: &RepoguardConfig) -> Result<GitHubClient> {
    GitHubClient::new(&config.github.api_url, &config.github.user_agent)
        .context("Failed to create GitHub client")
}
