//! `repoguard tree`

use super::{github_client, repository_ref};
use crate::cli::{Output, OutputFormat, TreeArgs};
use crate::config::RepoguardConfig;
use crate::tree::{CandidateFilter, TreeNode, build_tree, count_files, fetch_repository_tree, format_size};
use anyhow::{Context, Result};
use console::style;
use std::fmt::Write;

pub async fn execute(args: TreeArgs, config: RepoguardConfig, output: &Output) -> Result<u8> {
    let repository = repository_ref(&args.remote, &config)?;
    let client = github_client(&config)?;

    let retry = config.scan.retry_policy();
    let resolved = fetch_repository_tree(&client, &repository, &config.github.branch_policy(), &retry)
        .await
        .with_context(|| format!("Could not load the tree of {}", repository.full_name()))?;
    let tree = build_tree(&resolved.listing.tree);

    if resolved.listing.truncated {
        output.warning("The remote truncated this tree listing");
    }

    match args.format {
        OutputFormat::Json => {
            output.print(&serde_json::to_string_pretty(&tree).context("Failed to render tree")?);
        }
        OutputFormat::Text => {
            let filter = config.scan.candidate_filter();
            output.header(&format!("{}@{}", repository.full_name(), resolved.branch));
            output.print(&render_tree(&tree, &filter));
            output.info(&format!(
                "{} files, {} scan candidates",
                count_files(&tree),
                crate::tree::collect_candidates(&tree, &filter).len()
            ));
        }
    }
    Ok(0)
}

/// Indented listing; scan candidates are marked with `*`
pub fn render_tree(nodes: &[TreeNode], filter: &CandidateFilter) -> String {
    let mut out = String::new();
    render_level(&mut out, nodes, 0, filter);
    out
}

fn render_level(out: &mut String, nodes: &[TreeNode], depth: usize, filter: &CandidateFilter) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        if node.is_dir() {
            let _ = writeln!(out, "{indent}{}/", style(&node.name).blue().bold());
            render_level(out, &node.children, depth + 1, filter);
        } else {
            let marker = if filter.is_candidate(&node.name) {
                style("*").green().to_string()
            } else {
                " ".to_string()
            };
            let size = node.size.map(format_size).unwrap_or_default();
            let _ = writeln!(out, "{indent}{marker} {} {}", node.name, style(size).dim());
        }
    }
}
