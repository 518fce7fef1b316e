//! `repoguard rules`

use crate::cli::Output;
use crate::config::RepoguardConfig;
use crate::rules::Category;
use anyhow::Result;
use console::style;

pub fn execute(category: Option<Category>, config: &RepoguardConfig, output: &Output) -> Result<u8> {
    let rules = config.rules.build_rule_set()?;

    let mut shown = 0;
    for rule in rules.rules().iter().filter(|r| category.is_none_or(|c| r.category == c)) {
        println!(
            "{:<36} {:<9} {:<7} {}",
            style(&rule.id).magenta(),
            rule.category.as_str(),
            rule.severity.as_str(),
            rule.message
        );
        shown += 1;
    }

    for exclusion in &config.rules.exclusions {
        output.verbose(&format!(
            "{} rules skipped for: {}",
            exclusion.category,
            exclusion.paths.join(", ")
        ));
    }
    output.info(&format!("{shown} rules"));
    Ok(0)
}
