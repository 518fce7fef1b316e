//! Immutable, ordered rule collection with category exclusions

use super::builtin::{builtin_rule_specs, default_secret_store_globs};
use super::types::{Category, Rule, RuleHit, RuleSpec};
use crate::error::{ScanError, ScanResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Paths whose files skip every rule of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSpec {
    pub category: Category,
    pub paths: Vec<String>,
}

impl ExclusionSpec {
    /// Environment/secret-storage files are exempt from `secrets` rules
    pub fn secret_stores() -> Self {
        Self {
            category: Category::Secrets,
            paths: default_secret_store_globs(),
        }
    }
}

#[derive(Debug, Clone)]
struct CategoryExclusion {
    category: Category,
    globs: GlobSet,
}

impl CategoryExclusion {
    /// Globs are tried against both the full path and the bare file name,
    /// so `.env` matches `config/.env` as well as `.env`.
    fn matches(&self, path: &str) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        self.globs.is_match(path) || self.globs.is_match(file_name)
    }
}

/// Ordered rule collection
///
/// Built once at startup and shared read-only (`Arc<RuleSet>`) by every scan.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    exclusions: Vec<CategoryExclusion>,
}

impl RuleSet {
    /// Compile rule definitions and exclusion globs
    pub fn new(specs: Vec<RuleSpec>, exclusions: Vec<ExclusionSpec>) -> ScanResult<Self> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert(spec.id.clone()) {
                return Err(ScanError::DuplicateRule(spec.id));
            }
            let regex = Regex::new(&spec.pattern).map_err(|e| ScanError::InvalidRule {
                id: spec.id.clone(),
                reason: e.to_string(),
            })?;
            rules.push(Rule {
                id: spec.id,
                regex,
                category: spec.category,
                severity: spec.severity,
                message: spec.message,
                recommendation: spec.recommendation,
            });
        }

        let exclusions = exclusions
            .into_iter()
            .map(compile_exclusion)
            .collect::<ScanResult<Vec<_>>>()?;

        Ok(Self { rules, exclusions })
    }

    /// Built-in rules with the default secret-store exclusion
    pub fn builtin() -> ScanResult<Self> {
        Self::new(builtin_rule_specs(), vec![ExclusionSpec::secret_stores()])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Categories whose rules are skipped for this path
    pub fn excluded_categories(&self, path: &str) -> Vec<Category> {
        let mut excluded: Vec<Category> = self
            .exclusions
            .iter()
            .filter(|exclusion| exclusion.matches(path))
            .map(|exclusion| exclusion.category)
            .collect();
        excluded.sort();
        excluded.dedup();
        excluded
    }

    /// Rules that apply to one file, resolved once per file
    pub fn for_path(&self, path: &str) -> PathRules<'_> {
        let excluded = self.excluded_categories(path);
        let rules = self
            .rules
            .iter()
            .filter(|rule| !excluded.contains(&rule.category))
            .collect();
        PathRules { rules }
    }

    /// Evaluate one line of a file at `path`
    ///
    /// Returns every non-overlapping match of every applicable rule, in rule
    /// order and then left to right.
    pub fn evaluate_line<'a>(&'a self, line: &'a str, path: &str) -> Vec<RuleHit<'a>> {
        self.for_path(path).evaluate_line(line)
    }
}

/// The subset of a [`RuleSet`] active for one path
#[derive(Debug, Clone)]
pub struct PathRules<'a> {
    rules: Vec<&'a Rule>,
}

impl<'a> PathRules<'a> {
    pub fn evaluate_line<'l>(&self, line: &'l str) -> Vec<RuleHit<'l>>
    where
        'a: 'l,
    {
        let mut hits = Vec::new();
        for &rule in &self.rules {
            for found in rule.regex.find_iter(line) {
                hits.push(RuleHit {
                    rule,
                    matched: found.as_str(),
                    start: found.start(),
                });
            }
        }
        hits
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile_exclusion(spec: ExclusionSpec) -> ScanResult<CategoryExclusion> {
    let mut builder = GlobSetBuilder::new();
    for pattern in &spec.paths {
        let glob = Glob::new(pattern).map_err(|e| {
            ScanError::Config(format!("invalid exclusion glob '{pattern}': {e}"))
        })?;
        builder.add(glob);
    }
    let globs = builder
        .build()
        .map_err(|e| ScanError::Config(format!("invalid exclusion globs: {e}")))?;
    Ok(CategoryExclusion {
        category: spec.category,
        globs,
    })
}
