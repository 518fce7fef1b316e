//! Rule data model: categories, severities and compiled rules

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal severity of a rule (and of every issue it produces)
///
/// Ordering is `Low < Medium < High` so `max()` picks the worst one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity '{other}' (expected high, medium or low)")),
        }
    }
}

/// Rule grouping used for reporting and path-based exclusions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Secrets,
    Pii,
    Insecure,
    Review,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Secrets,
        Category::Pii,
        Category::Insecure,
        Category::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Secrets => "secrets",
            Category::Pii => "pii",
            Category::Insecure => "insecure",
            Category::Review => "review",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "secrets" | "secret" => Ok(Category::Secrets),
            "pii" => Ok(Category::Pii),
            "insecure" => Ok(Category::Insecure),
            "review" => Ok(Category::Review),
            other => Err(format!(
                "unknown category '{other}' (expected secrets, pii, insecure or review)"
            )),
        }
    }
}

/// Uncompiled rule definition, as written in config files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub id: String,
    pub pattern: String,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub recommendation: String,
}

/// A compiled detection rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub regex: Regex,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub recommendation: String,
}

impl Rule {
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

/// A single match of one rule inside one line
#[derive(Debug, Clone, Copy)]
pub struct RuleHit<'a> {
    pub rule: &'a Rule,
    pub matched: &'a str,
    /// Byte offset of the match within the line
    pub start: usize,
}

impl RuleHit<'_> {
    pub fn rule_id(&self) -> &str {
        &self.rule.id
    }
}
