//! Per-line rule evaluation

use super::types::{FileScanResult, Issue, MatchLimits};
use crate::rules::{RuleHit, RuleSet};

/// Runs a [`RuleSet`] over file text line by line
///
/// Matching is synchronous and deterministic: the same text and path always
/// produce the same issues in the same order.
#[derive(Debug, Clone)]
pub struct LineMatcher<'r> {
    rules: &'r RuleSet,
    limits: MatchLimits,
}

impl<'r> LineMatcher<'r> {
    pub fn new(rules: &'r RuleSet, limits: MatchLimits) -> Self {
        Self { rules, limits }
    }

    /// All issues in `text`, ordered by line then rule order
    pub fn scan_text(&self, path: &str, text: &str) -> Vec<Issue> {
        let rules = self.rules.for_path(path);
        if rules.is_empty() {
            return Vec::new();
        }

        let mut issues = Vec::new();
        for (index, line) in text.lines().enumerate() {
            for hit in rules.evaluate_line(line) {
                issues.push(self.issue(index + 1, line, &hit));
            }
        }
        tracing::trace!("{}: {} issues", path, issues.len());
        issues
    }

    pub fn scan_file(&self, path: &str, text: &str) -> FileScanResult {
        FileScanResult::scanned(path, self.scan_text(path, text))
    }

    fn issue(&self, line_number: usize, line: &str, hit: &RuleHit<'_>) -> Issue {
        Issue {
            rule_id: hit.rule.id.clone(),
            line: line_number,
            column: hit.start + 1,
            severity: hit.rule.severity,
            category: hit.rule.category,
            message: hit.rule.message.clone(),
            recommendation: hit.rule.recommendation.clone(),
            matched_text: truncate_chars(hit.matched, self.limits.max_match_len),
            context_snippet: context_snippet(line, hit.start, self.limits.max_snippet_len),
        }
    }
}

/// Truncate to at most `max` characters, marking the cut with `…`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// Window of `line` around the byte offset `start`, at most `max` characters
pub fn context_snippet(line: &str, start: usize, max: usize) -> String {
    let line = line.trim_end();
    if line.chars().count() <= max {
        return line.trim_start().to_string();
    }

    let match_char = line.get(..start).map_or(0, |head| head.chars().count());
    let skip = match_char.saturating_sub(max / 4);
    let mut window: String = line.chars().skip(skip).take(max).collect();
    let has_more = line.chars().count() > skip + max;

    if has_more {
        window.push('…');
    }
    if skip > 0 {
        window.insert(0, '…');
        window
    } else {
        window.trim_start().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Category, Severity};

    fn rules() -> RuleSet {
        RuleSet::builtin().unwrap()
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let rules = rules();
        let matcher = LineMatcher::new(&rules, MatchLimits::default());
        let issues = matcher.scan_text("app.py", "import os\n\nresult = eval(data)\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 3);
        assert_eq!(issues[0].category, Category::Insecure);
        assert_eq!(issues[0].column, 10);
    }

    #[test]
    fn test_crlf_line_endings() {
        let rules = rules();
        let matcher = LineMatcher::new(&rules, MatchLimits::default());
        let issues = matcher.scan_text("a.js", "ok\r\n// TODO tidy\r\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 2);
        assert!(!issues[0].context_snippet.ends_with('\r'));
    }

    #[test]
    fn test_scenario_secret_in_source() {
        let rules = rules();
        let matcher = LineMatcher::new(&rules, MatchLimits::default());
        let result = matcher.scan_file("app.py", "API_KEY = \"sk-abcdEFGH1234567890abcd\"\n");
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!((issue.line, issue.severity, issue.category), (1, Severity::High, Category::Secrets));
        assert_eq!(issue.matched_text, "sk-abcdEFGH1234567890abcd");
    }

    #[test]
    fn test_env_file_skips_secrets() {
        let rules = rules();
        let matcher = LineMatcher::new(&rules, MatchLimits::default());
        let issues = matcher.scan_text(".env", "API_KEY = \"sk-abcdEFGH1234567890abcd\"\n");
        assert!(issues.iter().all(|i| i.category != Category::Secrets));
    }

    #[test]
    fn test_deterministic() {
        let rules = rules();
        let matcher = LineMatcher::new(&rules, MatchLimits::default());
        let text = "password = \"hunter22\"\nx = eval(y)  # TODO\n";
        assert_eq!(matcher.scan_text("cfg.py", text), matcher.scan_text("cfg.py", text));
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé…");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }

    #[test]
    fn test_context_snippet_windows_long_lines() {
        let line = format!("{}eval(x){}", "a".repeat(200), "b".repeat(200));
        let snippet = context_snippet(&line, 200, 40);
        assert!(snippet.starts_with('…'));
        assert!(snippet.ends_with('…'));
        assert!(snippet.contains("eval(x)"));
        assert_eq!(context_snippet("   short line  ", 3, 40), "short line");
    }
}
