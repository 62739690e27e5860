//! Regex-driven risk and style patterns.

use lazy_static::lazy_static;
use regex::Regex;

use super::source::{is_inside_string_literal, SourceLine};
use super::{CodeIssue, IssueCategory, Severity};

/// A per-line pattern and the issue it produces.
pub struct PatternRule {
    pub regex: Regex,
    pub category: IssueCategory,
    pub severity: Severity,
    pub message: &'static str,
    pub explanation: &'static str,
    pub suggestion: &'static str,
    pub tag: &'static str,
    /// Report matches that start inside a string literal too.
    pub in_strings: bool,
}

impl PatternRule {
    pub fn new(
        pattern: &str,
        category: IssueCategory,
        severity: Severity,
        message: &'static str,
    ) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            category,
            severity,
            message,
            explanation: "",
            suggestion: "",
            tag: "",
            in_strings: false,
        }
    }

    pub fn explain(mut self, text: &'static str) -> Self {
        self.explanation = text;
        self
    }

    pub fn suggest(mut self, text: &'static str) -> Self {
        self.suggestion = text;
        self
    }

    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }

    pub fn in_strings(mut self) -> Self {
        self.in_strings = true;
        self
    }

    fn first_match(&self, text: &str) -> Option<usize> {
        self.regex
            .find_iter(text)
            .map(|m| m.start())
            .find(|&start| self.in_strings || !is_inside_string_literal(text, start))
    }

    fn to_issue(&self, line: &SourceLine<'_>, start: usize) -> CodeIssue {
        let mut issue = CodeIssue::new(self.category, self.severity, self.message)
            .explain(self.explanation)
            .suggest(self.suggestion)
            .confidence(0.8)
            .at(line.number, line.column_of(start));
        if !self.tag.is_empty() {
            issue = issue.tag(self.tag);
        }
        issue
    }
}

lazy_static! {
    /// Patterns checked for every language with a rule table.
    pub static ref COMMON_PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            r#"(?i)\b(password|passwd|pwd|api[_-]?key|secret|token)\s*[:=]\s*["'][^"']+["']"#,
            IssueCategory::Security,
            Severity::High,
            "Hard-coded credential",
        )
        .explain("Secrets committed to source code leak through version control and logs.")
        .suggest("Load credentials from environment variables or a secrets manager")
        .tag("credentials"),
        PatternRule::new(
            r#"(?i)["'](SELECT|INSERT|UPDATE|DELETE)\b[^"']*["']\s*\+"#,
            IssueCategory::Security,
            Severity::High,
            "SQL query built by string concatenation",
        )
        .explain("Concatenating input into SQL allows SQL injection.")
        .suggest("Use parameterized queries or prepared statements")
        .tag("sql_injection"),
        PatternRule::new(
            r#"(?i)\bf["'](SELECT|INSERT|UPDATE|DELETE)\b[^"']*\{"#,
            IssueCategory::Security,
            Severity::High,
            "SQL query built by string formatting",
        )
        .explain("Interpolating input into SQL allows SQL injection.")
        .suggest("Use parameterized queries instead of f-strings")
        .tag("sql_injection"),
    ];
}

/// Report the first match of each rule on the line.
pub fn check_patterns(line: &SourceLine<'_>, rules: &[PatternRule]) -> Vec<CodeIssue> {
    rules
        .iter()
        .filter_map(|rule| rule.first_match(line.text).map(|start| rule.to_issue(line, start)))
        .collect()
}

/// Flag a line longer than `max` characters.
pub fn check_line_length(line: &SourceLine<'_>, max: usize) -> Option<CodeIssue> {
    let len = line.text.chars().count();
    if max == 0 || len <= max {
        return None;
    }
    Some(
        CodeIssue::new(
            IssueCategory::Style,
            Severity::Low,
            format!("Line too long ({} > {} characters)", len, max),
        )
        .explain("Long lines are hard to read and review.")
        .suggest("Break the line into smaller expressions")
        .at(line.number, max + 1)
        .tag("line_length"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::source::lines;

    fn check(code: &str) -> Vec<CodeIssue> {
        let line = lines(code).next().unwrap();
        check_patterns(&line, &COMMON_PATTERNS)
    }

    #[test]
    fn test_hardcoded_credentials() {
        let issues = check("api_key = \"sk-123456\"");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].category, IssueCategory::Security);
        assert!(issues[0].has_tag("credentials"));

        assert!(check("password = os.environ[\"PASSWORD\"]").is_empty());
    }

    #[test]
    fn test_sql_concatenation() {
        let issues = check("query = \"SELECT * FROM users WHERE id = \" + user_id");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "SQL query built by string concatenation");

        let issues = check("cur.execute(f\"DELETE FROM t WHERE id = {x}\")");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_matches_inside_strings_are_skipped() {
        let rule = PatternRule::new(r"\beval\s*\(", IssueCategory::Security, Severity::Critical, "eval");
        let line = lines("msg = \"never call eval(x)\"").next().unwrap();
        assert!(check_patterns(&line, std::slice::from_ref(&rule)).is_empty());
        let rule = rule.in_strings();
        assert_eq!(check_patterns(&line, std::slice::from_ref(&rule)).len(), 1);
    }

    #[test]
    fn test_line_length() {
        let long = "x".repeat(100);
        let line = lines(&long).next().unwrap();
        let issue = check_line_length(&line, 88).unwrap();
        assert_eq!(issue.message, "Line too long (100 > 88 characters)");
        assert_eq!(issue.location(), Some((1, 89)));
        assert!(check_line_length(&line, 120).is_none());
    }
}
