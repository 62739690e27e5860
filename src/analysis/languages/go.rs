//! Go rules.
//!
//! Partial coverage: a package requirement and the lower-case `fmt` call
//! mistake on top of the shared checks.

use lazy_static::lazy_static;

use crate::analysis::metrics::count_words;
use crate::analysis::table::LanguageRules;
use crate::detect::source::BlockState;
use crate::detect::{CodeMetrics, IssueCategory, PatternRule, Requirement, Severity};

const REQUIREMENTS: &[Requirement] = &[Requirement {
    when_any: &[],
    requires_any: &["package "],
    severity: Severity::High,
    message: "Missing package declaration",
    explanation: "Every Go source file starts with a package clause.",
    suggestion: "Add 'package main' as the first line",
    example_fix: "package main",
    tag: "package",
}];

pub static GO: LanguageRules = LanguageRules {
    id: "go",
    display_name: "Go",
    extensions: &["go"],
    block_delimiters: &[("/*", "*/"), ("`", "`")],
    requirements: REQUIREMENTS,
    patterns: patterns,
    metrics: metrics,
    ..LanguageRules::BASE
};

lazy_static! {
    static ref PATTERNS: Vec<PatternRule> = vec![PatternRule::new(
        r"\bfmt\.(?:println|printf|print|sprintf)\s*\(",
        IssueCategory::Syntax,
        Severity::Critical,
        "Go is case-sensitive: exported functions start with a capital letter (fmt.Println)",
    )
    .explain("Only capitalized names are exported from a package, so fmt.println does not exist.")
    .suggest("Use fmt.Println, fmt.Printf or fmt.Print")
    .tag("case_sensitivity")];
}

fn patterns() -> &'static [PatternRule] {
    &PATTERNS
}

fn metrics(code: &str, states: &[BlockState], metrics: &mut CodeMetrics) {
    metrics.insert("function_count", count_words(code, &["func"], states));
    metrics.insert("has_main", code.contains("func main("));
}
