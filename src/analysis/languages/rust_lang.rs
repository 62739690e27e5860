//! Rust rules.

use lazy_static::lazy_static;

use crate::analysis::metrics::count_words;
use crate::analysis::table::LanguageRules;
use crate::detect::source::BlockState;
use crate::detect::{CodeMetrics, IssueCategory, PatternRule, Severity};

pub static RUST: LanguageRules = LanguageRules {
    id: "rust",
    display_name: "Rust",
    extensions: &["rs"],
    // Lifetimes ('a) make single-quote counts meaningless.
    single_quotes: false,
    max_line_length: 100,
    patterns: patterns,
    metrics: metrics,
    ..LanguageRules::BASE
};

lazy_static! {
    static ref PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            r"\b(?:println|eprintln|print|eprint)\s*\(",
            IssueCategory::Syntax,
            Severity::Critical,
            "Macro call is missing '!': use println!(...)",
        )
        .explain("println is a macro, and macros are invoked with an exclamation mark.")
        .suggest("Add '!' after the macro name: println!(\"...\")")
        .tag("macro_call"),
        PatternRule::new(
            r"\.unwrap\(\)",
            IssueCategory::BestPractice,
            Severity::Low,
            "unwrap() panics on None or Err",
        )
        .explain("A panic aborts the thread with little context about what went wrong.")
        .suggest("Propagate the error with '?' or handle it with match / unwrap_or")
        .tag("error_handling"),
    ];
}

fn patterns() -> &'static [PatternRule] {
    &PATTERNS
}

fn metrics(code: &str, states: &[BlockState], metrics: &mut CodeMetrics) {
    metrics.insert("function_count", count_words(code, &["fn"], states));
    metrics.insert("has_main", code.contains("fn main("));
    metrics.insert("documented", code.contains("///") || code.contains("//!"));
}
