//! Rule modules driven by per-language rule tables.
//!
//! Every supported language is described by one static [`LanguageRules`]
//! value. The shared checks (balance, terminators, block colons,
//! misspellings, structural requirements, patterns, line length, work
//! markers) are configured by its data fields; anything specific to one
//! language goes through its hook functions.

use crate::detect::source::{block_states, lines, BlockState, SourceLine};
use crate::detect::{
    check_balance, check_block_colon, check_line_length, check_misspellings, check_patterns,
    check_requirements, check_terminator, check_todo, BalanceOptions, CodeIssue, CodeMetrics,
    CodeSuggestion, Difficulty, Impact, LearningRecommendation, Misspelling, PatternRule,
    Requirement, ResourceType, SuggestionType, COMMON_PATTERNS,
};

use super::metrics::line_metrics;
use super::traits::{Capability, RuleModule};

/// Default maximum line length.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 120;

/// Files longer than this get a "Break Down Large File" suggestion.
pub const LARGE_FILE_LINES: usize = 50;

/// Static description of one language.
pub struct LanguageRules {
    pub id: &'static str,
    pub display_name: &'static str,
    pub capability: Capability,
    /// File extensions without the dot.
    pub extensions: &'static [&'static str],
    /// Lines starting with one of these are comments.
    pub comment_prefixes: &'static [&'static str],
    pub line_comment: &'static str,
    /// Multi-line comment and string delimiters.
    pub block_delimiters: &'static [(&'static str, &'static str)],
    /// Statement terminator checked on statement lines.
    pub terminator: Option<char>,
    /// Block headers must end with `:`.
    pub block_colons: bool,
    pub single_quotes: bool,
    pub misspellings: &'static [Misspelling],
    pub requirements: &'static [Requirement],
    pub max_line_length: usize,
    pub patterns: fn() -> &'static [PatternRule],
    pub line_checks: fn(&SourceLine<'_>, &mut Vec<CodeIssue>),
    pub file_checks: fn(&LanguageRules, &str, &[BlockState], &mut Vec<CodeIssue>),
    pub metrics: fn(&str, &[BlockState], &mut CodeMetrics),
    pub suggestions: fn(&LanguageRules, &str, &[CodeIssue], &mut Vec<CodeSuggestion>),
    pub recommendations:
        fn(&LanguageRules, &[CodeIssue], &CodeMetrics, &mut Vec<LearningRecommendation>),
}

fn no_patterns() -> &'static [PatternRule] {
    &[]
}

fn no_line_checks(_: &SourceLine<'_>, _: &mut Vec<CodeIssue>) {}

fn no_file_checks(_: &LanguageRules, _: &str, _: &[BlockState], _: &mut Vec<CodeIssue>) {}

fn no_metrics(_: &str, _: &[BlockState], _: &mut CodeMetrics) {}

fn no_suggestions(_: &LanguageRules, _: &str, _: &[CodeIssue], _: &mut Vec<CodeSuggestion>) {}

fn no_recommendations(
    _: &LanguageRules,
    _: &[CodeIssue],
    _: &CodeMetrics,
    _: &mut Vec<LearningRecommendation>,
) {
}

impl LanguageRules {
    /// Defaults for struct-update syntax in language tables.
    pub const BASE: LanguageRules = LanguageRules {
        id: "",
        display_name: "",
        capability: Capability::Partial,
        extensions: &[],
        comment_prefixes: &["//", "/*", "*"],
        line_comment: "//",
        block_delimiters: &[("/*", "*/")],
        terminator: None,
        block_colons: false,
        single_quotes: true,
        misspellings: &[],
        requirements: &[],
        max_line_length: DEFAULT_MAX_LINE_LENGTH,
        patterns: no_patterns,
        line_checks: no_line_checks,
        file_checks: no_file_checks,
        metrics: no_metrics,
        suggestions: no_suggestions,
        recommendations: no_recommendations,
    };

    pub fn balance_options(&self) -> BalanceOptions<'static> {
        BalanceOptions {
            skip_prefixes: self.comment_prefixes,
            line_comment: self.line_comment,
            single_quotes: self.single_quotes,
            block_delimiters: self.block_delimiters,
        }
    }

    pub fn handles_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    fn check_line(&self, line: &SourceLine<'_>, issues: &mut Vec<CodeIssue>) {
        if let Some(terminator) = self.terminator {
            issues.extend(check_terminator(
                line,
                terminator,
                self.line_comment,
                self.display_name,
            ));
        }
        if self.block_colons {
            issues.extend(check_block_colon(line));
        }
        issues.extend(check_misspellings(line, self.misspellings, self.display_name));
        issues.extend(check_patterns(line, &COMMON_PATTERNS));
        issues.extend(check_patterns(line, (self.patterns)()));
        issues.extend(check_line_length(line, self.max_line_length));
        (self.line_checks)(line, issues);
    }
}

/// A [`RuleModule`] backed by a static rule table.
pub struct TableRuleModule {
    rules: &'static LanguageRules,
}

impl TableRuleModule {
    pub fn new(rules: &'static LanguageRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static LanguageRules {
        self.rules
    }
}

impl RuleModule for TableRuleModule {
    fn language_id(&self) -> &str {
        self.rules.id
    }

    fn display_name(&self) -> &str {
        self.rules.display_name
    }

    fn capability(&self) -> Capability {
        self.rules.capability
    }

    fn find_issues(&self, code: &str) -> Vec<CodeIssue> {
        let rules = self.rules;
        let states = block_states(code, rules.block_delimiters);

        let mut positioned = check_balance(code, &rules.balance_options());
        for (line, state) in lines(code).zip(states.iter().copied()) {
            if line.is_blank() {
                continue;
            }
            // Markers live in comments, so they are checked on every line.
            positioned.extend(check_todo(&line));
            if !state.is_code() || line.starts_with_any(rules.comment_prefixes) {
                continue;
            }
            rules.check_line(&line, &mut positioned);
        }
        (rules.file_checks)(rules, code, &states, &mut positioned);

        // Line order first; the stable sort keeps per-line check order.
        positioned.sort_by_key(|i| i.line.unwrap_or(0));

        let mut issues = check_requirements(code, rules.requirements, rules.display_name);
        issues.extend(positioned);
        issues
    }

    fn generate_suggestions(&self, code: &str, issues: &[CodeIssue]) -> Vec<CodeSuggestion> {
        let rules = self.rules;
        let mut suggestions = Vec::new();
        (rules.suggestions)(rules, code, issues, &mut suggestions);

        if rules.capability == Capability::Partial {
            suggestions.push(
                CodeSuggestion::new(
                    format!("Improve {} Code Structure", rules.id.to_uppercase()),
                    format!(
                        "Consider following {} best practices for better code organization.",
                        rules.display_name
                    ),
                    SuggestionType::BestPractice,
                )
                .impact(Impact::Medium)
                .priority(3),
            );
            if code.split('\n').count() > LARGE_FILE_LINES {
                suggestions.push(
                    CodeSuggestion::new(
                        "Break Down Large File",
                        format!(
                            "Consider breaking down this large {} file into smaller modules.",
                            rules.display_name
                        ),
                        SuggestionType::Refactor,
                    )
                    .difficulty(Difficulty::Medium)
                    .priority(2),
                );
            }
        }

        suggestions
    }

    fn calculate_metrics(&self, code: &str) -> CodeMetrics {
        let rules = self.rules;
        let states = block_states(code, rules.block_delimiters);
        let mut metrics = line_metrics(code, rules.comment_prefixes, &states);
        (rules.metrics)(code, &states, &mut metrics);
        metrics
    }

    fn get_learning_recommendations(
        &self,
        issues: &[CodeIssue],
        metrics: &CodeMetrics,
    ) -> Vec<LearningRecommendation> {
        let rules = self.rules;
        let mut recommendations = Vec::new();
        (rules.recommendations)(rules, issues, metrics, &mut recommendations);

        if rules.capability == Capability::Partial {
            recommendations.push(LearningRecommendation::new(
                format!("{} Best Practices", rules.display_name),
                format!(
                    "Learn industry-standard practices for writing clean {} code.",
                    rules.display_name
                ),
                ResourceType::Documentation,
                "30 minutes",
                3,
            ));
            recommendations.push(LearningRecommendation::new(
                format!("{} Style Guide", rules.display_name),
                format!(
                    "Follow the official {} style guidelines for consistent formatting.",
                    rules.display_name
                ),
                ResourceType::Documentation,
                "15 minutes",
                4,
            ));
        }

        recommendations
    }
}

/// Suggestion pointing at the first critical issue that carries a fix.
///
/// Used by the full modules for their "fix syntax errors" quick fix.
pub fn critical_fix_suggestion(
    title: &str,
    description: &str,
    code: &str,
    issues: &[CodeIssue],
) -> Option<CodeSuggestion> {
    use crate::detect::Severity;

    if !issues.iter().any(|i| i.severity == Severity::Critical) {
        return None;
    }
    let mut suggestion = CodeSuggestion::new(title, description, SuggestionType::QuickFix)
        .impact(Impact::High)
        .priority(10);

    let example = issues.iter().find_map(|i| {
        let line = i.line?;
        let fix = i.example_fix.as_deref()?;
        if i.severity != Severity::Critical || fix.contains('\n') {
            return None;
        }
        let before = code.split('\n').nth(line - 1)?.trim();
        (!before.is_empty() && before != fix).then(|| (before.to_string(), fix.to_string()))
    });
    if let Some((before, after)) = example {
        suggestion = suggestion.before_after(before, after);
    }
    Some(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{IssueCategory, Severity};

    static TOY: LanguageRules = LanguageRules {
        id: "toy",
        display_name: "Toy",
        extensions: &["toy"],
        terminator: Some(';'),
        ..LanguageRules::BASE
    };

    #[test]
    fn test_partial_module_adds_generic_advice() {
        let module = TableRuleModule::new(&TOY);
        let suggestions = module.generate_suggestions("x = 1;", &[]);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Improve TOY Code Structure");

        let long = "x = 1;\n".repeat(60);
        let suggestions = module.generate_suggestions(&long, &[]);
        assert!(suggestions.iter().any(|s| s.title == "Break Down Large File"));

        let recs = module.get_learning_recommendations(&[], &CodeMetrics::new());
        let topics: Vec<_> = recs.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(topics, vec!["Toy Best Practices", "Toy Style Guide"]);
    }

    #[test]
    fn test_find_issues_orders_by_line() {
        let module = TableRuleModule::new(&TOY);
        let code = "a = f(1\n// x = 2\nb = 3\n/* c = 4\n  TODO */";
        let issues = module.find_issues(code);
        let lines: Vec<_> = issues.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![Some(1), Some(1), Some(3), Some(5)]);
        assert!(issues[2].message.contains("semicolon"));
        assert_eq!(issues[3].severity, Severity::Info);
    }

    #[test]
    fn test_metrics_have_required_keys() {
        let module = TableRuleModule::new(&TOY);
        let metrics = module.calculate_metrics("a;\nb;");
        assert_eq!(metrics.number("lines_of_code"), Some(2.0));
        assert!(metrics.contains("total_lines"));
    }

    #[test]
    fn test_critical_fix_suggestion() {
        let code = "int x = 5";
        let issue = CodeIssue::new(IssueCategory::Syntax, Severity::Critical, "Missing semicolon")
            .at(1, 10)
            .fix("int x = 5;");
        let s = critical_fix_suggestion("Fix", "d", code, &[issue]).unwrap();
        assert_eq!(s.priority, 10);
        assert_eq!(s.code_before.as_deref(), Some("int x = 5"));
        assert_eq!(s.code_after.as_deref(), Some("int x = 5;"));

        assert!(critical_fix_suggestion("Fix", "d", code, &[]).is_none());
    }
}
