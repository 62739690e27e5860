//! C# rules.

use lazy_static::lazy_static;

use crate::analysis::metrics::count_words;
use crate::analysis::table::{critical_fix_suggestion, LanguageRules};
use crate::analysis::Capability;
use crate::detect::source::BlockState;
use crate::detect::{
    CodeIssue, CodeMetrics, CodeSuggestion, IssueCategory, LearningRecommendation, Misspelling,
    PatternRule, ResourceType, Severity, SuggestionType,
};

const MISSPELLINGS: &[Misspelling] = &[
    Misspelling::new("consle", "Console"),
    Misspelling::new("conosle", "Console"),
    Misspelling::new("retrun", "return"),
    Misspelling::new("reutrn", "return"),
];

pub static CSHARP: LanguageRules = LanguageRules {
    id: "csharp",
    display_name: "C#",
    capability: Capability::Partial,
    extensions: &["cs"],
    terminator: Some(';'),
    misspellings: MISSPELLINGS,
    patterns: patterns,
    metrics: metrics,
    suggestions: suggestions,
    recommendations: recommendations,
    ..LanguageRules::BASE
};

lazy_static! {
    static ref PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            r"\bConsole\.(?:Writeline|Readline|writeline|readline|writeLine|readLine)\b",
            IssueCategory::Syntax,
            Severity::Critical,
            "C# is case-sensitive: use 'WriteLine' / 'ReadLine'",
        )
        .explain("C# method names are case-sensitive; the methods are WriteLine and ReadLine.")
        .suggest("Write the method name as Console.WriteLine or Console.ReadLine")
        .tag("case_sensitivity"),
        PatternRule::new(
            r"\bconsole\.[A-Za-z]",
            IssueCategory::Syntax,
            Severity::Critical,
            "C# is case-sensitive: 'console' should be 'Console'",
        )
        .explain("The class is called Console with a capital C.")
        .suggest("Write 'Console' with a capital C")
        .tag("case_sensitivity"),
        PatternRule::new(
            r"\bcatch\s*(?:\([^)]*\))?\s*\{\s*\}",
            IssueCategory::BestPractice,
            Severity::Medium,
            "Empty catch block",
        )
        .explain("Swallowing an exception hides failures.")
        .suggest("Log the exception or handle it")
        .tag("error_handling"),
    ];
}

fn patterns() -> &'static [PatternRule] {
    &PATTERNS
}

fn metrics(code: &str, states: &[BlockState], metrics: &mut CodeMetrics) {
    metrics.insert("has_main", code.contains("Main("));
    metrics.insert("has_class", count_words(code, &["class"], states) > 0);
    metrics.insert("console_calls", code.matches("Console.").count());
    metrics.insert("documented", code.contains("///"));
}

fn suggestions(
    _: &LanguageRules,
    code: &str,
    issues: &[CodeIssue],
    out: &mut Vec<CodeSuggestion>,
) {
    out.extend(critical_fix_suggestion(
        "Fix C# Syntax Errors",
        "Your code has syntax errors. C# is strict about semicolons and the capitalization of names.",
        code,
        issues,
    ));

    if code.contains("Console.Write") && code.contains("\" +") {
        out.push(
            CodeSuggestion::new(
                "Use String Interpolation",
                "Interpolated strings are easier to read than concatenation.",
                SuggestionType::ModernSyntax,
            )
            .before_after(
                "Console.WriteLine(\"Total: \" + total);",
                "Console.WriteLine($\"Total: {total}\");",
            )
            .priority(4),
        );
    }
}

fn recommendations(
    _: &LanguageRules,
    issues: &[CodeIssue],
    _: &CodeMetrics,
    out: &mut Vec<LearningRecommendation>,
) {
    if issues.iter().any(|i| i.category == IssueCategory::Syntax) {
        out.push(LearningRecommendation::new(
            "C# Syntax Basics",
            "Review statements, semicolons and how a C# program is laid out.",
            ResourceType::Tutorial,
            "45 minutes",
            1,
        ));
    }
    if issues.iter().any(|i| i.has_tag("case_sensitivity")) {
        out.push(LearningRecommendation::new(
            "C# Naming and Case Sensitivity",
            "C# treats 'Console' and 'console' as different names.",
            ResourceType::Documentation,
            "15 minutes",
            2,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{RuleModule, TableRuleModule};

    fn module() -> TableRuleModule {
        TableRuleModule::new(&CSHARP)
    }

    fn findings(code: &str) -> Vec<CodeIssue> {
        module()
            .find_issues(code)
            .into_iter()
            .filter(|i| !i.has_tag("balance"))
            .collect()
    }

    #[test]
    fn test_valid_program() {
        let code = "using System;\n\nclass Program\n{\n    static void Main(string[] args)\n    {\n        int total = 3;\n        Console.WriteLine($\"Total: {total}\");\n    }\n}";
        assert!(findings(code).is_empty());
        let metrics = module().calculate_metrics(code);
        assert!(metrics.flag("has_main"));
        assert!(metrics.flag("has_class"));
        assert_eq!(metrics.number("console_calls"), Some(1.0));
    }

    #[test]
    fn test_case_errors() {
        let issues = findings("Console.Writeline(\"hi\");\nconsole.WriteLine(\"hi\");");
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.has_tag("case_sensitivity")));
        assert!(issues.iter().all(|i| i.severity == Severity::Critical));
    }

    #[test]
    fn test_missing_semicolon_and_advice() {
        let m = module();
        let code = "Console.WriteLine(\"Total: \" + total)";
        let issues = m.find_issues(code);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].example_fix.as_deref(),
            Some("Console.WriteLine(\"Total: \" + total);")
        );
        let titles: Vec<_> = m
            .generate_suggestions(code, &issues)
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Fix C# Syntax Errors",
                "Use String Interpolation",
                "Improve CSHARP Code Structure"
            ]
        );
        let topics: Vec<_> = m
            .get_learning_recommendations(&issues, &m.calculate_metrics(code))
            .into_iter()
            .map(|r| r.topic)
            .collect();
        assert_eq!(topics, vec!["C# Syntax Basics", "C# Best Practices", "C# Style Guide"]);
    }

    #[test]
    fn test_scored_with_degraded_rubric() {
        let m = module();
        assert_eq!(m.capability(), Capability::Partial);
        let code = "Console.WriteLine(\"hi\");";
        let issues = m.find_issues(code);
        assert!(issues.is_empty());
        assert_eq!(m.calculate_quality_score(&issues, &m.calculate_metrics(code)), 8.0);
    }
}
