//! Integration tests for the full analysis pipeline.
//!
//! These tests run the analyzer against the testdata fixtures and inline
//! snippets and check the behavior callers rely on: degenerate inputs,
//! issue ordering, scoring and determinism.

use std::path::PathBuf;

use codelens::analysis::get_module;
use codelens::detect::{CodeIssue, IssueCategory, Severity};
use codelens::score::{self, STRICT};
use codelens::{AnalysisResult, AnalyzeOptions, Analyzer};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(testdata_path().join(name)).expect("should read fixture")
}

fn analyze(code: &str, language: &str) -> AnalysisResult {
    codelens::init();
    Analyzer::new().analyze(code, language, &AnalyzeOptions::default())
}

#[test]
fn test_empty_input() {
    let result = analyze("", "python");
    assert_eq!(result.quality_score, 0.0);
    assert_eq!(result.issues.len(), 1);
    assert!(result.suggestions.is_empty());
    assert!(result.recommendations.is_empty());
}

#[test]
fn test_java_without_class_or_main() {
    let result = analyze(&fixture("Hello.java"), "java");

    let class = result
        .issues
        .iter()
        .find(|i| i.message.starts_with("Missing class declaration"))
        .expect("should report the missing class");
    assert_eq!(class.severity, Severity::Critical);

    let main = result
        .issues
        .iter()
        .find(|i| i.message.starts_with("Missing main method"))
        .expect("should report the missing main method");
    assert_eq!(main.severity, Severity::Critical);

    assert!(result.quality_score <= 4.0, "score {} not reduced by 6", result.quality_score);
}

#[test]
fn test_python_missing_colon() {
    let result = analyze(&fixture("missing_colon.py"), "python");
    let issue = result
        .issues
        .iter()
        .find(|i| i.message.starts_with("Missing colon"))
        .expect("should report the missing colon");
    assert_eq!(issue.severity, Severity::Critical);
    assert_eq!(issue.line, Some(1));
    assert!(issue.column.is_some());
    assert!(result
        .suggestions
        .iter()
        .any(|s| s.title == "Fix Critical Syntax Errors"));
}

#[test]
fn test_language_mismatch_comes_first() {
    let result = analyze(&fixture("mismatch.py"), "python");
    let first = &result.issues[0];
    assert_eq!(first.severity, Severity::Critical);
    assert_eq!(first.category, IssueCategory::Logic);
    assert_eq!(first.line, Some(1));
    assert!(first.message.to_lowercase().contains("cpp"));
    assert!(first.suggestion.to_lowercase().contains("cpp"));
}

#[test]
fn test_matching_language_has_no_mismatch() {
    let result = analyze("#include <iostream>\nint main(){}", "C++");
    assert_eq!(result.language, "cpp");
    assert!(!result.issues.iter().any(|i| i.has_tag("language_mismatch")));
}

#[test]
fn test_unsupported_language_is_safe() {
    let code = "+++[>++<-]\n>.\n\n<<.";
    let result = analyze(code, "brainfuck");
    assert_eq!(
        result.metrics.number("lines_of_code"),
        Some(code.split('\n').count() as f64)
    );
    assert!(result.issues[0].message.contains("brainfuck"));
    assert!(result.issues[0].message.contains("python"));
    assert!((0.0..=10.0).contains(&result.quality_score));
}

#[test]
fn test_fallback_languages_get_generic_checks() {
    for language in ["php", "ruby", "swift", "kotlin"] {
        let result = analyze("puts(\"hi\"", language);
        assert_eq!(result.language, language);
        assert!(result.issues.iter().any(|i| i.has_tag("balance")));
        assert_eq!(result.metrics.len(), 1);
    }
}

#[test]
fn test_issues_sorted_by_severity() {
    let code = "x = eval(input())\nif x == 1\n    print(x)\n# TODO\n";
    let result = analyze(code, "python");
    let severities: Vec<Severity> = result.issues.iter().map(|i| i.severity).collect();
    let mut sorted = severities.clone();
    sorted.sort();
    assert_eq!(severities, sorted);
}

#[test]
fn test_clean_code_scores_well() {
    let result = analyze(&fixture("clean.py"), "python");
    assert!(!result.has_critical(), "unexpected issues: {:?}", result.issues);
    assert!(result.quality_score >= 8.0);
    assert_eq!(result.metrics.number("function_count"), Some(2.0));
    assert!(result.metrics.contains("total_lines"));
}

#[test]
fn test_balanced_lines_have_no_balance_issues() {
    let code = "values = [len(x) for x in (a, b)]\nlabel = \"a\" + 'b'\nconfig = {\"k\": [1, 2]}\n";
    let result = analyze(code, "python");
    assert!(!result.issues.iter().any(|i| i.has_tag("balance")));
}

#[test]
fn test_analysis_is_deterministic() {
    let samples = [
        (fixture("Hello.java"), "java"),
        (fixture("missing_colon.py"), "python"),
        (fixture("mismatch.py"), "python"),
        ("var a = 1\nif (a == 1) { document.write(a) }".to_string(), "javascript"),
        ("int main() {\n  char *p = malloc(10);\n  gets(p);\n}".to_string(), "c"),
        ("fn main() {\n    let x = foo().unwrap();\n}".to_string(), "rust"),
    ];
    for (code, language) in &samples {
        let a = analyze(code, language);
        let b = analyze(code, language);
        assert_eq!(a.issues, b.issues);
        assert_eq!(a.suggestions, b.suggestions);
        assert_eq!(a.recommendations, b.recommendations);
        assert_eq!(a.quality_score, b.quality_score);
        assert_eq!(a.metrics, b.metrics);
    }
}

#[test]
fn test_adding_critical_issue_never_raises_score() {
    let module = get_module("java").unwrap();
    let code = fixture("Hello.java");
    let mut issues = module.find_issues(&code);
    let metrics = module.calculate_metrics(&code);

    let mut previous = score::calculate(&issues, &metrics, &STRICT);
    for _ in 0..5 {
        issues.push(CodeIssue::new(IssueCategory::Syntax, Severity::Critical, "extra"));
        let next = score::calculate(&issues, &metrics, &STRICT);
        assert!(next <= previous);
        assert!(next >= 0.0);
        previous = next;
    }
    assert_eq!(previous, 0.0);
}

#[test]
fn test_suggestion_and_recommendation_caps() {
    let code = "var a = 1\nif (a == 1) { eval(a) }\ndocument.write(a)\nconsole.log(a)\nfunction f() { return a }";
    let result = analyze(code, "javascript");
    assert!(result.suggestions.len() <= 4);
    assert!(result.recommendations.len() <= 5);
    let priorities: Vec<u8> = result.recommendations.iter().map(|r| r.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort();
    assert_eq!(priorities, sorted);
}

#[test]
fn test_quick_reports_major_issues_on_hundred_scale() {
    codelens::init();
    let quick = Analyzer::new().quick(&fixture("Hello.java"), "java");
    assert_eq!(quick.language, "java");
    assert!(quick.quality_score <= 40.0);
    assert!(quick
        .major_issues
        .iter()
        .all(|i| matches!(i.severity, Severity::Critical | Severity::High)));
    assert!(quick.major_issues.len() >= 2);
}

#[test]
fn test_each_unbalanced_line_gets_its_own_issue() {
    for code in ["x = f(1\ny = g(2))", "result = compute(a,\n    b)\n"] {
        let result = analyze(code, "python");
        let lines: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.has_tag("balance"))
            .map(|i| i.line)
            .collect();
        assert_eq!(lines, vec![Some(1), Some(2)], "code: {:?}", code);
    }
}

#[test]
fn test_csharp_is_scored_as_partial_coverage() {
    let result = analyze("Console.WriteLine(\"hi\");", "csharp");
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);
    assert_eq!(result.quality_score, 8.0);
    assert!(result
        .suggestions
        .iter()
        .any(|s| s.title == "Improve CSHARP Code Structure"));
    let topics: Vec<_> = result.recommendations.iter().map(|r| r.topic.as_str()).collect();
    assert!(topics.contains(&"C# Best Practices"));
    assert!(topics.contains(&"C# Style Guide"));
}

#[test]
fn test_typed_c_code_is_not_taken_for_javascript() {
    let code = "int add(const int a, const int b) {\n    return a + b;\n}";
    let result = analyze(code, "c");
    assert!(!result.issues.iter().any(|i| i.has_tag("language_mismatch")));
}
