//! Python rules.

use lazy_static::lazy_static;

use crate::analysis::metrics::count_words;
use crate::analysis::table::{critical_fix_suggestion, LanguageRules};
use crate::analysis::Capability;
use crate::detect::source::{
    first_word, find_top_level, lines, open_bracket_balance, strip_line_comment, BlockState,
    SourceLine,
};
use crate::detect::{
    opens_block, CodeIssue, CodeMetrics, CodeSuggestion, IssueCategory, LearningRecommendation,
    Misspelling, PatternRule, ResourceType, Severity, SuggestionType,
};

const MISSPELLINGS: &[Misspelling] = &[
    Misspelling::new("pritn", "print"),
    Misspelling::new("prnit", "print"),
    Misspelling::new("retrun", "return"),
    Misspelling::new("reutrn", "return"),
    Misspelling::new("improt", "import"),
    Misspelling::new("slef", "self"),
    Misspelling::exact("ture", "True"),
    Misspelling::exact("flase", "False"),
];

pub static PYTHON: LanguageRules = LanguageRules {
    id: "python",
    display_name: "Python",
    capability: Capability::Full,
    extensions: &["py", "pyw"],
    comment_prefixes: &["#"],
    line_comment: "#",
    block_delimiters: &[("\"\"\"", "\"\"\""), ("'''", "'''")],
    terminator: None,
    block_colons: true,
    single_quotes: true,
    misspellings: MISSPELLINGS,
    requirements: &[],
    max_line_length: 88,
    patterns: patterns,
    line_checks: line_checks,
    file_checks: file_checks,
    metrics: metrics,
    suggestions: suggestions,
    recommendations: recommendations,
};

lazy_static! {
    static ref PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            r"^\s*except\s*:",
            IssueCategory::BestPractice,
            Severity::High,
            "Bare except clause catches all exceptions",
        )
        .explain("A bare except also catches KeyboardInterrupt and SystemExit and hides real errors.")
        .suggest("Catch specific exceptions, e.g. 'except ValueError:'")
        .tag("error_handling"),
        PatternRule::new(
            r"\beval\s*\(",
            IssueCategory::Security,
            Severity::Critical,
            "Use of eval() is a security risk",
        )
        .explain("eval() executes arbitrary code and is dangerous with untrusted input.")
        .suggest("Use ast.literal_eval() for literals or parse the input explicitly")
        .tag("security"),
        PatternRule::new(
            r"\bexec\s*\(",
            IssueCategory::Security,
            Severity::High,
            "Use of exec() is a security risk",
        )
        .explain("exec() runs arbitrary code.")
        .suggest("Avoid exec(); call the needed functions directly")
        .tag("security"),
        PatternRule::new(
            r#"^\s*print\s+[^\s=(.\[]"#,
            IssueCategory::Syntax,
            Severity::Critical,
            "Missing parentheses in print statement",
        )
        .explain("In Python 3, print is a function and requires parentheses.")
        .suggest("Add parentheses around what you want to print: print(...)")
        .tag("python2"),
        PatternRule::new(
            r"^\t",
            IssueCategory::Style,
            Severity::Medium,
            "Tab used for indentation",
        )
        .explain("PEP 8 recommends 4 spaces per indentation level; mixing tabs and spaces breaks code.")
        .suggest("Indent with 4 spaces")
        .tag("indentation"),
    ];
}

fn patterns() -> &'static [PatternRule] {
    &PATTERNS
}

/// Byte offset of a lone `=` at the top level of a condition.
fn find_assignment(condition: &str) -> Option<usize> {
    let bytes = condition.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q && (i == 0 || bytes[i - 1] != b'\\') {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 => {
                let prev = if i > 0 { bytes[i - 1] } else { b' ' };
                let next = bytes.get(i + 1).copied().unwrap_or(b' ');
                if !b"=!<>:+-*/%&|^".contains(&prev) && next != b'=' {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn line_checks(line: &SourceLine<'_>, issues: &mut Vec<CodeIssue>) {
    let code = strip_line_comment(line.text, "#");
    let trimmed = code.trim_start();
    let keyword = first_word(trimmed);
    if !matches!(keyword, "if" | "elif" | "while") {
        return;
    }
    let offset = code.len() - trimmed.len() + keyword.len();
    let condition = &code[offset..];
    let Some(pos) = find_assignment(condition) else {
        return;
    };
    let at = offset + pos;
    let fixed = format!("{}=={}", &code[..at], &code[at + 1..]);
    issues.push(
        CodeIssue::new(
            IssueCategory::Logic,
            Severity::High,
            format!(
                "Assignment (=) used instead of comparison (==) in {} statement",
                keyword
            ),
        )
        .explain("A single '=' assigns a value; conditions compare values with '=='.")
        .suggest("Use '==' to compare values")
        .fix(fixed.trim())
        .at(line.number, line.column_of(at))
        .tag("comparison"),
    );
}

fn indentation_issue(line: &SourceLine<'_>, message: &str) -> CodeIssue {
    CodeIssue::new(
        IssueCategory::Syntax,
        Severity::Critical,
        format!("Indentation error: {}", message),
    )
    .explain("Python uses indentation to define blocks; inconsistent indentation stops the program from running.")
    .suggest("Indent each block consistently with 4 spaces")
    .at(line.number, line.indent_width() + 1)
    .tags(["indentation", "parse_error"])
}

/// Walk the block structure and report the first indentation failure.
fn check_indentation(code: &str, states: &[BlockState]) -> Option<CodeIssue> {
    let mut stack = vec![0usize];
    let mut expect_indent = false;
    let mut depth = 0i32;
    let mut continued = false;

    for (line, state) in lines(code).zip(states.iter().copied()) {
        if state == BlockState::Inside || line.is_blank() || line.trimmed.starts_with('#') {
            continue;
        }
        if depth > 0 || continued {
            let code = strip_line_comment(line.text, "#");
            depth += open_bracket_balance(code);
            continued = code.trim_end().ends_with('\\');
            continue;
        }

        let width = line.indent_width();
        let top = *stack.last().unwrap_or(&0);
        if expect_indent {
            if width <= top {
                return Some(indentation_issue(&line, "expected an indented block"));
            }
            stack.push(width);
        } else if width > top {
            return Some(indentation_issue(&line, "unexpected indent"));
        } else if width < top {
            while stack.last().map_or(false, |&w| w > width) {
                stack.pop();
            }
            if stack.last() != Some(&width) {
                return Some(indentation_issue(
                    &line,
                    "unindent does not match any outer indentation level",
                ));
            }
        }

        if state == BlockState::Opens {
            expect_indent = false;
            continue;
        }
        let code = strip_line_comment(line.text, "#").trim_end();
        let trimmed = code.trim_start();
        expect_indent = trimmed.ends_with(':')
            || (opens_block(trimmed) && find_top_level(trimmed, ':').is_none());
        depth = open_bracket_balance(code).max(0);
        continued = code.ends_with('\\');
    }

    None
}

/// `+=` of a string inside a `for` loop body.
fn check_loop_concatenation(code: &str, states: &[BlockState], issues: &mut Vec<CodeIssue>) {
    lazy_static! {
        static ref CONCAT: regex::Regex =
            regex::Regex::new(r#"^\s*\w+\s*\+=\s*(f?["']|str\()"#).unwrap();
    }
    let mut loop_indent: Option<usize> = None;

    for (line, state) in lines(code).zip(states.iter().copied()) {
        if !state.is_code() || line.is_blank() || line.trimmed.starts_with('#') {
            continue;
        }
        let width = line.indent_width();
        if loop_indent.map_or(false, |w| width <= w) {
            loop_indent = None;
        }
        if first_word(line.trimmed) == "for" {
            loop_indent = Some(width);
            continue;
        }
        if loop_indent.is_some() && CONCAT.is_match(line.text) {
            issues.push(
                CodeIssue::new(
                    IssueCategory::Performance,
                    Severity::Medium,
                    "String concatenation in loop",
                )
                .explain("Strings are immutable, so '+=' in a loop copies the string every iteration.")
                .suggest("Collect the parts in a list and use ''.join(parts)")
                .fix("parts.append(value)  # then: ''.join(parts)")
                .confidence(0.8)
                .at(line.number, line.indent_width() + 1)
                .tag("performance"),
            );
        }
    }
}

fn file_checks(_: &LanguageRules, code: &str, states: &[BlockState], issues: &mut Vec<CodeIssue>) {
    issues.extend(check_indentation(code, states));
    check_loop_concatenation(code, states, issues);
}

fn metrics(code: &str, states: &[BlockState], metrics: &mut CodeMetrics) {
    let functions = count_words(code, &["def"], states);
    let classes = count_words(code, &["class"], states);
    let branches = count_words(code, &["if", "elif", "for", "while", "except"], states);

    metrics.insert("function_count", functions);
    metrics.insert("class_count", classes);
    metrics.insert("cyclomatic_complexity", branches + 1);
    metrics.insert("has_functions", functions > 0);
    metrics.insert("has_classes", classes > 0);
    metrics.insert("documented", code.contains("\"\"\"") || code.contains("'''"));
}

fn suggestions(
    _: &LanguageRules,
    code: &str,
    issues: &[CodeIssue],
    out: &mut Vec<CodeSuggestion>,
) {
    out.extend(critical_fix_suggestion(
        "Fix Critical Syntax Errors",
        "Your code has syntax errors that prevent it from running. Python is very particular about colons, parentheses and indentation.",
        code,
        issues,
    ));

    if issues.iter().any(|i| i.category == IssueCategory::Security) {
        out.push(
            CodeSuggestion::new(
                "Remove Dynamic Code Execution",
                "eval() and exec() run arbitrary code. Parse input explicitly instead.",
                SuggestionType::BestPractice,
            )
            .before_after("value = eval(user_input)", "value = ast.literal_eval(user_input)")
            .impact(crate::detect::Impact::High)
            .priority(9),
        );
    }

    if code.matches("print(").count() >= 3 {
        out.push(
            CodeSuggestion::new(
                "Use Logging Instead of Print",
                "The logging module gives levels, timestamps and configurable output.",
                SuggestionType::BestPractice,
            )
            .before_after(
                "print(\"Processing\", item)",
                "logger.info(\"Processing %s\", item)",
            )
            .priority(4),
        );
    }

    let has_functions = code.contains("def ");
    if has_functions && !code.contains("\"\"\"") && !code.contains("'''") {
        out.push(
            CodeSuggestion::new(
                "Add Docstrings",
                "Document what each function does, its arguments and its return value.",
                SuggestionType::Documentation,
            )
            .before_after(
                "def area(r):\n    return 3.14159 * r * r",
                "def area(r):\n    \"\"\"Return the area of a circle with radius r.\"\"\"\n    return 3.14159 * r * r",
            )
            .priority(3),
        );
    }

    if has_functions && !code.contains("->") {
        out.push(
            CodeSuggestion::new(
                "Add Type Hints",
                "Type hints document intent and let tools catch mistakes early.",
                SuggestionType::ModernSyntax,
            )
            .before_after("def add(a, b):", "def add(a: int, b: int) -> int:")
            .priority(2),
        );
    }
}

fn recommendations(
    _: &LanguageRules,
    issues: &[CodeIssue],
    metrics: &CodeMetrics,
    out: &mut Vec<LearningRecommendation>,
) {
    if issues.iter().any(|i| i.category == IssueCategory::Syntax) {
        out.push(LearningRecommendation::new(
            "Python Syntax Fundamentals",
            "Master the basic syntax rules of Python: colons, indentation and function calls.",
            ResourceType::Tutorial,
            "2-3 hours",
            1,
        ));
    }
    if issues.iter().any(|i| i.category == IssueCategory::Security) {
        out.push(LearningRecommendation::new(
            "Python Security Best Practices",
            "Learn to avoid eval(), injection and hard-coded secrets.",
            ResourceType::Documentation,
            "30 minutes",
            1,
        ));
    }
    if issues.iter().any(|i| i.has_tag("error_handling")) {
        out.push(LearningRecommendation::new(
            "Python Exception Handling",
            "Catch specific exceptions and handle them where you can recover.",
            ResourceType::Tutorial,
            "30 minutes",
            2,
        ));
    }
    let style_issues = issues
        .iter()
        .filter(|i| i.category == IssueCategory::Style)
        .count();
    if style_issues > 3 {
        out.push(LearningRecommendation::new(
            "PEP 8 - Python Style Guide",
            "Consistent style makes Python code easier to read and review.",
            ResourceType::Documentation,
            "45 minutes",
            2,
        ));
    }
    if metrics.number("cyclomatic_complexity").unwrap_or(0.0) > 10.0 {
        out.push(LearningRecommendation::new(
            "Code Refactoring Techniques",
            "Your code has many branches; learn to split it into smaller functions.",
            ResourceType::Course,
            "1 hour",
            3,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{RuleModule, TableRuleModule};
    use crate::detect::source::block_states;

    fn module() -> TableRuleModule {
        TableRuleModule::new(&PYTHON)
    }

    fn states(code: &str) -> Vec<BlockState> {
        block_states(code, PYTHON.block_delimiters)
    }

    #[test]
    fn test_missing_colon_scenario() {
        let issues = module().find_issues("if x == 1\n    print(x)");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert!(issues[0].message.contains("Missing colon"));
        assert_eq!(issues[0].line, Some(1));
    }

    #[test]
    fn test_clean_code_has_no_issues() {
        let code = "def add(a: int, b: int) -> int:\n    \"\"\"Add two numbers.\n\n    Don't overflow.\n    \"\"\"\n    return a + b\n\n\nif __name__ == \"__main__\":\n    print(add(1, 2))\n";
        assert!(module().find_issues(code).is_empty());
    }

    #[test]
    fn test_assignment_in_condition() {
        let issues = module().find_issues("if x = 5:\n    pass");
        let issue = issues
            .iter()
            .find(|i| i.category == IssueCategory::Logic)
            .unwrap();
        assert_eq!(issue.severity, Severity::High);
        assert_eq!(issue.example_fix.as_deref(), Some("if x == 5:"));
        assert_eq!(issue.location(), Some((1, 6)));

        assert!(find_assignment(" f(a=1) and b >= 2 and c != 3").is_none());
        assert!(find_assignment(" (n := 10) > 5").is_none());
    }

    #[test]
    fn test_print_without_parentheses() {
        let issues = module().find_issues("print \"hello\"");
        assert!(issues
            .iter()
            .any(|i| i.message == "Missing parentheses in print statement"));
    }

    #[test]
    fn test_risk_patterns() {
        let code = "try:\n    value = eval(text)\nexcept:\n    pass";
        let issues = module().find_issues(code);
        assert!(issues
            .iter()
            .any(|i| i.category == IssueCategory::Security && i.severity == Severity::Critical));
        assert!(issues.iter().any(|i| i.has_tag("error_handling")));
    }

    #[test]
    fn test_indentation_errors() {
        let code = "def f():\nreturn 1";
        let issue = check_indentation(code, &states(code)).unwrap();
        assert_eq!(issue.message, "Indentation error: expected an indented block");
        assert_eq!(issue.line, Some(2));

        let code = "x = 1\n    y = 2";
        let issue = check_indentation(code, &states(code)).unwrap();
        assert_eq!(issue.message, "Indentation error: unexpected indent");

        let code = "if x:\n        a = 1\n    b = 2";
        let issue = check_indentation(code, &states(code)).unwrap();
        assert!(issue.message.contains("unindent does not match"));

        let code = "items = [\n        1,\n  2,\n]\nif x: y = 1\nz = 2";
        assert!(check_indentation(code, &states(code)).is_none());
    }

    #[test]
    fn test_loop_concatenation() {
        let code = "s = ''\nfor w in words:\n    s += \"x\"\ns += 'done'";
        let mut issues = Vec::new();
        check_loop_concatenation(code, &states(code), &mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, Some(3));
    }

    #[test]
    fn test_metrics() {
        let code = "class A:\n    def f(self):\n        if self.x:\n            return 1\n        return 2\n";
        let m = module().calculate_metrics(code);
        assert_eq!(m.number("function_count"), Some(1.0));
        assert_eq!(m.number("class_count"), Some(1.0));
        assert_eq!(m.number("cyclomatic_complexity"), Some(2.0));
        assert!(m.flag("has_classes"));
        assert!(!m.flag("documented"));
        assert_eq!(m.number("lines_of_code"), Some(6.0));
    }

    #[test]
    fn test_recommendations_for_syntax_errors() {
        let m = module();
        let issues = m.find_issues("while True\n    pass");
        let recs = m.get_learning_recommendations(&issues, &m.calculate_metrics("x"));
        assert_eq!(recs[0].topic, "Python Syntax Fundamentals");
        let suggestions = m.generate_suggestions("while True\n    pass", &issues);
        assert_eq!(suggestions[0].title, "Fix Critical Syntax Errors");
        assert_eq!(suggestions[0].code_after.as_deref(), Some("while True:"));
    }
}
