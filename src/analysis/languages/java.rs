//! Java rules.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::metrics::count_words;
use crate::analysis::table::{critical_fix_suggestion, LanguageRules};
use crate::analysis::Capability;
use crate::detect::source::{contains_word, lines, BlockState};
use crate::detect::{
    CodeIssue, CodeMetrics, CodeSuggestion, Difficulty, Impact, IssueCategory,
    LearningRecommendation, Misspelling, PatternRule, Requirement, ResourceType, Severity,
    SuggestionType,
};

const MISSPELLINGS: &[Misspelling] = &[
    Misspelling::new("sytem", "System"),
    Misspelling::new("systm", "System"),
    Misspelling::new("sistem", "System"),
    Misspelling::new("systme", "System"),
    Misspelling::new("printlm", "println"),
    Misspelling::new("printn", "println"),
    Misspelling::new("pritln", "println"),
    Misspelling::new("prntln", "println"),
    Misspelling::new("printline", "println"),
    Misspelling::exact("printIn", "println"),
    Misspelling::new("retrun", "return"),
    Misspelling::new("reutrn", "return"),
];

const REQUIREMENTS: &[Requirement] = &[
    Requirement {
        when_any: &[],
        requires_any: &["class ", "interface ", "enum ", "record "],
        severity: Severity::Critical,
        message: "Missing class declaration - All Java code must be inside a class",
        explanation: "Java is object-oriented: every method and statement lives inside a class.",
        suggestion: "Wrap your code in a class declaration",
        example_fix: "public class Main {\n    // your code here\n}",
        tag: "class_declaration",
    },
    Requirement {
        when_any: &[],
        requires_any: &["static void main"],
        severity: Severity::Critical,
        message: "Missing main method - Java programs must have a main method",
        explanation: "The JVM starts a program by calling public static void main(String[] args).",
        suggestion: "Add a main method to your class",
        example_fix: "public static void main(String[] args) {\n    // your code here\n}",
        tag: "entry_point",
    },
];

pub static JAVA: LanguageRules = LanguageRules {
    id: "java",
    display_name: "Java",
    capability: Capability::Full,
    extensions: &["java"],
    terminator: Some(';'),
    misspellings: MISSPELLINGS,
    requirements: REQUIREMENTS,
    patterns: patterns,
    file_checks: file_checks,
    metrics: metrics,
    suggestions: suggestions,
    recommendations: recommendations,
    ..LanguageRules::BASE
};

lazy_static! {
    static ref PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            r"\bsystem\.out\b",
            IssueCategory::Syntax,
            Severity::Critical,
            "Java is case-sensitive: 'system' should be 'System'",
        )
        .explain("Java class names are case-sensitive; the class is called System with a capital S.")
        .suggest("Write 'System.out' with a capital S")
        .tag("case_sensitivity"),
        PatternRule::new(
            r"\bSystem\.out\.print(?:ln|f)?\s+[^\s(]",
            IssueCategory::Syntax,
            Severity::Critical,
            "Missing parentheses in method call",
        )
        .explain("Method arguments must be enclosed in parentheses.")
        .suggest("Call the method with parentheses: System.out.println(...)")
        .tag("method_call"),
        PatternRule::new(
            r"\.print(?:ln)?\(\s*[A-Za-z]\w*(?:\s+[A-Za-z]\w*)+\s*\)",
            IssueCategory::Syntax,
            Severity::Critical,
            "String literals must be enclosed in quotes",
        )
        .explain("Text without quotes is read as variable names, which do not exist.")
        .suggest("Put the text in double quotes: \"Hello World\"")
        .tag("string_literal"),
        PatternRule::new(
            r#"\.print(?:ln)?\(\s*[A-Za-z][^"()]*"\s*\)"#,
            IssueCategory::Syntax,
            Severity::Critical,
            "Missing opening quote",
        )
        .explain("A string literal needs a double quote at both ends.")
        .suggest("Add the opening double quote")
        .tag("string_literal"),
        PatternRule::new(
            r"\bcatch\s*\([^)]*\)\s*\{\s*\}",
            IssueCategory::BestPractice,
            Severity::Medium,
            "Empty catch block",
        )
        .explain("Swallowing an exception hides failures.")
        .suggest("Log the exception or handle it")
        .tag("error_handling"),
    ];

    static ref METHOD_DECL: Regex = Regex::new(
        r"^\s*(?:(?:public|private|protected|static|final|abstract|synchronized)\s+)+[\w<>\[\], ]+\s+\w+\s*\([^;=]*$"
    ).unwrap();
}

fn patterns() -> &'static [PatternRule] {
    &PATTERNS
}

const IO_CALLS: &[&str] = &[
    "new FileReader",
    "new FileWriter",
    "new FileInputStream",
    "new FileOutputStream",
    "Files.read",
    "Files.write",
    "new Scanner(new File",
];

fn file_checks(_: &LanguageRules, code: &str, states: &[BlockState], issues: &mut Vec<CodeIssue>) {
    if contains_word(code, "try") || contains_word(code, "throws") {
        return;
    }
    let hit = lines(code)
        .zip(states.iter().copied())
        .filter(|(_, state)| state.is_code())
        .find_map(|(line, _)| {
            IO_CALLS
                .iter()
                .find_map(|call| line.text.find(call))
                .map(|idx| (line.number, line.column_of(idx)))
        });
    if let Some((line, column)) = hit {
        issues.push(
            CodeIssue::new(
                IssueCategory::BestPractice,
                Severity::Low,
                "File I/O without exception handling",
            )
            .explain("File operations throw IOException, which Java requires you to catch or declare.")
            .suggest("Wrap the I/O in try-with-resources or declare 'throws IOException'")
            .fix("try (BufferedReader reader = new BufferedReader(new FileReader(path))) {\n    // read\n}")
            .confidence(0.7)
            .at(line, column)
            .tag("error_handling"),
        );
    }
}

fn metrics(code: &str, states: &[BlockState], metrics: &mut CodeMetrics) {
    let methods = lines(code)
        .zip(states.iter().copied())
        .filter(|(line, state)| {
            state.is_code() && !line.text.contains(" class ") && METHOD_DECL.is_match(line.text)
        })
        .count();

    metrics.insert("has_main_method", code.contains("static void main"));
    metrics.insert("has_class", count_words(code, &["class"], states) > 0);
    metrics.insert("system_out_calls", code.matches("System.out.").count());
    metrics.insert("method_count", methods);
    metrics.insert("documented", code.contains("/**"));
}

fn suggestions(
    _: &LanguageRules,
    code: &str,
    issues: &[CodeIssue],
    out: &mut Vec<CodeSuggestion>,
) {
    out.extend(critical_fix_suggestion(
        "Fix Java Syntax Errors",
        "Your code has syntax errors. Java is strict about semicolons, capitalization and quotes.",
        code,
        issues,
    ));

    if issues.iter().any(|i| i.has_tag("class_declaration")) {
        out.push(
            CodeSuggestion::new(
                "Use Proper Java Class Structure",
                "Every Java program needs a class with a main method as its entry point.",
                SuggestionType::BestPractice,
            )
            .before_after(
                "System.out.println(\"Hello World\");",
                "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello World\");\n    }\n}",
            )
            .impact(Impact::High)
            .priority(8),
        );
    }

    let concatenates_in_loop = code.contains("for") && code.contains("+= \"");
    if concatenates_in_loop {
        out.push(
            CodeSuggestion::new(
                "Use StringBuilder for String Building",
                "Strings are immutable; building one in a loop with += creates a new object every time.",
                SuggestionType::Optimization,
            )
            .before_after(
                "result += \"x\";",
                "StringBuilder sb = new StringBuilder();\nsb.append(\"x\");",
            )
            .difficulty(Difficulty::Medium)
            .priority(5),
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
            "Java Syntax Basics",
            "Review semicolons, braces and how statements are written in Java.",
            ResourceType::Tutorial,
            "30 minutes",
            1,
        ));
    }
    if issues.iter().any(|i| i.has_tag("case_sensitivity")) {
        out.push(LearningRecommendation::new(
            "Java Case Sensitivity",
            "Java treats 'System' and 'system' as different names.",
            ResourceType::Tutorial,
            "15 minutes",
            1,
        ));
    }
    if issues.iter().any(|i| i.has_tag("structure")) {
        out.push(LearningRecommendation::new(
            "Java Classes and Objects",
            "Understand how classes and the main method organize a Java program.",
            ResourceType::Course,
            "1 hour",
            2,
        ));
    }
}
