//! C and C++ rules.

use lazy_static::lazy_static;

use crate::analysis::table::{critical_fix_suggestion, LanguageRules};
use crate::analysis::Capability;
use crate::detect::source::{
    contains_word, identifiers, is_inside_string_literal, lines, BlockState,
};
use crate::detect::{
    CodeIssue, CodeMetrics, CodeSuggestion, Difficulty, Impact, IssueCategory,
    LearningRecommendation, PatternRule, Requirement, ResourceType, Severity, SuggestionType,
    C_FAMILY_MISSPELLINGS,
};

const MAIN: Requirement = Requirement {
    when_any: &[],
    requires_any: &["main("],
    severity: Severity::Critical,
    message: "Missing main() function - {lang} programs must have a main() function",
    explanation: "Execution of a {lang} program starts at main().",
    suggestion: "Add a main() function",
    example_fix: "int main() {\n    // your code here\n    return 0;\n}",
    tag: "entry_point",
};

const C_REQUIREMENTS: &[Requirement] = &[
    MAIN,
    Requirement {
        when_any: &["printf(", "scanf("],
        requires_any: &["#include <stdio.h>", "#include<stdio.h>"],
        severity: Severity::Critical,
        message: "Missing required header: #include <stdio.h>",
        explanation: "printf and scanf are declared in <stdio.h>.",
        suggestion: "Add '#include <stdio.h>' at the top of the file",
        example_fix: "#include <stdio.h>",
        tag: "missing_header",
    },
];

const CPP_REQUIREMENTS: &[Requirement] = &[
    MAIN,
    Requirement {
        when_any: &["cout", "cin >>", "cin>>"],
        requires_any: &["#include <iostream>", "#include<iostream>"],
        severity: Severity::Critical,
        message: "Missing required header: #include <iostream>",
        explanation: "cout and cin are declared in <iostream>.",
        suggestion: "Add '#include <iostream>' at the top of the file",
        example_fix: "#include <iostream>",
        tag: "missing_header",
    },
    Requirement {
        when_any: &["cout", "cin >>", "cin>>"],
        requires_any: &["std::cout", "std::cin", "using namespace std"],
        severity: Severity::Critical,
        message: "Missing namespace: use 'std::cout' or 'using namespace std;'",
        explanation: "cout and cin live in the std namespace.",
        suggestion: "Qualify the names with std:: or add 'using namespace std;'",
        example_fix: "using namespace std;",
        tag: "namespace",
    },
    Requirement {
        when_any: &["printf("],
        requires_any: &[
            "#include <stdio.h>",
            "#include<stdio.h>",
            "#include <cstdio>",
            "#include<cstdio>",
        ],
        severity: Severity::Critical,
        message: "Missing required header: #include <stdio.h>",
        explanation: "printf is declared in <cstdio>.",
        suggestion: "Add '#include <cstdio>' at the top of the file",
        example_fix: "#include <cstdio>",
        tag: "missing_header",
    },
];

pub static C: LanguageRules = LanguageRules {
    id: "c",
    display_name: "C",
    capability: Capability::Full,
    extensions: &["c", "h"],
    terminator: Some(';'),
    misspellings: C_FAMILY_MISSPELLINGS,
    requirements: C_REQUIREMENTS,
    patterns: patterns,
    file_checks: memory_checks,
    metrics: metrics,
    suggestions: suggestions,
    recommendations: recommendations,
    ..LanguageRules::BASE
};

pub static CPP: LanguageRules = LanguageRules {
    id: "cpp",
    display_name: "C++",
    capability: Capability::Full,
    extensions: &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
    terminator: Some(';'),
    misspellings: C_FAMILY_MISSPELLINGS,
    requirements: CPP_REQUIREMENTS,
    patterns: patterns,
    file_checks: memory_checks,
    metrics: metrics,
    suggestions: suggestions,
    recommendations: recommendations,
    ..LanguageRules::BASE
};

lazy_static! {
    static ref PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            r"\bgets\s*\(",
            IssueCategory::Security,
            Severity::Critical,
            "Use of gets() allows buffer overflows",
        )
        .explain("gets() cannot limit how much it reads and was removed from the C standard.")
        .suggest("Use fgets(buffer, sizeof buffer, stdin)")
        .tag("buffer_overflow"),
        PatternRule::new(
            r"\bstrcpy\s*\(",
            IssueCategory::Security,
            Severity::Medium,
            "strcpy() does not check the destination size",
        )
        .explain("Copying a longer string than the buffer holds corrupts memory.")
        .suggest("Use strncpy or snprintf with the buffer size")
        .tag("buffer_overflow"),
    ];
}

fn patterns() -> &'static [PatternRule] {
    &PATTERNS
}

/// Line and column of the first code-line occurrence of `word`.
fn first_word_position(code: &str, states: &[BlockState], word: &str) -> Option<(usize, usize)> {
    lines(code)
        .zip(states.iter().copied())
        .filter(|(line, state)| state.is_code() && !line.trimmed.starts_with("//"))
        .find_map(|(line, _)| {
            identifiers(line.text)
                .into_iter()
                .find(|(idx, w)| *w == word && !is_inside_string_literal(line.text, *idx))
                .map(|(idx, _)| (line.number, line.column_of(idx)))
        })
}

fn memory_checks(
    rules: &LanguageRules,
    code: &str,
    states: &[BlockState],
    issues: &mut Vec<CodeIssue>,
) {
    if !contains_word(code, "free") {
        if let Some((line, column)) = first_word_position(code, states, "malloc") {
            issues.push(
                CodeIssue::new(
                    IssueCategory::Maintainability,
                    Severity::High,
                    "Memory allocated with malloc() is never freed",
                )
                .explain("Every malloc() needs a matching free(), otherwise the memory leaks.")
                .suggest("Call free() when the memory is no longer needed")
                .fix("free(ptr);")
                .confidence(0.7)
                .at(line, column)
                .tag("memory_leak"),
            );
        }
    }

    if rules.id == "cpp" && !contains_word(code, "delete") {
        if let Some((line, column)) = first_word_position(code, states, "new") {
            issues.push(
                CodeIssue::new(
                    IssueCategory::Maintainability,
                    Severity::Medium,
                    "Object created with new is never deleted",
                )
                .explain("Memory from new must be released with delete or owned by a smart pointer.")
                .suggest("Use std::unique_ptr or std::make_unique instead of raw new")
                .fix("auto ptr = std::make_unique<T>();")
                .confidence(0.7)
                .at(line, column)
                .tag("memory_leak"),
            );
        }
    }
}

fn metrics(code: &str, _: &[BlockState], metrics: &mut CodeMetrics) {
    let includes = lines(code)
        .filter(|line| line.trimmed.starts_with("#include"))
        .count();
    metrics.insert("has_main", code.contains("main("));
    metrics.insert("include_count", includes);
    metrics.insert("documented", code.contains("/**"));
}

fn suggestions(
    rules: &LanguageRules,
    code: &str,
    issues: &[CodeIssue],
    out: &mut Vec<CodeSuggestion>,
) {
    out.extend(critical_fix_suggestion(
        &format!("Fix {} Syntax Errors", rules.display_name),
        "Your code has errors that stop it from compiling. Check semicolons, headers and main().",
        code,
        issues,
    ));

    if rules.id == "cpp" && issues.iter().any(|i| i.has_tag("memory_leak")) {
        out.push(
            CodeSuggestion::new(
                "Use Smart Pointers",
                "std::unique_ptr and std::shared_ptr release memory automatically.",
                SuggestionType::ModernSyntax,
            )
            .before_after(
                "Widget* w = new Widget();",
                "auto w = std::make_unique<Widget>();",
            )
            .impact(Impact::High)
            .difficulty(Difficulty::Medium)
            .priority(7),
        );
    }

    if issues.iter().any(|i| i.has_tag("buffer_overflow")) {
        out.push(
            CodeSuggestion::new(
                "Use Bounded String Functions",
                "Functions that take a buffer size cannot overflow it.",
                SuggestionType::BestPractice,
            )
            .before_after("gets(name);", "fgets(name, sizeof name, stdin);")
            .impact(Impact::High)
            .priority(8),
        );
    }
}

fn recommendations(
    rules: &LanguageRules,
    issues: &[CodeIssue],
    _: &CodeMetrics,
    out: &mut Vec<LearningRecommendation>,
) {
    if issues.iter().any(|i| i.category == IssueCategory::Syntax) {
        out.push(LearningRecommendation::new(
            format!("{} Program Structure", rules.display_name),
            "Learn how headers, main() and statements fit together.",
            ResourceType::Tutorial,
            "1 hour",
            1,
        ));
    }
    if issues.iter().any(|i| i.has_tag("memory_leak")) {
        out.push(LearningRecommendation::new(
            format!("Memory Management in {}", rules.display_name),
            "Understand allocation, ownership and releasing memory.",
            ResourceType::Course,
            "2 hours",
            2,
        ));
    }
    if issues.iter().any(|i| i.has_tag("buffer_overflow")) {
        out.push(LearningRecommendation::new(
            "Secure C Coding",
            "Avoid buffer overflows with bounded input and string functions.",
            ResourceType::Documentation,
            "45 minutes",
            1,
        ));
    }
}
