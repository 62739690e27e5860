//! JavaScript and TypeScript rules. TypeScript shares every JavaScript hook
//! and adds a check for `any`.

use lazy_static::lazy_static;

use crate::analysis::metrics::count_words;
use crate::analysis::table::{critical_fix_suggestion, LanguageRules};
use crate::analysis::Capability;
use crate::detect::source::BlockState;
use crate::detect::{
    CodeIssue, CodeMetrics, CodeSuggestion, Impact, IssueCategory, LearningRecommendation,
    Misspelling, PatternRule, ResourceType, Severity, SuggestionType,
};

const MISSPELLINGS: &[Misspelling] = &[
    Misspelling::exact("consol", "console"),
    Misspelling::exact("conosle", "console"),
    Misspelling::exact("fucntion", "function"),
    Misspelling::exact("funtion", "function"),
    Misspelling::exact("retrun", "return"),
    Misspelling::exact("lenght", "length"),
];

const BLOCKS: &[(&str, &str)] = &[("/*", "*/"), ("`", "`")];

const JAVASCRIPT_RULES: LanguageRules = LanguageRules {
    id: "javascript",
    display_name: "JavaScript",
    capability: Capability::Full,
    extensions: &["js", "jsx", "mjs", "cjs"],
    block_delimiters: BLOCKS,
    terminator: Some(';'),
    misspellings: MISSPELLINGS,
    patterns: js_patterns,
    metrics: metrics,
    suggestions: suggestions,
    recommendations: recommendations,
    ..LanguageRules::BASE
};

pub static JAVASCRIPT: LanguageRules = JAVASCRIPT_RULES;

pub static TYPESCRIPT: LanguageRules = LanguageRules {
    id: "typescript",
    display_name: "TypeScript",
    extensions: &["ts", "tsx", "mts", "cts"],
    patterns: ts_patterns,
    ..JAVASCRIPT_RULES
};

fn js_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new(
            r"\bvar\s+\w",
            IssueCategory::BestPractice,
            Severity::Medium,
            "Use 'let' or 'const' instead of 'var'",
        )
        .explain("'var' is function-scoped and hoisted, which leads to surprising bugs.")
        .suggest("Use 'const' for values that never change and 'let' otherwise")
        .tag("modern_syntax"),
        PatternRule::new(
            r"(?:^|[^=!<>])(?:==|!=)(?:[^=]|$)",
            IssueCategory::BestPractice,
            Severity::Medium,
            "Use strict equality (=== or !==)",
        )
        .explain("'==' converts types before comparing, so 0 == '' is true.")
        .suggest("Use '===' and '!==' to compare without type coercion")
        .tag("equality"),
        PatternRule::new(
            r"\beval\s*\(",
            IssueCategory::Security,
            Severity::Critical,
            "Use of eval() is a security risk",
        )
        .explain("eval() runs arbitrary code and opens the door to injection attacks.")
        .suggest("Use JSON.parse() for data or call functions directly")
        .tag("security"),
        PatternRule::new(
            r"\.innerHTML\s*\+?=\s*[^;]*\+",
            IssueCategory::Security,
            Severity::High,
            "innerHTML built from concatenated strings (XSS risk)",
        )
        .explain("Inserting unescaped values as HTML allows cross-site scripting.")
        .suggest("Use textContent or build elements with document.createElement")
        .tag("xss"),
        PatternRule::new(
            r"\bdocument\.write\s*\(",
            IssueCategory::Security,
            Severity::High,
            "Use of document.write()",
        )
        .explain("document.write() can inject unescaped markup and blocks page rendering.")
        .suggest("Manipulate the DOM with createElement and appendChild")
        .tag("xss"),
        PatternRule::new(
            r"\bconsole\.log\s*\(",
            IssueCategory::BestPractice,
            Severity::Info,
            "console.log() left in code",
        )
        .explain("Debug output should not ship in production code.")
        .suggest("Remove the call or use a logging library")
        .tag("debugging"),
    ]
}

lazy_static! {
    static ref JS_PATTERNS: Vec<PatternRule> = js_rules();
    static ref TS_PATTERNS: Vec<PatternRule> = {
        let mut rules = js_rules();
        rules.push(
            PatternRule::new(
                r":\s*any\b",
                IssueCategory::BestPractice,
                Severity::Low,
                "Avoid the 'any' type",
            )
            .explain("'any' turns off type checking for the value.")
            .suggest("Use a specific type or 'unknown'")
            .tag("typing"),
        );
        rules
    };
}

fn js_patterns() -> &'static [PatternRule] {
    &JS_PATTERNS
}

fn ts_patterns() -> &'static [PatternRule] {
    &TS_PATTERNS
}

fn metrics(code: &str, states: &[BlockState], metrics: &mut CodeMetrics) {
    let functions = count_words(code, &["function"], states) + code.matches("=>").count();
    metrics.insert("function_count", functions);
    metrics.insert("class_count", count_words(code, &["class"], states));
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
        "Your code has syntax errors. Check semicolons, brackets and quotes.",
        code,
        issues,
    ));

    if issues.iter().any(|i| i.has_tag("modern_syntax")) {
        out.push(
            CodeSuggestion::new(
                "Use let/const Instead of var",
                "Block-scoped declarations make variable lifetimes obvious.",
                SuggestionType::ModernSyntax,
            )
            .before_after("var count = 0;", "let count = 0;")
            .impact(Impact::Medium)
            .priority(7),
        );
    }

    if issues.iter().any(|i| i.has_tag("equality")) {
        out.push(
            CodeSuggestion::new(
                "Use Strict Equality",
                "Strict comparison avoids implicit type conversion.",
                SuggestionType::BestPractice,
            )
            .before_after("if (value == null)", "if (value === null)")
            .priority(6),
        );
    }

    if code.contains("function(") || code.contains("function (") {
        out.push(
            CodeSuggestion::new(
                "Use Arrow Functions",
                "Arrow functions are shorter and keep the surrounding 'this'.",
                SuggestionType::ModernSyntax,
            )
            .before_after(
                "items.map(function(x) { return x * 2; });",
                "items.map((x) => x * 2);",
            )
            .impact(Impact::Low)
            .priority(4),
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
            format!("{} Syntax Fundamentals", rules.display_name),
            "Review statements, blocks and string literals.",
            ResourceType::Tutorial,
            "1 hour",
            1,
        ));
    }
    if issues.iter().any(|i| i.category == IssueCategory::Security) {
        out.push(LearningRecommendation::new(
            "Web Security Basics",
            "Learn how eval() and unescaped HTML lead to injection and XSS.",
            ResourceType::Documentation,
            "45 minutes",
            1,
        ));
    }
    if issues
        .iter()
        .any(|i| i.has_tag("modern_syntax") || i.has_tag("equality"))
    {
        out.push(LearningRecommendation::new(
            "Modern JavaScript ES6+ Features",
            "let/const, arrow functions and strict equality make code safer and clearer.",
            ResourceType::Tutorial,
            "45 minutes",
            2,
        ));
    }
    if issues.iter().any(|i| i.has_tag("typing")) {
        out.push(LearningRecommendation::new(
            "TypeScript Type System",
            "Precise types catch mistakes that 'any' hides.",
            ResourceType::Documentation,
            "1 hour",
            3,
        ));
    }
}
