//! Statement-shape checks: missing terminators and missing block colons.

use super::source::{
    find_top_level, first_word, open_bracket_balance, strip_line_comment, SourceLine,
};
use super::{CodeIssue, IssueCategory, Severity};

/// Lines ending with one of these never need a terminator.
const CONTINUATION_ENDINGS: &[&str] = &[
    "{", "}", ":", ",", ";", "(", "[", "\\", "+", "=", "&&", "||", "=>", "->", ".", "?",
];

/// Lines starting with one of these words are headers or declarations.
const HEADER_KEYWORDS: &[&str] = &[
    "if", "for", "while", "else", "switch", "case", "default", "do", "try", "catch",
    "finally", "class", "interface", "enum", "struct", "public", "private", "protected",
    "import", "package", "using", "namespace", "template", "export",
];

/// Lines starting with one of these continue an expression from the previous line.
const CONTINUATION_STARTS: &[&str] = &[".", "?", ":", "&&", "||", "+", "}", ")", "@", "#"];

/// Output calls that mark a line as a statement.
const OUTPUT_CALLS: &[&str] = &[
    "print",
    "cout",
    "System.out",
    "console.log",
    "echo",
    "printf",
    "Console.Write",
];

fn is_statement(code: &str) -> bool {
    code.contains('=')
        || super::source::contains_word(code, "return")
        || OUTPUT_CALLS.iter().any(|c| code.contains(c))
}

/// Flag a statement line that does not end with `terminator`.
///
/// Returns `None` for lines that are headers, declarations, continuations
/// or that do not look like a statement.
pub fn check_terminator(
    line: &SourceLine<'_>,
    terminator: char,
    line_comment: &str,
    display_name: &str,
) -> Option<CodeIssue> {
    let code = strip_line_comment(line.text, line_comment).trim_end();
    let trimmed = code.trim_start();
    if trimmed.is_empty() || trimmed.ends_with(terminator) {
        return None;
    }
    if CONTINUATION_ENDINGS.iter().any(|e| trimmed.ends_with(e))
        || CONTINUATION_STARTS.iter().any(|s| trimmed.starts_with(s))
        || HEADER_KEYWORDS.contains(&first_word(trimmed))
    {
        return None;
    }
    if !is_statement(trimmed) {
        return None;
    }

    Some(
        CodeIssue::new(
            IssueCategory::Syntax,
            Severity::Critical,
            "Missing semicolon at end of statement",
        )
        .explain(format!(
            "In {}, statements must end with a semicolon '{}'",
            display_name, terminator
        ))
        .suggest(format!("Add '{}' at the end of the line", terminator))
        .fix(format!("{}{}", trimmed, terminator))
        .at(line.number, line.end_column(code))
        .tag("missing_semicolon"),
    )
}

/// Python keywords that open an indented block.
pub const BLOCK_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "def", "class", "try", "except", "finally", "with",
    "async",
];

/// Whether a trimmed line starts with a block-opening keyword.
pub fn opens_block(trimmed: &str) -> bool {
    let word = first_word(trimmed);
    if !BLOCK_KEYWORDS.contains(&word) {
        return false;
    }
    // `async` only opens a block in front of def/for/with.
    if word == "async" {
        let rest = trimmed[word.len()..].trim_start();
        return matches!(first_word(rest), "def" | "for" | "with");
    }
    // A keyword used as a name (`if_count = 1`) is not a header.
    let rest = &trimmed[word.len()..];
    !rest.trim_start().starts_with('=') || rest.trim_start().starts_with("==")
}

/// Flag a block header that does not end with `:`.
pub fn check_block_colon(line: &SourceLine<'_>) -> Option<CodeIssue> {
    let code = strip_line_comment(line.text, "#").trim_end();
    let trimmed = code.trim_start();
    if !opens_block(trimmed) || trimmed.ends_with(':') {
        return None;
    }
    // Continuation lines and one-line bodies (`if x: return`) are fine.
    if trimmed.ends_with('\\')
        || trimmed.ends_with(',')
        || open_bracket_balance(trimmed) > 0
        || find_top_level(trimmed, ':').is_some()
    {
        return None;
    }

    Some(
        CodeIssue::new(
            IssueCategory::Syntax,
            Severity::Critical,
            "Missing colon ':' at end of statement",
        )
        .explain("Python control structures must end with ':'")
        .suggest("Add ':' at the end of the line")
        .fix(format!("{}:", trimmed))
        .at(line.number, line.end_column(code))
        .tag("missing_colon"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::source::lines;

    fn first(code: &str) -> SourceLine<'_> {
        lines(code).next().unwrap()
    }

    #[test]
    fn test_missing_semicolon() {
        let line = first("    int x = 5");
        let issue = check_terminator(&line, ';', "//", "C").unwrap();
        assert_eq!(issue.message, "Missing semicolon at end of statement");
        assert_eq!(issue.example_fix.as_deref(), Some("int x = 5;"));
        assert_eq!(issue.location(), Some((1, 14)));
    }

    #[test]
    fn test_terminator_skips_headers_and_blocks() {
        for code in [
            "if (x == 1)",
            "for (int i = 0; i < n; i++)",
            "int main() {",
            "}",
            "return x; // done",
            "public static int x = 5",
            "    .map(x => x * 2)",
            "int total =",
            "foo()",
        ] {
            assert!(
                check_terminator(&first(code), ';', "//", "C").is_none(),
                "unexpected issue for {:?}",
                code
            );
        }
    }

    #[test]
    fn test_terminator_flags_output_calls() {
        let line = first("System.out.println(\"Hello World\")");
        assert!(check_terminator(&line, ';', "//", "Java").is_some());
        let line = first("return total // trailing");
        let issue = check_terminator(&line, ';', "//", "Java").unwrap();
        assert_eq!(issue.example_fix.as_deref(), Some("return total;"));
    }

    #[test]
    fn test_missing_colon() {
        let issue = check_block_colon(&first("if x == 1")).unwrap();
        assert_eq!(issue.severity, Severity::Critical);
        assert!(issue.message.starts_with("Missing colon"));
        assert_eq!(issue.location(), Some((1, 10)));
    }

    #[test]
    fn test_colon_check_skips_valid_forms() {
        for code in [
            "if x == 1:",
            "if x: return 1",
            "def f(a,",
            "else:  # done",
            "format(x)",
            "iffy = 3",
            "if_count = 1",
            "x = a if b else c",
        ] {
            assert!(
                check_block_colon(&first(code)).is_none(),
                "unexpected issue for {:?}",
                code
            );
        }
    }

    #[test]
    fn test_colon_check_flags_keywords() {
        assert!(check_block_colon(&first("else")).is_some());
        assert!(check_block_colon(&first("def f(x)")).is_some());
        assert!(check_block_colon(&first("async def f()")).is_some());
        assert!(check_block_colon(&first("while True  # loop")).is_some());
    }
}
