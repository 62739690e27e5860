//! Punctuation and quote balance checks.
//!
//! Every check is local to one line: a bracket opened on one line and
//! closed on the next is reported on both, which keeps each finding next
//! to the text that caused it.

use super::source::{block_states, lines, SourceLine};
use super::{CodeIssue, IssueCategory, Severity};

/// Per-language knobs for the balance checks.
#[derive(Debug, Clone, Copy)]
pub struct BalanceOptions<'a> {
    /// Lines starting with one of these are not checked.
    pub skip_prefixes: &'a [&'a str],
    /// Inline comment marker; text after it is ignored.
    pub line_comment: &'a str,
    /// Whether `'` delimits strings and is checked for balance.
    pub single_quotes: bool,
    /// Multi-line comment or string delimiters; spanned lines are skipped.
    pub block_delimiters: &'a [(&'a str, &'a str)],
}

/// Skip set used when nothing is known about the language.
pub const GENERIC_SKIP_PREFIXES: &[&str] = &["//", "#", "/*", "*", "\"", "'"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Paren,
    Bracket,
    Brace,
}

const KINDS: [Kind; 3] = [Kind::Paren, Kind::Bracket, Kind::Brace];

impl Kind {
    fn index(self) -> usize {
        match self {
            Kind::Paren => 0,
            Kind::Bracket => 1,
            Kind::Brace => 2,
        }
    }

    fn of(ch: char) -> Option<(Kind, bool)> {
        match ch {
            '(' => Some((Kind::Paren, true)),
            ')' => Some((Kind::Paren, false)),
            '[' => Some((Kind::Bracket, true)),
            ']' => Some((Kind::Bracket, false)),
            '{' => Some((Kind::Brace, true)),
            '}' => Some((Kind::Brace, false)),
            _ => None,
        }
    }
}

/// Result of scanning one line outside of string literals.
#[derive(Debug, Default)]
struct LineScan {
    /// (kind, is_open, 1-based column) in order of appearance.
    tokens: Vec<(Kind, bool, usize)>,
    opens: [usize; 3],
    closes: [usize; 3],
    /// Quote character and column of a string left open at end of line.
    unterminated: Option<(char, usize)>,
}

fn scan_line(text: &str, opts: &BalanceOptions<'_>) -> LineScan {
    let mut scan = LineScan::default();
    let mut quote: Option<(char, usize)> = None;
    let mut escaped = false;

    for (col0, (idx, ch)) in text.char_indices().enumerate() {
        let col = col0 + 1;
        if let Some((q, _)) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        if !opts.line_comment.is_empty() && text[idx..].starts_with(opts.line_comment) {
            break;
        }
        match ch {
            '"' | '`' => quote = Some((ch, col)),
            '\'' if opts.single_quotes => quote = Some((ch, col)),
            _ => {
                if let Some((kind, open)) = Kind::of(ch) {
                    scan.tokens.push((kind, open, col));
                    if open {
                        scan.opens[kind.index()] += 1;
                    } else {
                        scan.closes[kind.index()] += 1;
                    }
                }
            }
        }
    }

    scan.unterminated = quote;
    scan
}

fn count_unescaped(text: &str, quote: char) -> usize {
    let mut count = 0;
    let mut prev_backslash = false;
    for ch in text.chars() {
        if ch == quote && !prev_backslash {
            count += 1;
        }
        prev_backslash = ch == '\\' && !prev_backslash;
    }
    count
}

fn make_issue(kind: Kind, open: bool, line: usize, column: usize, opens: usize, closes: usize) -> CodeIssue {
    let issue = match (kind, open) {
        (Kind::Paren, true) => CodeIssue::new(
            IssueCategory::Syntax,
            Severity::Critical,
            format!(
                "Missing closing parenthesis ')' - {} opening but {} closing",
                opens, closes
            ),
        )
        .explain("Every opening parenthesis must have a matching closing parenthesis.")
        .suggest("Add ')' to close the parenthesis"),
        (Kind::Paren, false) => CodeIssue::new(
            IssueCategory::Syntax,
            Severity::Critical,
            format!(
                "Extra closing parenthesis ')' - {} closing but {} opening",
                closes, opens
            ),
        )
        .explain("Every closing parenthesis must match an opening parenthesis.")
        .suggest("Remove the extra ')' or add the missing '('"),
        (Kind::Bracket, _) => CodeIssue::new(
            IssueCategory::Syntax,
            Severity::Critical,
            format!("Mismatched brackets - {} '[' but {} ']'", opens, closes),
        )
        .explain("Square brackets must be balanced.")
        .suggest("Add or remove brackets to balance them"),
        (Kind::Brace, _) => CodeIssue::new(
            IssueCategory::Syntax,
            Severity::High,
            format!("Mismatched braces - {} '{{' but {} '}}'", opens, closes),
        )
        .explain("Curly braces must be balanced.")
        .suggest("Add or remove braces to balance them"),
    };
    issue.at(line, column).tag("balance")
}

fn quote_issue(quote: char, line: &SourceLine<'_>, column: usize) -> CodeIssue {
    let (name, fix) = if quote == '"' {
        ("double", "Add missing \" to complete the string")
    } else {
        ("single", "Add missing ' to complete the string")
    };
    CodeIssue::new(
        IssueCategory::Syntax,
        Severity::Critical,
        format!("Mismatched {} quotes - missing opening or closing quote", name),
    )
    .explain("String literals need matching quotes.")
    .suggest(fix)
    .fix(format!("{}{}", line.trimmed, quote))
    .at(line.number, column)
    .tags(["balance", "string_literal"])
}

/// Column of the first bracket of `kind` on the line that has no partner
/// on the same line: the first stray closer when closers outnumber openers,
/// otherwise the first opener left unmatched.
fn first_offender(tokens: &[(Kind, bool, usize)], kind: Kind, extra_closers: bool) -> usize {
    let mut open_cols: Vec<usize> = Vec::new();
    let mut stray_closer = None;
    for &(_, open, col) in tokens.iter().filter(|t| t.0 == kind) {
        if open {
            open_cols.push(col);
        } else if open_cols.pop().is_none() && stray_closer.is_none() {
            stray_closer = Some(col);
        }
    }
    let candidate = if extra_closers {
        stray_closer
    } else {
        open_cols.first().copied()
    };
    candidate.unwrap_or(1)
}

/// Check bracket and quote balance line by line.
///
/// Each line is judged on its own counts, taken outside string literals.
/// A line whose counts differ gets exactly one issue per bracket kind.
/// Issues come back ordered by line; within a line, parentheses, brackets,
/// braces and then quotes.
pub fn check_balance(code: &str, opts: &BalanceOptions<'_>) -> Vec<CodeIssue> {
    let mut issues = Vec::new();
    let states = block_states(code, opts.block_delimiters);

    for (line, state) in lines(code).zip(states) {
        if !state.is_code() || line.is_blank() || line.starts_with_any(opts.skip_prefixes) {
            continue;
        }
        let scan = scan_line(line.text, opts);

        for kind in KINDS {
            let k = kind.index();
            let (opens, closes) = (scan.opens[k], scan.closes[k]);
            if opens == closes {
                continue;
            }
            let open = opens > closes;
            let column = first_offender(&scan.tokens, kind, !open);
            issues.push(make_issue(kind, open, line.number, column, opens, closes));
        }

        if line.trimmed.contains("\"\"\"") || line.trimmed.contains("'''") {
            continue;
        }
        if let Some((quote, col)) = scan.unterminated {
            let checked = quote == '"' || (quote == '\'' && opts.single_quotes);
            if checked && count_unescaped(line.text, quote) % 2 == 1 {
                issues.push(quote_issue(quote, &line, col));
            }
        }
    }

    issues
}
