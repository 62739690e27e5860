//! Common misspellings of keywords and library names.

use super::source::{identifiers, is_inside_string_literal, SourceLine};
use super::{CodeIssue, IssueCategory, Severity};

/// One entry of a language's misspelling table.
#[derive(Debug, Clone, Copy)]
pub struct Misspelling {
    /// The wrong spelling, lower-case unless `case_sensitive`.
    pub wrong: &'static str,
    pub right: &'static str,
    /// Match `wrong` exactly instead of case-insensitively.
    pub case_sensitive: bool,
}

impl Misspelling {
    pub const fn new(wrong: &'static str, right: &'static str) -> Self {
        Self {
            wrong,
            right,
            case_sensitive: false,
        }
    }

    pub const fn exact(wrong: &'static str, right: &'static str) -> Self {
        Self {
            wrong,
            right,
            case_sensitive: true,
        }
    }

    fn matches(&self, word: &str) -> bool {
        if self.case_sensitive {
            word == self.wrong
        } else {
            word.eq_ignore_ascii_case(self.wrong)
        }
    }
}

/// Table shared by the C-family languages.
pub const C_FAMILY: &[Misspelling] = &[
    Misspelling::new("sytem", "System"),
    Misspelling::new("systm", "System"),
    Misspelling::new("sistem", "System"),
    Misspelling::new("printlm", "println"),
    Misspelling::new("printn", "println"),
    Misspelling::new("pritln", "println"),
    Misspelling::new("inlcude", "include"),
    Misspelling::new("inclde", "include"),
    Misspelling::new("retrun", "return"),
    Misspelling::new("reutrn", "return"),
];

/// Report every identifier on the line that matches the table.
///
/// Words inside string literals are ignored.
pub fn check_misspellings(
    line: &SourceLine<'_>,
    table: &[Misspelling],
    display_name: &str,
) -> Vec<CodeIssue> {
    let mut issues = Vec::new();
    if table.is_empty() {
        return issues;
    }

    for (offset, word) in identifiers(line.text) {
        let Some(entry) = table.iter().find(|m| m.matches(word)) else {
            continue;
        };
        if is_inside_string_literal(line.text, offset) {
            continue;
        }
        let fixed = format!(
            "{}{}{}",
            &line.text[..offset],
            entry.right,
            &line.text[offset + word.len()..]
        );
        issues.push(
            CodeIssue::new(
                IssueCategory::Syntax,
                Severity::Critical,
                format!("Misspelled: '{}' should be '{}'", word, entry.right),
            )
            .explain(format!("Common spelling mistake in {}.", display_name))
            .suggest(format!("Change '{}' to '{}'", word, entry.right))
            .fix(fixed.trim())
            .at(line.number, line.column_of(offset))
            .tag("misspelling"),
        );
    }

    issues
}
