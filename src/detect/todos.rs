//! Unfinished-work markers (TODO, FIXME, XXX, HACK).
//!
//! Every marker is reported as an informational maintainability issue.
//! Markers without useful context ("TODO: implement this", a bare
//! "FIXME") get a more pointed message than ones that say what is left.

use lazy_static::lazy_static;
use regex::Regex;

use super::source::{is_inside_string_literal, SourceLine};
use super::{CodeIssue, IssueCategory, Severity};

lazy_static! {
    /// Pattern to match TODO/FIXME markers
    static ref TODO_PATTERN: Regex = Regex::new(
        r"\b(TODO|FIXME|XXX|HACK)\b\s*:?\s*(.*)"
    ).unwrap();

    /// Generic placeholder text without technical specifics.
    static ref VAGUE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)^\s*$").unwrap(),
        Regex::new(r"(?i)^\s*(implement|finish|complete|add|write)(\s+(this|here|later|the|code|it))?(\s+(function|method|code|logic|feature|implementation))?\s*$").unwrap(),
        Regex::new(r"(?i)^\s*fix(\s+(this|here|it|later|the|bug|issue|error))?(\s+(bug|issue|error|problem))?\s*$").unwrap(),
        Regex::new(r"(?i)^\s*(do|handle)(\s+(this|something|later|it|error|case))?\s*$").unwrap(),
        Regex::new(r"(?i)^\s*(placeholder|stub|tbd|wip)\s*$").unwrap(),
        Regex::new(r"(?i)^\s*(not\s+implemented(\s+yet)?|needs?\s+(implementation|work))\s*$").unwrap(),
    ];
}

/// Returns true if the text after a marker carries no useful context.
fn is_vague_todo(content: &str) -> bool {
    let trimmed = content.trim();
    VAGUE_PATTERNS.iter().any(|p| p.is_match(trimmed))
}

/// Check a single line for a work marker outside string literals.
pub fn check_todo(line: &SourceLine<'_>) -> Option<CodeIssue> {
    let caps = TODO_PATTERN.captures(line.text)?;
    let whole = caps.get(0)?;
    if is_inside_string_literal(line.text, whole.start()) {
        return None;
    }
    let marker = caps.get(1).map(|m| m.as_str()).unwrap_or("TODO");
    let content = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();

    let (message, suggestion) = if is_vague_todo(content) {
        (
            format!("{} marker without context", marker),
            "Describe what is left to do, or finish the work and remove the marker",
        )
    } else {
        (
            format!("{} marker: {}", marker, content),
            "Track the remaining work and remove the marker once it is done",
        )
    };

    Some(
        CodeIssue::new(IssueCategory::Maintainability, Severity::Info, message)
            .explain("Unfinished work markers indicate code that is not complete yet.")
            .suggest(suggestion)
            .confidence(0.8)
            .at(line.number, line.column_of(whole.start()))
            .tag("todo"),
    )
}
