//! Provider vocabulary to canonical issue vocabulary.

use phf::phf_map;

use super::{Enrichment, EnrichmentOutcome, RawIssue, DEFAULT_MODEL_CONFIDENCE, MODEL_TAG};
use crate::detect::{CodeIssue, CodeSuggestion, IssueCategory, Severity, SuggestionType};

static SEVERITIES: phf::Map<&'static str, Severity> = phf_map! {
    "critical" => Severity::Critical,
    "fatal" => Severity::Critical,
    "blocker" => Severity::Critical,
    "high" => Severity::High,
    "error" => Severity::High,
    "major" => Severity::High,
    "medium" => Severity::Medium,
    "moderate" => Severity::Medium,
    "warning" => Severity::Medium,
    "low" => Severity::Low,
    "minor" => Severity::Low,
    "info" => Severity::Info,
    "information" => Severity::Info,
    "hint" => Severity::Info,
    "note" => Severity::Info,
};

static CATEGORIES: phf::Map<&'static str, IssueCategory> = phf_map! {
    "syntax" => IssueCategory::Syntax,
    "missing_element" => IssueCategory::Syntax,
    "logic" => IssueCategory::Logic,
    "bug" => IssueCategory::Logic,
    "completeness" => IssueCategory::Logic,
    "performance" => IssueCategory::Performance,
    "efficiency" => IssueCategory::Performance,
    "security" => IssueCategory::Security,
    "vulnerability" => IssueCategory::Security,
    "style" => IssueCategory::Style,
    "readability" => IssueCategory::Style,
    "formatting" => IssueCategory::Style,
    "maintainability" => IssueCategory::Maintainability,
    "design" => IssueCategory::Maintainability,
    "best_practice" => IssueCategory::BestPractice,
    "code_quality" => IssueCategory::BestPractice,
    "code_smell" => IssueCategory::CodeSmell,
};

fn vocabulary_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

/// Map a provider severity. Unknown or missing severities become MEDIUM.
pub fn map_severity(raw: Option<&str>) -> Severity {
    raw.and_then(|s| SEVERITIES.get(vocabulary_key(s).as_str()).copied())
        .unwrap_or(Severity::Medium)
}

/// Map a provider category. Unknown or missing categories become `code_smell`.
pub fn map_category(raw: Option<&str>) -> IssueCategory {
    raw.and_then(|s| CATEGORIES.get(vocabulary_key(s).as_str()).copied())
        .unwrap_or(IssueCategory::CodeSmell)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Convert one raw issue into a tagged [`CodeIssue`].
pub fn map_issue(raw: &RawIssue) -> CodeIssue {
    let message = non_empty(&raw.message).unwrap_or("Issue reported by model");
    let confidence = raw
        .confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_MODEL_CONFIDENCE);

    let mut issue = CodeIssue::new(
        map_category(raw.category.as_deref()),
        map_severity(raw.severity.as_deref()),
        message,
    )
    .explain(non_empty(&raw.explanation).unwrap_or_default())
    .suggest(non_empty(&raw.suggestion).unwrap_or_default())
    .confidence(confidence)
    .tag(MODEL_TAG);

    if let Some(fix) = non_empty(&raw.example_fix) {
        issue = issue.fix(fix);
    }
    // A column without a line cannot be placed; a line without a column
    // points at the start of the line.
    if let Some(line) = raw.line {
        issue = issue.at(line, raw.column.unwrap_or(1));
    }
    issue
}

/// Suggestions for enrichment issues that say what to do.
pub fn suggestions_from(issues: &[CodeIssue]) -> Vec<CodeSuggestion> {
    issues
        .iter()
        .filter(|i| !i.suggestion.is_empty())
        .map(|i| {
            let kind = if i.example_fix.is_some() {
                SuggestionType::QuickFix
            } else {
                SuggestionType::BestPractice
            };
            let priority = match i.severity {
                Severity::Critical => 8,
                Severity::High => 6,
                Severity::Medium => 4,
                Severity::Low => 2,
                Severity::Info => 1,
            };
            let mut suggestion = CodeSuggestion::new(&i.message, &i.suggestion, kind).priority(priority);
            if let Some(fix) = &i.example_fix {
                suggestion.code_after = Some(fix.clone());
            }
            suggestion
        })
        .collect()
}

/// Map a whole provider response.
pub fn map_enrichment(raw: Enrichment) -> EnrichmentOutcome {
    let issues: Vec<CodeIssue> = raw.issues.iter().map(map_issue).collect();
    let suggestions = suggestions_from(&issues);
    let confidence = if raw.confidence.is_finite() {
        raw.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    EnrichmentOutcome {
        issues,
        suggestions,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_vocabulary() {
        assert_eq!(map_severity(Some("CRITICAL")), Severity::Critical);
        assert_eq!(map_severity(Some("warning")), Severity::Medium);
        assert_eq!(map_severity(Some("error")), Severity::High);
        assert_eq!(map_severity(Some("whatever")), Severity::Medium);
        assert_eq!(map_severity(None), Severity::Medium);
    }

    #[test]
    fn test_category_vocabulary() {
        assert_eq!(map_category(Some("missing_element")), IssueCategory::Syntax);
        assert_eq!(map_category(Some("Best Practice")), IssueCategory::BestPractice);
        assert_eq!(map_category(Some("code-quality")), IssueCategory::BestPractice);
        assert_eq!(map_category(Some("completeness")), IssueCategory::Logic);
        assert_eq!(map_category(Some("naming")), IssueCategory::CodeSmell);
        assert_eq!(map_category(None), IssueCategory::CodeSmell);
    }

    #[test]
    fn test_map_issue() {
        let raw = RawIssue {
            severity: Some("low".to_string()),
            line: Some(4),
            message: Some("Unused variable".to_string()),
            suggestion: Some("Remove it".to_string()),
            confidence: Some(1.7),
            ..Default::default()
        };
        let issue = map_issue(&raw);
        assert_eq!(issue.location(), Some((4, 1)));
        assert_eq!(issue.confidence, 1.0);
        assert!(issue.has_tag(MODEL_TAG));

        let issue = map_issue(&RawIssue {
            column: Some(3),
            ..Default::default()
        });
        assert_eq!(issue.location(), None);
        assert_eq!(issue.message, "Issue reported by model");
        assert_eq!(issue.confidence, DEFAULT_MODEL_CONFIDENCE);
    }

    #[test]
    fn test_suggestions_only_for_actionable_issues() {
        let outcome = map_enrichment(Enrichment {
            issues: vec![
                RawIssue {
                    severity: Some("high".to_string()),
                    message: Some("SQL injection".to_string()),
                    suggestion: Some("Use parameters".to_string()),
                    ..Default::default()
                },
                RawIssue {
                    message: Some("Odd naming".to_string()),
                    ..Default::default()
                },
            ],
            confidence: 0.9,
        });
        assert_eq!(outcome.issues.len(), 2);
        assert_eq!(outcome.suggestions.len(), 1);
        assert_eq!(outcome.suggestions[0].title, "SQL injection");
        assert_eq!(outcome.suggestions[0].priority, 6);
    }
}
