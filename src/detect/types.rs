//! Core value types shared by every analysis component.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Severity levels for issues.
///
/// Declaration order is significant: `Critical` sorts first and carries the
/// largest score deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Primary grouping of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Syntax,
    Logic,
    Performance,
    Security,
    Style,
    Maintainability,
    BestPractice,
    CodeSmell,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Syntax => "syntax",
            IssueCategory::Logic => "logic",
            IssueCategory::Performance => "performance",
            IssueCategory::Security => "security",
            IssueCategory::Style => "style",
            IssueCategory::Maintainability => "maintainability",
            IssueCategory::BestPractice => "best_practice",
            IssueCategory::CodeSmell => "code_smell",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence assigned to heuristic findings unless a check says otherwise.
pub const DEFAULT_CONFIDENCE: f64 = 0.9;

/// A single detected issue.
///
/// `line` and `column` are either both set (1-based) or both absent for
/// file-level findings. Use [`CodeIssue::at`] to set them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeIssue {
    pub category: IssueCategory,
    pub severity: Severity,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: String,
    pub detailed_explanation: String,
    pub suggestion: String,
    pub example_fix: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl CodeIssue {
    /// Create a file-level issue with default confidence and an empty tag set.
    pub fn new(category: IssueCategory, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            line: None,
            column: None,
            message: message.into(),
            detailed_explanation: String::new(),
            suggestion: String::new(),
            example_fix: None,
            confidence: DEFAULT_CONFIDENCE,
            tags: BTreeSet::new(),
        }
    }

    /// Pin the issue to a position. Zero values are raised to 1.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line.max(1));
        self.column = Some(column.max(1));
        self
    }

    pub fn explain(mut self, text: impl Into<String>) -> Self {
        self.detailed_explanation = text.into();
        self
    }

    pub fn suggest(mut self, text: impl Into<String>) -> Self {
        self.suggestion = text.into();
        self
    }

    pub fn fix(mut self, example: impl Into<String>) -> Self {
        self.example_fix = Some(example.into());
        self
    }

    pub fn confidence(mut self, value: f64) -> Self {
        self.confidence = value.clamp(0.0, 1.0);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// The (line, column) pair, if the issue is positioned.
    pub fn location(&self) -> Option<(usize, usize)> {
        match (self.line, self.column) {
            (Some(line), Some(column)) => Some((line, column)),
            _ => None,
        }
    }
}

/// Sort issues so that higher severities come first, keeping detection
/// order within a severity.
pub fn sort_by_severity(issues: &mut [CodeIssue]) {
    issues.sort_by_key(|i| i.severity);
}

/// What kind of improvement a suggestion proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    QuickFix,
    Refactor,
    LearnMore,
    BestPractice,
    Optimization,
    Documentation,
    ModernSyntax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An improvement proposal derived from the code and its issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSuggestion {
    pub title: String,
    pub description: String,
    pub improvement_type: SuggestionType,
    pub code_before: Option<String>,
    pub code_after: Option<String>,
    pub impact: Impact,
    pub difficulty: Difficulty,
    /// 1-10, higher is more important.
    pub priority: u8,
}

impl CodeSuggestion {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        improvement_type: SuggestionType,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            improvement_type,
            code_before: None,
            code_after: None,
            impact: Impact::Medium,
            difficulty: Difficulty::Easy,
            priority: 5,
        }
    }

    pub fn before_after(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.code_before = Some(before.into());
        self.code_after = Some(after.into());
        self
    }

    pub fn impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(1, 10);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Tutorial,
    Practice,
    Documentation,
    Course,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Tutorial => "tutorial",
            ResourceType::Practice => "practice",
            ResourceType::Documentation => "documentation",
            ResourceType::Course => "course",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A topic the author should study, derived from the issues found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecommendation {
    pub topic: String,
    pub reason: String,
    pub resource_type: ResourceType,
    /// Advisory only.
    pub estimated_time: String,
    /// 1-5, where 1 is the most urgent.
    pub priority: u8,
}

impl LearningRecommendation {
    pub fn new(
        topic: impl Into<String>,
        reason: impl Into<String>,
        resource_type: ResourceType,
        estimated_time: impl Into<String>,
        priority: u8,
    ) -> Self {
        Self {
            topic: topic.into(),
            reason: reason.into(),
            resource_type,
            estimated_time: estimated_time.into(),
            priority: priority.clamp(1, 5),
        }
    }
}

/// A single metric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Bool(v)
    }
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        MetricValue::Int(v as i64)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Bool(v) => write!(f, "{}", v),
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{:.2}", v),
        }
    }
}

/// Metric name to value mapping.
///
/// Every rule module reports `lines_of_code`; full modules also report
/// `total_lines`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeMetrics(BTreeMap<String, MetricValue>);

impl CodeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<MetricValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<MetricValue> {
        self.0.get(key).copied()
    }

    /// Numeric view of a metric; booleans count as 0 or 1.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).map(|v| match v {
            MetricValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            MetricValue::Int(i) => i as f64,
            MetricValue::Float(f) => f,
        })
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(MetricValue::Bool(true)))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MetricValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The complete result of analyzing one source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub language: String,
    /// Canonical 0-10 score.
    pub quality_score: f64,
    pub issues: Vec<CodeIssue>,
    pub suggestions: Vec<CodeSuggestion>,
    pub recommendations: Vec<LearningRecommendation>,
    pub metrics: CodeMetrics,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_critical(&self) -> bool {
        self.count(Severity::Critical) > 0
    }

    /// Issues that came from the enrichment provider.
    pub fn enrichment_issues(&self) -> impl Iterator<Item = &CodeIssue> {
        self.issues
            .iter()
            .filter(|i| i.has_tag(crate::enrich::MODEL_TAG))
    }
}
