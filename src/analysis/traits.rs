//! The rule module contract.

use serde::{Deserialize, Serialize};

use crate::detect::{CodeIssue, CodeMetrics, CodeSuggestion, LearningRecommendation};
use crate::score::{self, Rubric};

/// How much rule coverage a module has for its language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Structure, pattern and metric checks for the language.
    Full,
    /// A smaller language-specific rule set on top of the shared checks.
    Partial,
    /// Only the language-independent balance checks.
    Generic,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Full => "full",
            Capability::Partial => "partial",
            Capability::Generic => "generic",
        }
    }

    /// The scoring rubric that matches this coverage level.
    pub fn rubric(&self) -> &'static Rubric {
        match self {
            Capability::Full => &score::STRICT,
            Capability::Partial | Capability::Generic => &score::DEGRADED,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-language analysis strategy.
///
/// Implementations hold no per-call state; one instance serves concurrent
/// analyses.
pub trait RuleModule: Send + Sync {
    /// Canonical language identifier (e.g., "python", "cpp").
    fn language_id(&self) -> &str;

    /// Human-readable name (e.g., "Python", "C++").
    fn display_name(&self) -> &str;

    fn capability(&self) -> Capability;

    /// Issues in detection order.
    fn find_issues(&self, code: &str) -> Vec<CodeIssue>;

    fn generate_suggestions(&self, code: &str, issues: &[CodeIssue]) -> Vec<CodeSuggestion>;

    fn calculate_metrics(&self, code: &str) -> CodeMetrics;

    fn get_learning_recommendations(
        &self,
        issues: &[CodeIssue],
        metrics: &CodeMetrics,
    ) -> Vec<LearningRecommendation>;

    /// Score on the 0-10 scale using the rubric for this module's capability.
    fn calculate_quality_score(&self, issues: &[CodeIssue], metrics: &CodeMetrics) -> f64 {
        score::calculate(issues, metrics, self.capability().rubric())
    }
}
