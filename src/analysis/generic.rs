//! Fallback module for languages without a rule table.

use crate::detect::source::segment_count;
use crate::detect::{
    check_balance, BalanceOptions, CodeIssue, CodeMetrics, CodeSuggestion, IssueCategory,
    LearningRecommendation, Severity, GENERIC_SKIP_PREFIXES,
};

use super::traits::{Capability, RuleModule};

const GENERIC_BALANCE: BalanceOptions<'static> = BalanceOptions {
    skip_prefixes: GENERIC_SKIP_PREFIXES,
    line_comment: "",
    single_quotes: true,
    block_delimiters: &[],
};

/// Runs only the language-independent balance checks.
pub struct GenericRuleModule {
    language: String,
    supported: Vec<&'static str>,
}

impl GenericRuleModule {
    /// `supported` is listed in the "not yet supported" issue.
    pub fn new(language: impl Into<String>, supported: Vec<&'static str>) -> Self {
        Self {
            language: language.into(),
            supported,
        }
    }

    fn unsupported_issue(&self) -> CodeIssue {
        CodeIssue::new(
            IssueCategory::BestPractice,
            Severity::Info,
            format!(
                "Language \"{}\" is not yet supported (supported: {})",
                self.language,
                self.supported.join(", ")
            ),
        )
        .explain("Only the language-independent balance checks were run on this code.")
        .suggest("Select one of the supported languages for a full analysis")
        .confidence(1.0)
        .tag("unsupported_language")
    }
}

impl RuleModule for GenericRuleModule {
    fn language_id(&self) -> &str {
        &self.language
    }

    fn display_name(&self) -> &str {
        &self.language
    }

    fn capability(&self) -> Capability {
        Capability::Generic
    }

    fn find_issues(&self, code: &str) -> Vec<CodeIssue> {
        let mut issues = vec![self.unsupported_issue()];
        issues.extend(check_balance(code, &GENERIC_BALANCE));
        issues
    }

    fn generate_suggestions(&self, _code: &str, _issues: &[CodeIssue]) -> Vec<CodeSuggestion> {
        Vec::new()
    }

    fn calculate_metrics(&self, code: &str) -> CodeMetrics {
        let mut metrics = CodeMetrics::new();
        metrics.insert("lines_of_code", segment_count(code));
        metrics
    }

    fn get_learning_recommendations(
        &self,
        _issues: &[CodeIssue],
        _metrics: &CodeMetrics,
    ) -> Vec<LearningRecommendation> {
        Vec::new()
    }
}
