//! Issue vocabulary and the heuristic checks shared by rule modules.

mod balance;
pub mod language;
mod misspellings;
mod patterns;
pub mod source;
mod statements;
mod structure;
mod todos;
mod types;

pub use balance::{check_balance, BalanceOptions, GENERIC_SKIP_PREFIXES};
pub use misspellings::{check_misspellings, Misspelling, C_FAMILY as C_FAMILY_MISSPELLINGS};
pub use patterns::{check_line_length, check_patterns, PatternRule, COMMON_PATTERNS};
pub use statements::{check_block_colon, check_terminator, opens_block, BLOCK_KEYWORDS};
pub use structure::{check_requirements, Requirement};
pub use todos::check_todo;
pub use types::{
    sort_by_severity, AnalysisResult, CodeIssue, CodeMetrics, CodeSuggestion, Difficulty,
    Impact, IssueCategory, LearningRecommendation, MetricValue, ResourceType, Severity,
    SuggestionType, DEFAULT_CONFIDENCE,
};
