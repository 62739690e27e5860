//! Codelens - rule-based static analysis for learner code.
//!
//! Codelens takes a source text and its declared language, finds
//! structural and syntactic defects, risky patterns and style problems,
//! scores the code on a 0-10 scale and proposes suggestions and learning
//! recommendations. An optional model-based provider can add findings of
//! its own; its failures never affect the heuristic result.
//!
//! # Architecture
//!
//! - `detect`: Value model, language detector and the shared line checks
//! - `analysis`: Rule module contract, rule tables and the module registry
//! - `score`: Quality score rubric
//! - `aggregate`: Suggestion and recommendation merging
//! - `enrich`: Optional model-based enrichment
//! - `orchestrator`: Single, quick and batch analysis
//! - `practice`: Complexity estimate and practice hints
//! - `config`, `logging`, `report`, `cli`: The command-line shell
//!
//! # Example
//!
//! ```
//! use codelens::{AnalyzeOptions, Analyzer};
//!
//! let result = Analyzer::new().analyze("if x == 1\n    print(x)", "python", &AnalyzeOptions::default());
//! assert!(result.issues.iter().any(|i| i.message.starts_with("Missing colon")));
//! ```

pub mod aggregate;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod enrich;
pub mod logging;
pub mod orchestrator;
pub mod practice;
pub mod report;
pub mod score;

pub use analysis::{
    get_module, normalize_language, register_modules, registered_languages, Capability,
    GenericRuleModule, RuleModule,
};
pub use config::Config;
pub use detect::{
    AnalysisResult, CodeIssue, CodeMetrics, CodeSuggestion, IssueCategory, LearningRecommendation,
    Severity,
};
pub use enrich::{Enricher, EnrichmentProvider};
pub use orchestrator::{AnalyzeOptions, Analyzer, BatchRequest, BatchResult, QuickResult};
pub use practice::{estimate_complexity, Complexity, HintSelector};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_modules();
}
