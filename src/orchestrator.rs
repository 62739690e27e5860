//! Analysis orchestration.
//!
//! [`Analyzer`] dispatches a source text to its rule module, scores it,
//! merges optional enrichment and assembles the [`AnalysisResult`]. It also
//! provides the quick (issues and score only) and batch (many files on a
//! worker pool) variants.
//!
//! The analysis path never fails: empty input, unknown languages and
//! internal faults all produce a well-formed result.

use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, error, info, warn};

use crate::aggregate::{merge_recommendations, merge_suggestions};
use crate::analysis::{get_module, normalize_language, registered_languages, GenericRuleModule, RuleModule};
use crate::config::{AnalysisConfig, Config};
use crate::detect::language::{mismatch, mismatch_issue};
use crate::detect::source::segment_count;
use crate::detect::{
    sort_by_severity, AnalysisResult, CodeIssue, CodeMetrics, IssueCategory, Severity,
};
use crate::enrich::{Enricher, EnrichmentOutcome};
use crate::score;

/// Metric recording the provider's confidence when enrichment ran.
pub const ENRICHMENT_CONFIDENCE_METRIC: &str = "enrichment_confidence";

/// Default worker count for batch analysis.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Which optional parts of the result to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeOptions {
    pub include_suggestions: bool,
    pub include_recommendations: bool,
    pub include_enrichment: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            include_suggestions: true,
            include_recommendations: true,
            include_enrichment: true,
        }
    }
}

impl From<&AnalysisConfig> for AnalyzeOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            include_suggestions: config.include_suggestions,
            include_recommendations: config.include_recommendations,
            include_enrichment: config.include_enrichment,
        }
    }
}

/// Result of a quick analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickResult {
    pub language: String,
    /// Score on the 0-100 scale.
    pub quality_score: f64,
    /// CRITICAL and HIGH issues.
    pub major_issues: Vec<CodeIssue>,
    /// Minor (LOW and INFO) findings.
    pub suggestions_count: usize,
    pub analysis_time_ms: u64,
}

/// One file in a batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFile {
    pub name: String,
    pub code: String,
    /// Overrides the request language for this file.
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub files: Vec<BatchFile>,
    /// Language for files that do not name one.
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub name: String,
    pub result: AnalysisResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub files_analyzed: usize,
    /// Mean of the per-file 0-10 scores, 0 for an empty batch.
    pub overall_quality: f64,
    /// Total CRITICAL issues across all files.
    pub critical_issues: usize,
    pub file_results: Vec<FileResult>,
}

/// Entry point for all analyses.
///
/// Holds the optional enricher and the runtime that drives it. Rule
/// modules are stateless, so one `Analyzer` serves concurrent callers.
pub struct Analyzer {
    enricher: Option<Arc<Enricher>>,
    runtime: Option<Runtime>,
    pool_size: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Analyzer {
    fn drop(&mut self) {
        // Does not block, so an analyzer may be dropped inside async code.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl Analyzer {
    /// Heuristic-only analyzer.
    pub fn new() -> Self {
        Self {
            enricher: None,
            runtime: None,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Attach an enricher. Builds the runtime used for blocking calls.
    pub fn with_enricher(mut self, enricher: Enricher) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("codelens-enrich")
            .enable_all()
            .build()
            .map_err(|e| anyhow::anyhow!("failed to start enrichment runtime: {}", e))?;
        self.enricher = Some(Arc::new(enricher));
        self.runtime = Some(runtime);
        Ok(self)
    }

    /// Build an analyzer from configuration.
    ///
    /// An enabled but unusable provider (e.g., missing API key) is logged
    /// and skipped.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let analyzer = Self::new().with_pool_size(config.batch.pool_size);
        if !config.enrichment.enabled {
            return Ok(analyzer);
        }
        match Enricher::from_config(&config.enrichment) {
            Ok(enricher) => analyzer.with_enricher(enricher),
            Err(e) => {
                warn!(error = %e, "Enrichment disabled");
                Ok(analyzer)
            }
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Analyze one source text.
    pub fn analyze(&self, code: &str, language: &str, options: &AnalyzeOptions) -> AnalysisResult {
        let enrichment = if wants_enrichment(code, options) {
            self.enrich_blocking(code, &normalize_language(language))
        } else {
            None
        };
        guarded(language, || assemble(code, language, options, enrichment))
    }

    /// Same as [`Analyzer::analyze`], for callers already inside an async
    /// runtime.
    pub async fn analyze_async(
        &self,
        code: &str,
        language: &str,
        options: &AnalyzeOptions,
    ) -> AnalysisResult {
        let enrichment = match &self.enricher {
            Some(enricher) if wants_enrichment(code, options) => {
                enricher.enrich(code, &normalize_language(language)).await
            }
            _ => None,
        };
        guarded(language, || assemble(code, language, options, enrichment))
    }

    /// Issues and score only: no enrichment, suggestions or recommendations.
    pub fn quick(&self, code: &str, language: &str) -> QuickResult {
        let started = Instant::now();
        let language_id = normalize_language(language);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if code.trim().is_empty() {
                return (0.0, Vec::new());
            }
            with_module(&language_id, |module| {
                let issues = module.find_issues(code);
                let metrics = module.calculate_metrics(code);
                (module.capability().rubric().scaled(&issues, &metrics), issues)
            })
        }));
        let (quality_score, issues) = outcome.unwrap_or_else(|_| {
            error!(language = %language_id, "Quick analysis failed");
            (0.0, vec![analysis_error_issue()])
        });

        let (major_issues, minor): (Vec<CodeIssue>, Vec<CodeIssue>) = issues
            .into_iter()
            .partition(|i| matches!(i.severity, Severity::Critical | Severity::High));

        QuickResult {
            language: language_id,
            quality_score,
            major_issues,
            suggestions_count: minor.len(),
            analysis_time_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Analyze many files on a worker pool of `pool_size` threads.
    ///
    /// `progress` is called with each file name once its analysis is done.
    /// Results keep the request order.
    pub fn batch<F>(&self, request: &BatchRequest, options: &AnalyzeOptions, progress: F) -> BatchResult
    where
        F: Fn(&str) + Sync,
    {
        let started = Instant::now();
        let languages: Vec<String> = request
            .files
            .iter()
            .map(|f| f.language.clone().unwrap_or_else(|| request.language.clone()))
            .collect();

        let enrichments = self.enrich_batch(request, &languages, options);

        let analyze_file = |(idx, file): (usize, &BatchFile)| {
            let language = &languages[idx];
            let enrichment = enrichments.get(idx).cloned().flatten();
            let result = guarded(language, || assemble(&file.code, language, options, enrichment));
            progress(&file.name);
            FileResult {
                name: file.name.clone(),
                result,
            }
        };

        let file_results: Vec<FileResult> =
            match rayon::ThreadPoolBuilder::new().num_threads(self.pool_size).build() {
                Ok(pool) => pool.install(|| {
                    request.files.par_iter().enumerate().map(analyze_file).collect()
                }),
                Err(e) => {
                    warn!(error = %e, "Could not build batch pool, using the global pool");
                    request.files.par_iter().enumerate().map(analyze_file).collect()
                }
            };

        let files_analyzed = file_results.len();
        let overall_quality = if files_analyzed == 0 {
            0.0
        } else {
            file_results.iter().map(|f| f.result.quality_score).sum::<f64>() / files_analyzed as f64
        };
        let critical_issues = file_results
            .iter()
            .map(|f| f.result.count(Severity::Critical))
            .sum();

        info!(
            files = files_analyzed,
            overall_quality,
            critical_issues,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch analysis complete"
        );

        BatchResult {
            files_analyzed,
            overall_quality,
            critical_issues,
            file_results,
        }
    }

    fn enrich_blocking(&self, code: &str, language: &str) -> Option<EnrichmentOutcome> {
        let (enricher, runtime) = (self.enricher.as_ref()?, self.runtime.as_ref()?);
        if Handle::try_current().is_ok() {
            warn!("Blocking enrichment called inside an async runtime; use analyze_async");
            return None;
        }
        runtime.block_on(enricher.enrich(code, language))
    }

    fn enrich_batch(
        &self,
        request: &BatchRequest,
        languages: &[String],
        options: &AnalyzeOptions,
    ) -> Vec<Option<EnrichmentOutcome>> {
        let (enricher, runtime) = match (&self.enricher, &self.runtime) {
            (Some(e), Some(r)) if options.include_enrichment => (e, r),
            _ => return Vec::new(),
        };
        if Handle::try_current().is_ok() {
            warn!("Blocking enrichment called inside an async runtime; skipping");
            return Vec::new();
        }

        let pending: Vec<usize> = request
            .files
            .iter()
            .enumerate()
            .filter(|(_, f)| wants_enrichment(&f.code, options))
            .map(|(idx, _)| idx)
            .collect();
        let items: Vec<(String, String)> = pending
            .iter()
            .map(|&idx| (request.files[idx].code.clone(), normalize_language(&languages[idx])))
            .collect();

        let mut outcomes = vec![None; request.files.len()];
        let enriched = runtime.block_on(enricher.enrich_many(&items, self.pool_size));
        for (idx, outcome) in pending.into_iter().zip(enriched) {
            outcomes[idx] = outcome;
        }
        outcomes
    }
}

fn wants_enrichment(code: &str, options: &AnalyzeOptions) -> bool {
    options.include_enrichment && !code.trim().is_empty()
}

/// Run `module_fn` against the registered module for `language_id`, or the
/// generic fallback.
fn with_module<T>(language_id: &str, module_fn: impl FnOnce(&dyn RuleModule) -> T) -> T {
    match get_module(language_id) {
        Some(module) => module_fn(module),
        None => {
            debug!(language = language_id, "No rule module, using generic checks");
            module_fn(&GenericRuleModule::new(language_id, registered_languages()))
        }
    }
}

/// Run an analysis step, turning a panic into the `analysis_error` result.
fn guarded(language: &str, step: impl FnOnce() -> AnalysisResult) -> AnalysisResult {
    panic::catch_unwind(AssertUnwindSafe(step)).unwrap_or_else(|_| {
        error!(language, "Analysis failed with an internal error");
        AnalysisResult {
            language: normalize_language(language),
            quality_score: 0.0,
            issues: vec![analysis_error_issue()],
            suggestions: Vec::new(),
            recommendations: Vec::new(),
            metrics: CodeMetrics::new(),
            timestamp: Utc::now(),
        }
    })
}

fn analysis_error_issue() -> CodeIssue {
    CodeIssue::new(IssueCategory::Logic, Severity::Critical, "Analysis error occurred")
        .explain("An internal error prevented this code from being analyzed.")
        .suggest("Try again, or report the problem if it persists")
        .confidence(1.0)
        .tag("analysis_error")
}

fn empty_input_result(code: &str, language: String) -> AnalysisResult {
    let mut metrics = CodeMetrics::new();
    metrics.insert("total_lines", 0usize);
    metrics.insert("lines_of_code", segment_count(code));

    AnalysisResult {
        language,
        quality_score: 0.0,
        issues: vec![CodeIssue::new(IssueCategory::Logic, Severity::Info, "No code submitted")
            .explain("The submission is empty or contains only whitespace.")
            .suggest("Write some code before requesting an analysis")
            .confidence(1.0)
            .tag("empty_input")],
        suggestions: Vec::new(),
        recommendations: Vec::new(),
        metrics,
        timestamp: Utc::now(),
    }
}

fn assemble(
    code: &str,
    language: &str,
    options: &AnalyzeOptions,
    enrichment: Option<EnrichmentOutcome>,
) -> AnalysisResult {
    let started = Instant::now();
    let language_id = normalize_language(language);
    if code.trim().is_empty() {
        debug!(language = %language_id, "Empty submission");
        return empty_input_result(code, language_id);
    }

    let mismatched = mismatch(code, &language_id).map(|detected| mismatch_issue(&language_id, detected));

    let mut result = with_module(&language_id, |module| {
        let mut issues = module.find_issues(code);
        sort_by_severity(&mut issues);
        let metrics = module.calculate_metrics(code);
        let quality_score = module.calculate_quality_score(&issues, &metrics);

        let suggestions = if options.include_suggestions {
            module.generate_suggestions(code, &issues)
        } else {
            Vec::new()
        };
        let recommendations = if options.include_recommendations {
            merge_recommendations(module.get_learning_recommendations(&issues, &metrics))
        } else {
            Vec::new()
        };

        AnalysisResult {
            language: module.language_id().to_string(),
            quality_score,
            issues,
            suggestions,
            recommendations,
            metrics,
            timestamp: Utc::now(),
        }
    });

    let mut enrichment_suggestions = Vec::new();
    if let Some(outcome) = enrichment.filter(|_| options.include_enrichment) {
        result.issues.extend(outcome.issues);
        sort_by_severity(&mut result.issues);
        result.metrics.insert(ENRICHMENT_CONFIDENCE_METRIC, outcome.confidence);
        enrichment_suggestions = outcome.suggestions;
    }
    if options.include_suggestions {
        result.suggestions = merge_suggestions(std::mem::take(&mut result.suggestions), enrichment_suggestions);
    }

    if let Some(issue) = mismatched {
        warn!(language = %language_id, "{}", issue.message);
        result.issues.insert(0, issue);
    }

    info!(
        language = %result.language,
        issues = result.issues.len(),
        critical = result.count(Severity::Critical),
        score = result.quality_score,
        grade = score::grade(result.quality_score),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Analysis complete"
    );
    result
}
