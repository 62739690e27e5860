//! Integration tests for enrichment inside the analysis pipeline.
//!
//! A scripted provider stands in for the hosted model so the tests can
//! check merging, tagging, scoring and the failure paths.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use codelens::enrich::{EnrichError, Enricher, Enrichment, EnrichmentProvider, RawIssue, MODEL_TAG};
use codelens::orchestrator::{BatchFile, BatchRequest, ENRICHMENT_CONFIDENCE_METRIC};
use codelens::{AnalyzeOptions, Analyzer, Severity};

enum Behavior {
    Respond(Enrichment),
    Fail,
    Hang,
}

struct ScriptedProvider {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnrichmentProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn analyze(&self, _code: &str, _language: &str) -> Result<Enrichment, EnrichError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Respond(enrichment) => Ok(enrichment.clone()),
            Behavior::Fail => Err(EnrichError::Unavailable("model not loaded".to_string())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Enrichment::default())
            }
        }
    }
}

fn model_response() -> Enrichment {
    Enrichment {
        issues: vec![
            RawIssue {
                severity: Some("error".to_string()),
                category: Some("vulnerability".to_string()),
                line: Some(2),
                message: Some("User input reaches a shell command".to_string()),
                suggestion: Some("Pass arguments as a list".to_string()),
                confidence: Some(0.8),
                ..Default::default()
            },
            RawIssue {
                severity: Some("nonsense".to_string()),
                category: Some("naming".to_string()),
                message: Some("Vague variable name".to_string()),
                ..Default::default()
            },
        ],
        confidence: 0.75,
    }
}

fn analyzer_with(provider: Arc<ScriptedProvider>, timeout: Duration) -> Analyzer {
    codelens::init();
    Analyzer::new()
        .with_enricher(Enricher::new(provider, timeout))
        .expect("should start the enrichment runtime")
}

const CODE: &str = "import os\nos.system(\"ls \" + input())\n";

#[test]
fn test_enrichment_issues_are_merged_and_tagged() {
    let provider = ScriptedProvider::new(Behavior::Respond(model_response()));
    let analyzer = analyzer_with(provider.clone(), Duration::from_secs(5));
    let baseline = Analyzer::new().analyze(CODE, "python", &AnalyzeOptions::default());

    let result = analyzer.analyze(CODE, "python", &AnalyzeOptions::default());
    assert_eq!(provider.calls(), 1);

    let model: Vec<_> = result.enrichment_issues().collect();
    assert_eq!(model.len(), 2);
    let shell = model
        .iter()
        .find(|i| i.message.starts_with("User input"))
        .unwrap();
    assert_eq!(shell.severity, Severity::High);
    assert_eq!(shell.location(), Some((2, 1)));
    assert_eq!(shell.confidence, 0.8);
    assert!(shell.has_tag(MODEL_TAG));
    let vague = model
        .iter()
        .find(|i| i.message == "Vague variable name")
        .unwrap();
    assert_eq!(vague.severity, Severity::Medium);
    assert_eq!(vague.category.as_str(), "code_smell");
    assert_eq!(vague.confidence, 0.5);

    assert_eq!(result.quality_score, baseline.quality_score);
    assert_eq!(result.metrics.number(ENRICHMENT_CONFIDENCE_METRIC), Some(0.75));
    assert_eq!(result.issues.len(), baseline.issues.len() + 2);
    assert!(result
        .suggestions
        .iter()
        .any(|s| s.title == "User input reaches a shell command")
        || result.suggestions.len() == 4);
}

#[test]
fn test_enrichment_can_be_disabled_per_call() {
    let provider = ScriptedProvider::new(Behavior::Respond(model_response()));
    let analyzer = analyzer_with(provider.clone(), Duration::from_secs(5));
    let options = AnalyzeOptions {
        include_enrichment: false,
        ..AnalyzeOptions::default()
    };

    let result = analyzer.analyze(CODE, "python", &options);
    assert_eq!(provider.calls(), 0);
    assert_eq!(result.enrichment_issues().count(), 0);
    assert!(!result.metrics.contains(ENRICHMENT_CONFIDENCE_METRIC));
}

#[test]
fn test_empty_input_skips_enrichment() {
    let provider = ScriptedProvider::new(Behavior::Respond(model_response()));
    let analyzer = analyzer_with(provider.clone(), Duration::from_secs(5));
    let result = analyzer.analyze("  ", "python", &AnalyzeOptions::default());
    assert_eq!(provider.calls(), 0);
    assert_eq!(result.issues.len(), 1);
}

#[test]
fn test_provider_failure_is_invisible() {
    let provider = ScriptedProvider::new(Behavior::Fail);
    let analyzer = analyzer_with(provider.clone(), Duration::from_secs(5));
    let baseline = Analyzer::new().analyze(CODE, "python", &AnalyzeOptions::default());

    let result = analyzer.analyze(CODE, "python", &AnalyzeOptions::default());
    assert_eq!(provider.calls(), 1);
    assert_eq!(result.issues, baseline.issues);
    assert_eq!(result.quality_score, baseline.quality_score);
    assert!(!result.metrics.contains(ENRICHMENT_CONFIDENCE_METRIC));
}

#[test]
fn test_slow_provider_times_out() {
    let provider = ScriptedProvider::new(Behavior::Hang);
    let analyzer = analyzer_with(provider, Duration::from_millis(100));

    let started = Instant::now();
    let result = analyzer.analyze(CODE, "python", &AnalyzeOptions::default());
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(result.enrichment_issues().count(), 0);
}

#[test]
fn test_batch_enriches_every_file() {
    let provider = ScriptedProvider::new(Behavior::Respond(model_response()));
    let analyzer = analyzer_with(provider.clone(), Duration::from_secs(5)).with_pool_size(2);
    let request = BatchRequest {
        language: "python".to_string(),
        files: vec![
            BatchFile {
                name: "a.py".to_string(),
                code: CODE.to_string(),
                language: None,
            },
            BatchFile {
                name: "empty.py".to_string(),
                code: String::new(),
                language: None,
            },
            BatchFile {
                name: "b.py".to_string(),
                code: "x = 1\n".to_string(),
                language: None,
            },
        ],
    };

    let result = analyzer.batch(&request, &AnalyzeOptions::default(), |_| {});
    assert_eq!(result.files_analyzed, 3);
    assert_eq!(provider.calls(), 2);
    assert_eq!(result.file_results[0].result.enrichment_issues().count(), 2);
    assert_eq!(result.file_results[1].result.issues.len(), 1);
    assert_eq!(result.file_results[2].result.enrichment_issues().count(), 2);
}

#[tokio::test]
async fn test_analyze_async_inside_runtime() {
    codelens::init();
    let provider = ScriptedProvider::new(Behavior::Respond(model_response()));
    let enricher = Enricher::new(provider.clone(), Duration::from_secs(5));
    let analyzer = Analyzer::new().with_enricher(enricher).unwrap();

    let result = analyzer
        .analyze_async(CODE, "python", &AnalyzeOptions::default())
        .await;
    assert_eq!(provider.calls(), 1);
    assert_eq!(result.enrichment_issues().count(), 2);

    // The blocking variant cannot drive the runtime from here and skips
    // enrichment instead of panicking.
    let result = analyzer.analyze(CODE, "python", &AnalyzeOptions::default());
    assert_eq!(result.enrichment_issues().count(), 0);
    assert!(!result.issues.is_empty());
}
