//! Optional model-based enrichment of analysis results.
//!
//! A provider returns raw issue maps in its own vocabulary. The [`Enricher`]
//! bounds each call with a timeout and a rate limiter, maps the raw issues
//! into [`CodeIssue`]s and turns every failure into "no enrichment".

mod http;
mod mapping;
mod rate_limit;

pub use http::HttpProvider;
pub use mapping::{map_category, map_enrichment, map_issue, map_severity, suggestions_from};
pub use rate_limit::RateLimiter;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EnrichmentConfig;
use crate::detect::{CodeIssue, CodeSuggestion};

/// Tag carried by every enrichment-derived issue.
pub const MODEL_TAG: &str = "model_detected";

/// Confidence used when the provider does not report one.
pub const DEFAULT_MODEL_CONFIDENCE: f64 = 0.5;

/// Errors that can occur while calling a provider.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("enrichment not configured: {0}")]
    NotConfigured(String),
}

/// One issue in the provider's own vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawIssue {
    pub severity: Option<String>,
    pub category: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: Option<String>,
    pub explanation: Option<String>,
    pub suggestion: Option<String>,
    pub example_fix: Option<String>,
    pub confidence: Option<f64>,
}

/// Raw provider output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Enrichment {
    pub issues: Vec<RawIssue>,
    pub confidence: f64,
}

/// Enrichment mapped into the canonical vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentOutcome {
    pub issues: Vec<CodeIssue>,
    pub suggestions: Vec<CodeSuggestion>,
    pub confidence: f64,
}

/// A model or service that finds issues in source code.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn analyze(&self, code: &str, language: &str) -> Result<Enrichment, EnrichError>;
}

/// Best-effort wrapper around a provider.
///
/// Constructed by the caller and handed to the orchestrator; one instance
/// is shared by every analysis that uses it.
pub struct Enricher {
    provider: Arc<dyn EnrichmentProvider>,
    limiter: Option<Arc<RateLimiter>>,
    timeout: Duration,
}

impl Enricher {
    pub fn new(provider: Arc<dyn EnrichmentProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            limiter: None,
            timeout,
        }
    }

    pub fn with_rate_limit(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(Arc::new(limiter));
        self
    }

    /// Build the HTTP-backed enricher described by `config`.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, EnrichError> {
        let provider = HttpProvider::from_config(config)?;
        let limiter = RateLimiter::new(
            config.rate_limit.max_calls,
            Duration::from_secs(config.rate_limit.window_secs),
        );
        Ok(Self::new(Arc::new(provider), Duration::from_secs(config.timeout_secs))
            .with_rate_limit(limiter))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Enrich one source text.
    ///
    /// Returns `None` when the provider fails or the timeout (which also
    /// covers waiting for the rate limiter) expires.
    pub async fn enrich(&self, code: &str, language: &str) -> Option<EnrichmentOutcome> {
        let call = async {
            if let Some(limiter) = &self.limiter {
                limiter.acquire().await;
            }
            self.provider.analyze(code, language).await
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(raw)) => {
                let outcome = map_enrichment(raw);
                debug!(
                    provider = self.provider.name(),
                    language,
                    issues = outcome.issues.len(),
                    confidence = outcome.confidence,
                    "Enrichment complete"
                );
                Some(outcome)
            }
            Ok(Err(e)) => {
                warn!(provider = self.provider.name(), error = %e, "Enrichment failed");
                None
            }
            Err(_) => {
                warn!(
                    provider = self.provider.name(),
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Enrichment timed out"
                );
                None
            }
        }
    }

    /// Enrich several `(code, language)` pairs with at most `concurrency`
    /// calls in flight. Results are returned in input order.
    pub async fn enrich_many(
        &self,
        items: &[(String, String)],
        concurrency: usize,
    ) -> Vec<Option<EnrichmentOutcome>> {
        let mut results: Vec<(usize, Option<EnrichmentOutcome>)> =
            stream::iter(items.iter().enumerate())
                .map(|(idx, (code, language))| async move {
                    (idx, self.enrich(code, language).await)
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<Enrichment, ()>);

    #[async_trait]
    impl EnrichmentProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn analyze(&self, _code: &str, _language: &str) -> Result<Enrichment, EnrichError> {
            self.0
                .clone()
                .map_err(|_| EnrichError::Unavailable("down".to_string()))
        }
    }

    fn raw(message: &str) -> RawIssue {
        RawIssue {
            severity: Some("high".to_string()),
            category: Some("security".to_string()),
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_enrich_maps_issues() {
        let provider = Fixed(Ok(Enrichment {
            issues: vec![raw("Possible injection")],
            confidence: 0.8,
        }));
        let enricher = Enricher::new(Arc::new(provider), Duration::from_secs(5));
        let outcome = enricher.enrich("x", "python").await.unwrap();
        assert_eq!(outcome.issues.len(), 1);
        assert!(outcome.issues[0].has_tag(MODEL_TAG));
        assert_eq!(outcome.issues[0].confidence, DEFAULT_MODEL_CONFIDENCE);
        assert_eq!(outcome.confidence, 0.8);
    }

    #[tokio::test]
    async fn test_failure_is_absent() {
        let enricher = Enricher::new(Arc::new(Fixed(Err(()))), Duration::from_secs(5));
        assert!(enricher.enrich("x", "python").await.is_none());
    }

    #[tokio::test]
    async fn test_enrich_many_keeps_order() {
        let provider = Fixed(Ok(Enrichment::default()));
        let enricher = Enricher::new(Arc::new(provider), Duration::from_secs(5));
        let items = vec![
            ("a".to_string(), "python".to_string()),
            ("b".to_string(), "java".to_string()),
            ("c".to_string(), "go".to_string()),
        ];
        let results = enricher.enrich_many(&items, 2).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_some()));
    }
}
