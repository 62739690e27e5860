//! Merging, ranking and capping of suggestions and recommendations.

use std::collections::HashSet;

use crate::detect::{CodeSuggestion, LearningRecommendation};

/// Maximum suggestions per analysis.
pub const MAX_SUGGESTIONS: usize = 4;

/// Maximum recommendations per analysis.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Final suggestion list.
///
/// Module suggestions come first, ordered by descending priority (stable),
/// then enrichment suggestions in provider order. Duplicate titles keep
/// their first occurrence.
pub fn merge_suggestions(
    mut module: Vec<CodeSuggestion>,
    enrichment: Vec<CodeSuggestion>,
) -> Vec<CodeSuggestion> {
    module.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut seen = HashSet::new();
    module
        .into_iter()
        .chain(enrichment)
        .filter(|s| seen.insert(s.title.clone()))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Final recommendation list: deduplicated by topic, ascending priority
/// (stable), capped.
pub fn merge_recommendations(
    recommendations: Vec<LearningRecommendation>,
) -> Vec<LearningRecommendation> {
    let mut seen = HashSet::new();
    let mut unique: Vec<LearningRecommendation> = recommendations
        .into_iter()
        .filter(|r| seen.insert(r.topic.clone()))
        .collect();
    unique.sort_by_key(|r| r.priority);
    unique.truncate(MAX_RECOMMENDATIONS);
    unique
}
