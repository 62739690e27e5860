//! Quality score calculation.
//!
//! Maps a module's issues and metrics to a bounded 0-10 score. The 0-100
//! variant is derived from the same rubric with every weight scaled by ten.

use serde::{Deserialize, Serialize};

use crate::detect::{CodeIssue, CodeMetrics, Severity};

/// Point deductions per severity.
pub mod points {
    pub const STRICT_CRITICAL: f64 = 3.0;
    pub const STRICT_HIGH: f64 = 2.0;
    pub const STRICT_MEDIUM: f64 = 1.0;
    pub const STRICT_LOW: f64 = 0.5;

    pub const DEGRADED_CRITICAL: f64 = 2.0;
    pub const DEGRADED_HIGH: f64 = 1.0;
    pub const DEGRADED_MEDIUM: f64 = 0.5;
    pub const DEGRADED_LOW: f64 = 0.0;

    /// Added once for well-commented or documented code.
    pub const STRUCTURE_BONUS: f64 = 0.5;
}

/// Lower and upper bound of the canonical score.
pub const SCORE_FLOOR: f64 = 0.0;
pub const SCORE_CEILING: f64 = 10.0;

/// Comment lines must exceed this share of non-empty lines to earn the bonus.
pub const COMMENT_RATIO_THRESHOLD: f64 = 0.1;

/// Grade thresholds on the 0-10 scale (inclusive lower bounds).
pub mod grades {
    pub const A_MIN: f64 = 9.0;
    pub const B_MIN: f64 = 7.5;
    pub const C_MIN: f64 = 6.0;
    pub const D_MIN: f64 = 4.0;
}

/// Base score and deduction weights used for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub base: f64,
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

/// Full rule coverage.
pub const STRICT: Rubric = Rubric {
    base: 10.0,
    critical: points::STRICT_CRITICAL,
    high: points::STRICT_HIGH,
    medium: points::STRICT_MEDIUM,
    low: points::STRICT_LOW,
};

/// Partial or generic coverage: fewer checks ran, so the base is lower.
pub const DEGRADED: Rubric = Rubric {
    base: 8.0,
    critical: points::DEGRADED_CRITICAL,
    high: points::DEGRADED_HIGH,
    medium: points::DEGRADED_MEDIUM,
    low: points::DEGRADED_LOW,
};

impl Rubric {
    pub fn deduction(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => 0.0,
        }
    }

    /// Score on the 0-100 scale, all weights multiplied by ten.
    pub fn scaled(&self, issues: &[CodeIssue], metrics: &CodeMetrics) -> f64 {
        let rubric = Rubric {
            base: self.base * 10.0,
            critical: self.critical * 10.0,
            high: self.high * 10.0,
            medium: self.medium * 10.0,
            low: self.low * 10.0,
        };
        let raw = rubric.base - total_deduction(&rubric, issues)
            + bonus(metrics) * 10.0;
        raw.clamp(SCORE_FLOOR * 10.0, SCORE_CEILING * 10.0)
    }
}

fn total_deduction(rubric: &Rubric, issues: &[CodeIssue]) -> f64 {
    issues.iter().map(|i| rubric.deduction(i.severity)).sum()
}

/// The single structural bonus, or zero.
///
/// Either a comment ratio above the threshold or a `documented` metric
/// qualifies; both together still earn one bonus.
pub fn bonus(metrics: &CodeMetrics) -> f64 {
    let comment_lines = metrics.number("comment_lines").unwrap_or(0.0);
    let code_lines = metrics.number("non_empty_lines").unwrap_or(0.0);
    let commented = code_lines > 0.0 && comment_lines > COMMENT_RATIO_THRESHOLD * code_lines;

    if commented || metrics.flag("documented") {
        points::STRUCTURE_BONUS
    } else {
        0.0
    }
}

/// Calculate the quality score on the canonical 0-10 scale.
pub fn calculate(issues: &[CodeIssue], metrics: &CodeMetrics, rubric: &Rubric) -> f64 {
    let raw = rubric.base - total_deduction(rubric, issues) + bonus(metrics);
    raw.clamp(SCORE_FLOOR, SCORE_CEILING)
}

/// Convert a canonical score to the 0-100 variant.
pub fn to_hundred(score: f64) -> f64 {
    (score * 10.0).clamp(SCORE_FLOOR * 10.0, SCORE_CEILING * 10.0)
}

/// Determine the letter grade from a 0-10 score.
pub fn grade(score: f64) -> &'static str {
    match score {
        s if s >= grades::A_MIN => "A",
        s if s >= grades::B_MIN => "B",
        s if s >= grades::C_MIN => "C",
        s if s >= grades::D_MIN => "D",
        _ => "F",
    }
}
