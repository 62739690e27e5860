//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::detect::{AnalysisResult, CodeIssue, Severity};
use crate::orchestrator::{BatchResult, QuickResult};
use crate::practice::Complexity;
use crate::score;

/// Whether `score` passes an optional minimum.
pub fn passes(score: f64, min_score: Option<f64>) -> bool {
    min_score.map_or(true, |min| score >= min)
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report for a single analysis.
#[derive(Serialize)]
pub struct AnalysisReport<'a> {
    pub version: &'static str,
    pub path: &'a str,
    pub grade: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    pub passed: bool,
    #[serde(flatten)]
    pub result: &'a AnalysisResult,
}

/// JSON report for a quick analysis.
#[derive(Serialize)]
pub struct QuickReport<'a> {
    pub version: &'static str,
    pub path: &'a str,
    #[serde(flatten)]
    pub result: &'a QuickResult,
}

/// JSON report for a batch analysis.
#[derive(Serialize)]
pub struct BatchReport<'a> {
    pub version: &'static str,
    pub path: &'a str,
    pub grade: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    pub passed: bool,
    #[serde(flatten)]
    pub result: &'a BatchResult,
}

/// JSON report for a practice hint.
#[derive(Serialize)]
pub struct HintReport<'a> {
    pub path: &'a str,
    pub problem: &'a str,
    pub complexity: &'static str,
    pub complexity_note: &'static str,
    pub hint: &'a str,
}

impl<'a> HintReport<'a> {
    pub fn new(path: &'a str, problem: &'a str, complexity: Complexity, hint: &'a str) -> Self {
        Self {
            path,
            problem,
            complexity: complexity.as_str(),
            complexity_note: complexity.describe(),
            hint,
        }
    }
}

pub fn analysis_report<'a>(
    path: &'a str,
    result: &'a AnalysisResult,
    min_score: Option<f64>,
) -> AnalysisReport<'a> {
    AnalysisReport {
        version: env!("CARGO_PKG_VERSION"),
        path,
        grade: score::grade(result.quality_score),
        min_score,
        passed: passes(result.quality_score, min_score),
        result,
    }
}

pub fn batch_report<'a>(path: &'a str, result: &'a BatchResult, min_score: Option<f64>) -> BatchReport<'a> {
    BatchReport {
        version: env!("CARGO_PKG_VERSION"),
        path,
        grade: score::grade(result.overall_quality),
        min_score,
        passed: passes(result.overall_quality, min_score),
        result,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn write_analysis_json(path: &str, result: &AnalysisResult, min_score: Option<f64>) -> anyhow::Result<()> {
    print_json(&analysis_report(path, result, min_score))
}

pub fn write_quick_json(path: &str, result: &QuickResult) -> anyhow::Result<()> {
    print_json(&QuickReport {
        version: env!("CARGO_PKG_VERSION"),
        path,
        result,
    })
}

pub fn write_batch_json(path: &str, result: &BatchResult, min_score: Option<f64>) -> anyhow::Result<()> {
    print_json(&batch_report(path, result, min_score))
}

pub fn write_hint_json(report: &HintReport<'_>) -> anyhow::Result<()> {
    print_json(report)
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header(label: &str, path: &str) {
    println!();
    print!("  ");
    print!("{}", "codelens".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", format!("{:<10}", label).dimmed());
    println!("{}", path);
    println!();
}

/// Write a single analysis in pretty format.
pub fn write_analysis_pretty(path: &str, result: &AnalysisResult, min_score: Option<f64>) {
    write_header("Analyzed:", path);

    print!("  Language: {}  Score: ", result.language.bold());
    write_colored_score(result.quality_score);
    print!(
        "/10{}  Grade: ",
        format!(" ({:.0}/100)", score::to_hundred(result.quality_score)).dimmed()
    );
    write_colored_grade(score::grade(result.quality_score));
    println!();
    println!();

    if !result.issues.is_empty() {
        write_issues(&result.issues);
    }

    if !result.suggestions.is_empty() {
        println!("  {} ({}):", "Suggestions".bold(), result.suggestions.len());
        for s in &result.suggestions {
            println!(
                "    {} {}  {}",
                format!("[{}]", s.priority).dimmed(),
                s.title.bold(),
                format!("({} impact, {})", s.impact, s.difficulty).dimmed()
            );
            println!("        {}", s.description);
        }
        println!();
    }

    if !result.recommendations.is_empty() {
        println!("  {} ({}):", "Learning".bold(), result.recommendations.len());
        for r in &result.recommendations {
            println!(
                "    {}. {}  {}",
                r.priority,
                r.topic,
                format!("({}, {})", r.resource_type, r.estimated_time).dimmed()
            );
        }
        println!();
    }

    write_metrics(result);
    write_final_status(result.quality_score, min_score);
}

/// Write a quick analysis in pretty format.
pub fn write_quick_pretty(path: &str, result: &QuickResult) {
    write_header("Quick:", path);

    print!("  Language: {}  Score: ", result.language.bold());
    write_colored_score(result.quality_score / 10.0);
    println!(
        "{}  {}",
        format!(" ({:.0}/100)", result.quality_score).dimmed(),
        format!("{} ms", result.analysis_time_ms).dimmed()
    );
    println!();

    if result.major_issues.is_empty() {
        println!("  {}", "No major issues".green());
    } else {
        write_issues(&result.major_issues);
    }
    if result.suggestions_count > 0 {
        println!("  {}", format!("{} minor finding(s) not shown", result.suggestions_count).dimmed());
    }
    println!();
}

/// Write a batch analysis in pretty format.
pub fn write_batch_pretty(path: &str, result: &BatchResult, min_score: Option<f64>) {
    write_header("Scanning:", path);

    println!("  {} ({}):", "Files".bold(), result.files_analyzed);
    for f in &result.file_results {
        print!("    ");
        write_colored_score(f.result.quality_score);
        print!("  ");
        write_colored_grade(score::grade(f.result.quality_score));
        print!("  {}", f.name.blue());
        let critical = f.result.count(Severity::Critical);
        if critical > 0 {
            print!("  {}", format!("{} critical", critical).red());
        }
        println!();
    }
    println!();

    print!("  Overall: ");
    write_colored_score(result.overall_quality);
    print!("/10  Grade: ");
    write_colored_grade(score::grade(result.overall_quality));
    println!("  Critical issues: {}", result.critical_issues);
    println!();

    write_final_status(result.overall_quality, min_score);
}

/// Write a practice hint in pretty format.
pub fn write_hint_pretty(report: &HintReport<'_>) {
    write_header("Problem:", report.problem);
    println!("  {} {}", "Complexity:".bold(), report.complexity);
    println!("    {}", report.complexity_note.dimmed());
    println!();
    println!("  {} {}", "Hint:".bold(), report.hint);
    println!();
}

fn write_colored_score(s: f64) {
    let text = format!("{:.1}", s);
    match s {
        s if s >= score::grades::A_MIN => print!("{}", text.green().bold()),
        s if s >= score::grades::B_MIN => print!("{}", text.green()),
        s if s >= score::grades::C_MIN => print!("{}", text.yellow()),
        s if s >= score::grades::D_MIN => print!("{}", text.yellow().bold()),
        _ => print!("{}", text.red()),
    }
}

fn write_colored_grade(grade: &str) {
    match grade {
        "A" => print!("{}", grade.green().bold()),
        "B" => print!("{}", grade.green()),
        "C" => print!("{}", grade.yellow()),
        "D" => print!("{}", grade.yellow().bold()),
        _ => print!("{}", grade.red()),
    }
}

fn write_issues(issues: &[CodeIssue]) {
    println!("  {} ({}):", "Issues".bold(), issues.len());
    println!();

    for issue in issues {
        write_severity_tag(issue.severity);
        print!("   ");
        print!("{:<16}", issue.category.as_str().dimmed());
        if let Some((line, column)) = issue.location() {
            print!("{}", format!("{}:{}", line, column).blue());
        }
        println!();

        println!("            {}", issue.message);
        if !issue.suggestion.is_empty() {
            println!("            {}", format!("→ {}", issue.suggestion).dimmed());
        }
        println!();
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Critical => print!("    {} ", "CRIT ".red().bold()),
        Severity::High => print!("    {} ", "HIGH ".red()),
        Severity::Medium => print!("    {} ", "MED  ".yellow()),
        Severity::Low => print!("    {} ", "LOW  ".blue()),
        Severity::Info => print!("    {} ", "INFO ".dimmed()),
    }
}

fn write_metrics(result: &AnalysisResult) {
    if result.metrics.is_empty() {
        return;
    }
    println!("  {}", "Metrics:".bold());
    for (key, value) in result.metrics.iter() {
        println!("    {:<24} {}", key, value);
    }
    println!();
}

fn write_final_status(score: f64, min_score: Option<f64>) {
    let Some(min) = min_score else {
        return;
    };
    print!("  {}", format!("Minimum: {:.1}", min).dimmed());
    print!("  Score: ");
    write_colored_score(score);
    print!("  ");

    if passes(score, min_score) {
        print!("{}", "PASSED".green());
    } else {
        print!("{}", "FAILED".red());
    }
    println!();
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{CodeMetrics, IssueCategory};
    use chrono::Utc;

    fn result(score: f64) -> AnalysisResult {
        let mut metrics = CodeMetrics::new();
        metrics.insert("lines_of_code", 3usize);
        AnalysisResult {
            language: "python".to_string(),
            quality_score: score,
            issues: vec![CodeIssue::new(IssueCategory::Syntax, Severity::Critical, "Missing colon").at(1, 9)],
            suggestions: Vec::new(),
            recommendations: Vec::new(),
            metrics,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_passes() {
        assert!(passes(3.0, None));
        assert!(passes(7.0, Some(7.0)));
        assert!(!passes(6.9, Some(7.0)));
    }

    #[test]
    fn test_analysis_report_json_shape() {
        let r = result(7.0);
        let json = serde_json::to_value(analysis_report("a.py", &r, Some(8.0))).unwrap();
        assert_eq!(json["path"], "a.py");
        assert_eq!(json["grade"], "C");
        assert_eq!(json["passed"], false);
        assert_eq!(json["language"], "python");
        assert_eq!(json["quality_score"], 7.0);
        assert_eq!(json["issues"][0]["severity"], "critical");
        assert_eq!(json["issues"][0]["line"], 1);
        assert_eq!(json["metrics"]["lines_of_code"], 3);
    }

    #[test]
    fn test_min_score_omitted_when_absent() {
        let r = result(9.5);
        let json = serde_json::to_value(analysis_report("a.py", &r, None)).unwrap();
        assert!(json.get("min_score").is_none());
        assert_eq!(json["passed"], true);
        assert_eq!(json["grade"], "A");
    }

    #[test]
    fn test_hint_report() {
        let report = HintReport::new("s.py", "Two Sum", Complexity::Quadratic, "Use a hash map.");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["complexity"], "O(n²)");
        assert_eq!(json["hint"], "Use a hash map.");
    }
}
