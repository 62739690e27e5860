//! Practice-problem helpers: a rough time-complexity estimate and hints.
//!
//! Both are heuristics over the source text. The estimate looks at loop
//! nesting, sorting, binary search and self-calls; hints are picked from a
//! small catalog keyed by the problem title and the estimate.

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::detect::source::{contains_word, first_word};

/// Estimated asymptotic time complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    Cubic,
    Exponential,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Constant => "O(1)",
            Complexity::Logarithmic => "O(log n)",
            Complexity::Linear => "O(n)",
            Complexity::Linearithmic => "O(n log n)",
            Complexity::Quadratic => "O(n²)",
            Complexity::Cubic => "O(n³)",
            Complexity::Exponential => "O(2ⁿ)",
        }
    }

    /// One-sentence reading of the estimate.
    pub fn describe(&self) -> &'static str {
        match self {
            Complexity::Constant => "Constant time, or no loops the estimate could see.",
            Complexity::Logarithmic => "Binary search detected. Good efficiency.",
            Complexity::Linear => "Single pass through the data.",
            Complexity::Linearithmic => "Sorting dominates the running time.",
            Complexity::Quadratic => "Nested loops detected. Consider whether this can be optimized.",
            Complexity::Cubic => "Three or more nested loops. This is slow for large inputs.",
            Complexity::Exponential => "Recursion without memoization can be exponential.",
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

lazy_static! {
    static ref SORT_CALL: Regex =
        Regex::new(r"(?i)\bsorted\s*\(|\bsort\s*\(|\.sort\b|\bqsort\s*\(|\bsort_by").unwrap();
    static ref FUNCTION_NAME: Regex =
        Regex::new(r"\b(?:def|function|fn|func)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap();
    static ref MEMOIZED: Regex = Regex::new(r"(?i)\bmemo\w*|\blru_cache\b|@cache\b|\bdp\s*[\[=]").unwrap();
}

const LOOP_KEYWORDS: &[&str] = &["for", "while", "foreach"];

fn is_loop_header(trimmed: &str) -> bool {
    let word = first_word(trimmed.trim_start_matches('}').trim_start());
    LOOP_KEYWORDS.contains(&word) || trimmed.contains(".forEach(")
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Deepest loop nesting, judged by indentation.
pub fn loop_depth(code: &str) -> usize {
    let mut open: Vec<usize> = Vec::new();
    let mut deepest = 0;

    for line in code.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = indent_width(line);
        while open.last().map_or(false, |&i| i >= indent) {
            open.pop();
        }
        if is_loop_header(trimmed) {
            open.push(indent);
            deepest = deepest.max(open.len());
        }
    }
    deepest
}

fn has_binary_search(lower: &str) -> bool {
    lower.contains("binary")
        || (contains_word(lower, "left") && contains_word(lower, "right") && contains_word(lower, "mid"))
        || (contains_word(lower, "lo") && contains_word(lower, "hi") && contains_word(lower, "mid"))
}

fn has_recursion(code: &str) -> bool {
    FUNCTION_NAME.captures_iter(code).any(|caps| {
        let name = &caps[1];
        code.matches(&format!("{}(", name)).count() > 1
    })
}

/// Estimate the time complexity of `code`.
///
/// Loop depth wins over everything else; without nested loops, sorting,
/// binary search and recursion are considered in that order.
pub fn estimate_complexity(code: &str) -> Complexity {
    let depth = loop_depth(code);
    let lower = code.to_lowercase();

    if depth >= 3 {
        Complexity::Cubic
    } else if depth == 2 {
        Complexity::Quadratic
    } else if SORT_CALL.is_match(code) {
        Complexity::Linearithmic
    } else if has_binary_search(&lower) {
        Complexity::Logarithmic
    } else if has_recursion(code) {
        if MEMOIZED.is_match(code) {
            Complexity::Linear
        } else {
            Complexity::Exponential
        }
    } else if depth == 1 {
        Complexity::Linear
    } else {
        Complexity::Constant
    }
}

/// Hint used when nothing in the catalog applies.
pub const FALLBACK_HINT: &str = "Analyze your loops and data structures. Are you doing redundant work?";

/// Every hint that applies to a submission, in catalog order.
pub fn candidate_hints(problem_title: &str, code: &str, complexity: Complexity) -> Vec<&'static str> {
    let problem = problem_title.to_lowercase();
    let mut hints = Vec::new();

    if problem.contains("add") && problem.contains("two") && !problem.contains("sum") {
        hints.push("For adding two numbers you need the '+' operator. Check your return statement.");
        hints.push("Addition means sum. Make sure you are using the correct arithmetic operator.");
        hints.push("Review: a + b gives the sum, a - b gives the difference.");
    } else if problem.contains("two sum") {
        if loop_depth(code) >= 2 {
            hints.push("Can you remember which numbers you have already seen? A hash map helps.");
            hints.push("A hash map from value to index turns the inner loop into a lookup.");
        } else {
            hints.push("Your approach is on track. Make sure you handle all edge cases.");
        }
    } else if problem.contains("palindrome") {
        hints.push("Compare characters from both ends moving inward (two pointers).");
        hints.push("Skip or normalize characters that should not count before comparing.");
    } else if problem.contains("sorted") || code.to_lowercase().contains("sorted") {
        hints.push("Sorted data is a hint: consider binary search for O(log n) lookups.");
        hints.push("With sorted input, two pointers from both ends often avoid a nested loop.");
    } else if problem.contains("subarray") || problem.contains("substring") {
        hints.push("Subarray problems often use a sliding window or prefix sums.");
    }

    match complexity {
        Complexity::Quadratic | Complexity::Cubic => {
            hints.push("Your solution works but is slow for large inputs. Can you trade space for time?");
            hints.push("Replace the inner loop with a hash map or set lookup.");
        }
        Complexity::Exponential => {
            hints.push("Recursive calls repeat the same work. Cache results you have already computed.");
        }
        Complexity::Linear => {
            hints.push("Good linear time solution. Now optimize space if possible.");
        }
        _ => {}
    }

    hints
}

/// Picks one hint per request from the applicable candidates.
///
/// The generator is injectable so callers can reproduce a selection.
pub struct HintSelector {
    rng: StdRng,
}

impl HintSelector {
    /// A selector seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// A selector that makes the same choices for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Choose a hint for `code` solving `problem_title`.
    pub fn select(&mut self, problem_title: &str, code: &str, complexity: Complexity) -> &'static str {
        candidate_hints(problem_title, code, complexity)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FALLBACK_HINT)
    }
}

impl Default for HintSelector {
    fn default() -> Self {
        Self::new()
    }
}
