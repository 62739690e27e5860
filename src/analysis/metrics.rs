//! Line metrics shared by all table-driven modules.

use crate::detect::source::{identifiers, lines, segment_count, BlockState};
use crate::detect::CodeMetrics;

/// Line counts and average length.
///
/// `comment_lines` counts lines starting with a comment prefix plus lines
/// inside multi-line comment blocks.
pub fn line_metrics(code: &str, comment_prefixes: &[&str], states: &[BlockState]) -> CodeMetrics {
    let total = segment_count(code);
    let mut non_empty = 0usize;
    let mut comments = 0usize;
    let mut total_len = 0usize;

    for (idx, line) in lines(code).enumerate() {
        total_len += line.text.chars().count();
        if line.is_blank() {
            continue;
        }
        non_empty += 1;
        let in_block = states.get(idx).map(|s| !s.is_code()).unwrap_or(false);
        if in_block || line.starts_with_any(comment_prefixes) {
            comments += 1;
        }
    }

    let average = total_len as f64 / total as f64;

    let mut metrics = CodeMetrics::new();
    metrics.insert("total_lines", total);
    metrics.insert("lines_of_code", total);
    metrics.insert("non_empty_lines", non_empty);
    metrics.insert("blank_lines", total - non_empty);
    metrics.insert("comment_lines", comments);
    metrics.insert("average_line_length", (average * 100.0).round() / 100.0);
    metrics
}

/// Number of occurrences of any of `words` as whole identifiers in code lines.
pub fn count_words(code: &str, words: &[&str], states: &[BlockState]) -> usize {
    lines(code)
        .enumerate()
        .filter(|(idx, _)| states.get(*idx).map(|s| s.is_code()).unwrap_or(true))
        .map(|(_, line)| {
            identifiers(line.text)
                .iter()
                .filter(|(_, w)| words.contains(w))
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::source::block_states;

    #[test]
    fn test_line_metrics() {
        let code = "# header\nx = 1\n\n  # note\ny = 22";
        let states = block_states(code, &[]);
        let m = line_metrics(code, &["#"], &states);
        assert_eq!(m.number("total_lines"), Some(5.0));
        assert_eq!(m.number("lines_of_code"), Some(5.0));
        assert_eq!(m.number("non_empty_lines"), Some(4.0));
        assert_eq!(m.number("blank_lines"), Some(1.0));
        assert_eq!(m.number("comment_lines"), Some(2.0));
        assert_eq!(m.number("average_line_length"), Some(5.4));
    }

    #[test]
    fn test_block_comments_count_as_comments() {
        let code = "/*\n * doc\n */\nint x;";
        let states = block_states(code, &[("/*", "*/")]);
        let m = line_metrics(code, &["//"], &states);
        assert_eq!(m.number("comment_lines"), Some(3.0));
    }

    #[test]
    fn test_count_words() {
        let code = "if a and b:\n    for x in y:\n        pass\n\"\"\"if while\"\"\"";
        let states = block_states(code, &[]);
        assert_eq!(count_words(code, &["if", "for", "and"], &states), 4);
    }
}
