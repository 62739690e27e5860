//! Line-oriented views over a source text.

/// One newline-delimited line of the analyzed source.
#[derive(Debug, Clone, Copy)]
pub struct SourceLine<'a> {
    /// 1-based line number.
    pub number: usize,
    /// The line without its trailing `\r`.
    pub text: &'a str,
    /// The line with surrounding whitespace removed.
    pub trimmed: &'a str,
}

impl<'a> SourceLine<'a> {
    pub fn is_blank(&self) -> bool {
        self.trimmed.is_empty()
    }

    pub fn starts_with_any(&self, prefixes: &[&str]) -> bool {
        prefixes.iter().any(|p| self.trimmed.starts_with(p))
    }

    /// Width of the leading whitespace, with tabs advancing to the next
    /// multiple of eight.
    pub fn indent_width(&self) -> usize {
        let mut width = 0;
        for ch in self.text.chars() {
            match ch {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                _ => break,
            }
        }
        width
    }

    /// 1-based column of a byte offset into `text`.
    pub fn column_of(&self, byte_idx: usize) -> usize {
        char_column(self.text, byte_idx)
    }

    /// 1-based column just past the last non-whitespace character of `code`,
    /// where `code` is a prefix of `text`.
    pub fn end_column(&self, code: &str) -> usize {
        code.trim_end().chars().count() + 1
    }
}

/// Split a source text into lines, the same way `str::split('\n')` does.
pub fn lines(code: &str) -> impl Iterator<Item = SourceLine<'_>> {
    code.split('\n').enumerate().map(|(i, raw)| {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        SourceLine {
            number: i + 1,
            text,
            trimmed: text.trim(),
        }
    })
}

/// Position of a line relative to multi-line comments or strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Starts and ends outside any block.
    Code,
    /// Starts outside but ends inside an open block.
    Opens,
    /// Starts inside an open block.
    Inside,
}

impl BlockState {
    pub fn is_code(self) -> bool {
        self == BlockState::Code
    }
}

/// Classify every line against `(open, close)` block delimiters such as
/// `/* */` or Python triple quotes.
pub fn block_states(code: &str, delimiters: &[(&str, &str)]) -> Vec<BlockState> {
    let mut states = Vec::new();
    let mut waiting_for: Option<&str> = None;

    for line in code.split('\n') {
        let started_inside = waiting_for.is_some();
        let mut rest = line;
        loop {
            match waiting_for {
                Some(close) => match rest.find(close) {
                    Some(i) => {
                        rest = &rest[i + close.len()..];
                        waiting_for = None;
                    }
                    None => break,
                },
                None => {
                    let next = delimiters
                        .iter()
                        .filter_map(|(open, close)| {
                            find_outside_strings(rest, open).map(|i| (i, *open, *close))
                        })
                        .min_by_key(|(i, _, _)| *i);
                    match next {
                        Some((i, open, close)) => {
                            rest = &rest[i + open.len()..];
                            waiting_for = Some(close);
                        }
                        None => break,
                    }
                }
            }
        }
        states.push(if started_inside {
            BlockState::Inside
        } else if waiting_for.is_some() {
            BlockState::Opens
        } else {
            BlockState::Code
        });
    }

    states
}

/// Byte offset of the first `pattern` that does not start inside a string
/// literal.
fn find_outside_strings(text: &str, pattern: &str) -> Option<usize> {
    text.match_indices(pattern)
        .map(|(i, _)| i)
        .find(|&i| !is_inside_string_literal(text, i))
}

/// Number of newline-delimited segments, the `lines_of_code` metric.
pub fn segment_count(code: &str) -> usize {
    code.split('\n').count()
}

/// 1-based character column for a byte offset.
pub fn char_column(text: &str, byte_idx: usize) -> usize {
    let end = byte_idx.min(text.len());
    text.get(..end).map(|s| s.chars().count()).unwrap_or(0) + 1
}

/// Remove a trailing line comment that starts outside any string literal.
pub fn strip_line_comment<'a>(text: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return text;
    }
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            _ if text[idx..].starts_with(marker) => return &text[..idx],
            _ => {}
        }
    }
    text
}

/// Check if a position in a line falls within a string literal.
/// Supports double-quoted, single-quoted, and backtick strings with escape handling.
pub fn is_inside_string_literal(line: &str, pos: usize) -> bool {
    let mut in_string = false;
    let mut string_char = None;
    let mut escaped = false;

    for (i, ch) in line.char_indices() {
        if i >= pos {
            return in_string;
        }

        if escaped {
            escaped = false;
            continue;
        }

        if ch == '\\' && in_string {
            escaped = true;
            continue;
        }

        if ch == '"' || ch == '\'' || ch == '`' {
            if !in_string {
                in_string = true;
                string_char = Some(ch);
            } else if Some(ch) == string_char {
                in_string = false;
                string_char = None;
            }
        }
    }

    in_string
}

/// Byte offset of the first `target` character that sits outside string
/// literals and outside any `()`, `[]` or `{}` nesting.
pub fn find_top_level(text: &str, target: char) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if c == target && depth <= 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Net count of opening minus closing brackets outside string literals.
pub fn open_bracket_balance(text: &str) -> i32 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// The leading identifier-like word of a trimmed line.
pub fn first_word(trimmed: &str) -> &str {
    let end = trimmed
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

/// Identifier tokens of a line with their byte offsets.
pub fn identifiers(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, ch) in text.char_indices() {
        let ident = ch.is_alphanumeric() || ch == '_';
        match (ident, start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                out.push((s, &text[s..idx]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}

/// Whether `word` appears in `text` as a whole identifier.
pub fn contains_word(text: &str, word: &str) -> bool {
    identifiers(text).iter().any(|(_, w)| *w == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_match_split() {
        let code = "a\r\n\nb";
        let collected: Vec<_> = lines(code).collect();
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0].text, "a");
        assert!(collected[1].is_blank());
        assert_eq!(collected[2].number, 3);
        assert_eq!(segment_count(code), 3);
        assert_eq!(segment_count(""), 1);
    }

    #[test]
    fn test_strip_line_comment_respects_strings() {
        assert_eq!(strip_line_comment("x = 1  # note", "#"), "x = 1  ");
        assert_eq!(strip_line_comment("s = \"#nope\"", "#"), "s = \"#nope\"");
        assert_eq!(strip_line_comment("url = \"http://x\"; // y", "//"), "url = \"http://x\"; ");
    }

    #[test]
    fn test_is_inside_string_literal() {
        let line = r#"let s = "eval(x)"; eval(y)"#;
        assert!(is_inside_string_literal(line, line.find("eval").unwrap()));
        assert!(!is_inside_string_literal(line, line.rfind("eval").unwrap()));
    }

    #[test]
    fn test_find_top_level() {
        assert_eq!(find_top_level("if x: y", ':'), Some(4));
        assert_eq!(find_top_level("if d[{1: 2}]", ':'), None);
        assert_eq!(find_top_level("x = ':'", ':'), None);
    }

    #[test]
    fn test_block_states() {
        let code = "a /* b */ c\n/* open\ninside\nclose */ d\ne";
        let states = block_states(code, &[("/*", "*/")]);
        assert_eq!(
            states,
            vec![
                BlockState::Code,
                BlockState::Opens,
                BlockState::Inside,
                BlockState::Inside,
                BlockState::Code,
            ]
        );

        let py = "def f():\n    \"\"\"Doc.\"\"\"\n    \"\"\"Long\n    doc\"\"\"\n    return 1";
        let states = block_states(py, &[("\"\"\"", "\"\"\"")]);
        assert_eq!(states[1], BlockState::Code);
        assert_eq!(states[2], BlockState::Opens);
        assert_eq!(states[3], BlockState::Inside);
        assert_eq!(states[4], BlockState::Code);
    }

    #[test]
    fn test_block_delimiter_inside_string_is_ignored() {
        let code = "printf(\"/*\");\nint x = 1;\n/* real\n*/";
        let states = block_states(code, &[("/*", "*/")]);
        assert_eq!(
            states,
            vec![
                BlockState::Code,
                BlockState::Code,
                BlockState::Opens,
                BlockState::Inside,
            ]
        );
    }

    #[test]
    fn test_indent_width_expands_tabs() {
        let line = lines("\t  x").next().unwrap();
        assert_eq!(line.indent_width(), 10);
    }

    #[test]
    fn test_identifiers() {
        let ids = identifiers("sytem.out.printlm(x_1)");
        let words: Vec<_> = ids.iter().map(|(_, w)| *w).collect();
        assert_eq!(words, vec!["sytem", "out", "printlm", "x_1"]);
        assert_eq!(ids[2].0, 10);
        assert!(contains_word("for x in y", "for"));
        assert!(!contains_word("format(x)", "for"));
    }
}
