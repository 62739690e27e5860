//! Heuristic source-language detection.
//!
//! Used only to catch a declared language that does not match the code.
//! Signatures are checked in order and the first match wins, so the most
//! distinctive languages come first.

use super::{CodeIssue, IssueCategory, Severity};

/// Token signature of one language.
struct Signature {
    language: &'static str,
    /// At least one of these must occur.
    any: &'static [&'static str],
    /// None of these may occur.
    none: &'static [&'static str],
}

const SIGNATURES: &[Signature] = &[
    Signature {
        language: "rust",
        any: &["fn main", "println!", "let mut ", "use std::", "impl ", "pub fn "],
        none: &[],
    },
    Signature {
        language: "go",
        any: &["package main", "func main", "fmt.Print", "import \"fmt\""],
        none: &[],
    },
    Signature {
        language: "php",
        any: &["<?php", "<?=", "$_GET", "$_POST"],
        none: &[],
    },
    Signature {
        language: "csharp",
        any: &[
            "Console.Write",
            "Console.ReadLine",
            "using System;",
            "using System.",
            "static void Main(",
        ],
        none: &[],
    },
    Signature {
        language: "java",
        any: &[
            "System.out",
            "public class",
            "public static void main",
            "System.",
            "println",
            "package ",
        ],
        none: &[],
    },
    Signature {
        language: "python",
        any: &["def ", "import ", "print(", "__init__", "__name__", "self.", "elif "],
        none: &[";", "const ", "let ", "function ", "=>", "console."],
    },
    Signature {
        language: "cpp",
        any: &["iostream", "std::", "cout", "cin >>", "cin>>", "namespace std"],
        none: &[],
    },
    Signature {
        language: "c",
        any: &["#include", "printf", "scanf", "stdio.h", "main()"],
        none: &[],
    },
    Signature {
        language: "javascript",
        any: &[
            "console.log",
            "function ",
            "const ",
            "let ",
            "var ",
            "=>",
            "document.",
            "window.",
        ],
        // Typed declarations and other languages' keywords that share
        // `const`/`let`/`var` with JavaScript.
        none: &[
            "int ", "void ", "char ", "double ", "float ", "#include", "func ", "fn ", "print(",
        ],
    },
    Signature {
        language: "ruby",
        any: &["puts ", "require '", "attr_accessor", " do |", "\nend"],
        none: &[],
    },
    Signature {
        language: "swift",
        any: &["import Swift", "import UIKit", "import Foundation", "func ", "guard let"],
        none: &[],
    },
];

/// Pairs (declared, detected) that are not a mismatch.
const COMPATIBLE: &[(&str, &str)] = &[
    ("typescript", "javascript"),
    ("cpp", "c"),
];

/// Whether `token` occurs in `code`. A token starting with a word
/// character must not continue a longer word (`int ` does not match
/// `paint `).
fn contains_token(code: &str, token: &str) -> bool {
    let word_start = token.starts_with(|c: char| c.is_alphanumeric() || c == '_');
    code.match_indices(token).any(|(i, _)| {
        !word_start
            || code[..i]
                .chars()
                .next_back()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_'))
    })
}

/// Guess the language of `code`.
pub fn detect(code: &str) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|sig| {
            sig.any.iter().any(|t| contains_token(code, t))
                && !sig.none.iter().any(|t| contains_token(code, t))
        })
        .map(|sig| sig.language)
}

/// Languages the detector can recognize.
pub fn detectable_languages() -> impl Iterator<Item = &'static str> {
    SIGNATURES.iter().map(|s| s.language)
}

/// Compare the declared language with the detected one.
///
/// Returns the detected language when the two disagree. A declared language
/// the detector cannot recognize never mismatches.
pub fn mismatch(code: &str, declared: &str) -> Option<&'static str> {
    let known = detectable_languages().any(|l| l == declared)
        || COMPATIBLE.iter().any(|(d, _)| *d == declared);
    if !known {
        return None;
    }
    let detected = detect(code)?;
    if detected == declared || COMPATIBLE.contains(&(declared, detected)) {
        return None;
    }
    Some(detected)
}

/// The synthetic issue reported for a language mismatch.
pub fn mismatch_issue(declared: &str, detected: &str) -> CodeIssue {
    let declared = declared.to_uppercase();
    let detected = detected.to_uppercase();
    CodeIssue::new(
        IssueCategory::Logic,
        Severity::Critical,
        format!(
            "Language mismatch: Code appears to be {} but you selected {}",
            detected, declared
        ),
    )
    .explain(format!(
        "The code syntax suggests this is {} code, but {} was selected as the language. \
         The analysis below applies {} rules and may be misleading.",
        detected, declared, declared
    ))
    .suggest(format!(
        "Change the language selection to '{}' to get proper analysis",
        detected
    ))
    .fix(format!("Select {} as the language", detected))
    .confidence(0.9)
    .at(1, 1)
    .tags(["language_mismatch", "configuration"])
}
