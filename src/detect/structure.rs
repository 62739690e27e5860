//! Whole-file structural requirements (entry points, headers, declarations).

use super::{CodeIssue, IssueCategory, Severity};

/// A file-level requirement.
///
/// When the source contains any of `when_any` (or `when_any` is empty) it
/// must also contain one of `requires_any`; otherwise one issue is reported
/// at line 1. `{lang}` in the texts is replaced by the language's display
/// name.
#[derive(Debug, Clone, Copy)]
pub struct Requirement {
    pub when_any: &'static [&'static str],
    pub requires_any: &'static [&'static str],
    pub severity: Severity,
    pub message: &'static str,
    pub explanation: &'static str,
    pub suggestion: &'static str,
    pub example_fix: &'static str,
    pub tag: &'static str,
}

impl Requirement {
    fn applies(&self, code: &str) -> bool {
        self.when_any.is_empty() || self.when_any.iter().any(|t| code.contains(t))
    }

    fn satisfied(&self, code: &str) -> bool {
        self.requires_any.iter().any(|t| code.contains(t))
    }
}

pub fn check_requirements(
    code: &str,
    requirements: &[Requirement],
    display_name: &str,
) -> Vec<CodeIssue> {
    requirements
        .iter()
        .filter(|r| r.applies(code) && !r.satisfied(code))
        .map(|r| {
            let fill = |s: &str| s.replace("{lang}", display_name);
            CodeIssue::new(IssueCategory::Syntax, r.severity, fill(r.message))
                .explain(fill(r.explanation))
                .suggest(fill(r.suggestion))
                .fix(r.example_fix)
                .at(1, 1)
                .tags(["structure", r.tag])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: Requirement = Requirement {
        when_any: &[],
        requires_any: &["main("],
        severity: Severity::Critical,
        message: "Missing main() function - {lang} programs must have a main() function",
        explanation: "Execution starts at main().",
        suggestion: "Add a main() function",
        example_fix: "int main() {\n    return 0;\n}",
        tag: "entry_point",
    };

    const IOSTREAM: Requirement = Requirement {
        when_any: &["cout"],
        requires_any: &["#include <iostream>", "#include<iostream>"],
        severity: Severity::Critical,
        message: "Missing required header: #include <iostream>",
        explanation: "",
        suggestion: "",
        example_fix: "#include <iostream>",
        tag: "missing_header",
    };

    #[test]
    fn test_unconditional_requirement() {
        let issues = check_requirements("int x;", &[MAIN], "C++");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Missing main() function - C++ programs must have a main() function"
        );
        assert_eq!(issues[0].location(), Some((1, 1)));
        assert!(issues[0].has_tag("entry_point"));
    }

    #[test]
    fn test_conditional_requirement() {
        assert!(check_requirements("int main() {}", &[IOSTREAM], "C++").is_empty());
        assert_eq!(
            check_requirements("int main() { cout << 1; }", &[IOSTREAM], "C++").len(),
            1
        );
        assert!(check_requirements(
            "#include <iostream>\nint main() { cout << 1; }",
            &[MAIN, IOSTREAM],
            "C++"
        )
        .is_empty());
    }
}
