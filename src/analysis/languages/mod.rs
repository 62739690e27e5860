//! Language rule tables and the module registry.

mod c_family;
mod csharp;
mod go;
mod java;
mod javascript;
mod python;
mod rust_lang;

pub use c_family::{C, CPP};
pub use csharp::CSHARP;
pub use go::GO;
pub use java::JAVA;
pub use javascript::{JAVASCRIPT, TYPESCRIPT};
pub use python::PYTHON;
pub use rust_lang::RUST;

use once_cell::sync::OnceCell;
use phf::phf_map;

use super::table::{LanguageRules, TableRuleModule};
use super::RuleModule;

/// Rule tables in registration order.
static TABLES: [&LanguageRules; 9] = [
    &PYTHON,
    &JAVASCRIPT,
    &TYPESCRIPT,
    &JAVA,
    &C,
    &CPP,
    &CSHARP,
    &GO,
    &RUST,
];

/// Static storage for the registered modules.
static MODULES: OnceCell<Vec<TableRuleModule>> = OnceCell::new();

/// Alternative spellings accepted for language identifiers.
static ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "py" => "python",
    "python3" => "python",
    "js" => "javascript",
    "node" => "javascript",
    "ts" => "typescript",
    "c++" => "cpp",
    "cc" => "cpp",
    "cxx" => "cpp",
    "c#" => "csharp",
    "cs" => "csharp",
    "golang" => "go",
    "rs" => "rust",
};

/// Register all rule modules.
///
/// This is idempotent - calling it multiple times is safe.
pub fn register_modules() {
    modules();
}

fn modules() -> &'static [TableRuleModule] {
    MODULES
        .get_or_init(|| TABLES.iter().map(|r| TableRuleModule::new(*r)).collect())
        .as_slice()
}

/// Lower-case, trim and resolve aliases.
pub fn normalize_language(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    match ALIASES.get(lowered.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => lowered,
    }
}

/// Get the module for a canonical language ID.
pub fn get_module(lang_id: &str) -> Option<&'static dyn RuleModule> {
    modules()
        .iter()
        .find(|m| m.rules().id == lang_id)
        .map(|m| m as &'static dyn RuleModule)
}

/// Get the module for a file extension (without the dot).
pub fn module_for_extension(ext: &str) -> Option<&'static dyn RuleModule> {
    modules()
        .iter()
        .find(|m| m.rules().handles_extension(ext))
        .map(|m| m as &'static dyn RuleModule)
}

/// Rule tables of all registered languages, in registration order.
pub fn language_tables() -> &'static [&'static LanguageRules] {
    &TABLES
}

/// Canonical IDs of all registered languages.
pub fn registered_languages() -> Vec<&'static str> {
    TABLES.iter().map(|r| r.id).collect()
}

/// All file extensions with a registered module.
pub fn registered_extensions() -> Vec<&'static str> {
    TABLES
        .iter()
        .flat_map(|r| r.extensions.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Capability;

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language(" Python "), "python");
        assert_eq!(normalize_language("C++"), "cpp");
        assert_eq!(normalize_language("C#"), "csharp");
        assert_eq!(normalize_language("golang"), "go");
        assert_eq!(normalize_language("JS"), "javascript");
        assert_eq!(normalize_language("brainfuck"), "brainfuck");
    }

    #[test]
    fn test_get_module() {
        register_modules();
        register_modules();
        let module = get_module("cpp").unwrap();
        assert_eq!(module.display_name(), "C++");
        assert_eq!(module.capability(), Capability::Full);
        assert_eq!(get_module("go").unwrap().capability(), Capability::Partial);
        assert_eq!(get_module("csharp").unwrap().capability(), Capability::Partial);
        assert!(get_module("php").is_none());
    }

    #[test]
    fn test_module_for_extension() {
        assert_eq!(module_for_extension("py").unwrap().language_id(), "python");
        assert_eq!(module_for_extension("TSX").unwrap().language_id(), "typescript");
        assert_eq!(module_for_extension("h").unwrap().language_id(), "c");
        assert!(module_for_extension("rb").is_none());
    }

    #[test]
    fn test_registered_languages() {
        assert_eq!(
            registered_languages(),
            vec!["python", "javascript", "typescript", "java", "c", "cpp", "csharp", "go", "rust"]
        );
        assert!(registered_extensions().contains(&"java"));
    }
}
