//! Rule modules: per-language analysis strategies.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌───────────────┐
//! │ LanguageRules   │────▶│ TableRuleModule  │────▶│ Issues,       │
//! │ (static tables) │     │ (shared checks + │     │ Metrics,      │
//! └─────────────────┘     │  language hooks) │     │ Suggestions,  │
//!                         └──────────────────┘     │ Recommend.    │
//!                                                  └───────────────┘
//!   unregistered language ──▶ GenericRuleModule (balance checks only)
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/` with a `pub static`
//!    [`LanguageRules`] built on [`LanguageRules::BASE`]
//! 2. Fill in the data fields (terminator, comments, requirements, ...)
//! 3. Add hook functions for checks the shared ones do not cover
//! 4. Register the table in `languages/mod.rs`

mod generic;
pub mod languages;
pub mod metrics;
mod table;
mod traits;

pub use generic::GenericRuleModule;
pub use languages::{
    get_module, language_tables, module_for_extension, normalize_language, register_modules,
    registered_extensions, registered_languages,
};
pub use table::{
    critical_fix_suggestion, LanguageRules, TableRuleModule, DEFAULT_MAX_LINE_LENGTH,
    LARGE_FILE_LINES,
};
pub use traits::{Capability, RuleModule};
