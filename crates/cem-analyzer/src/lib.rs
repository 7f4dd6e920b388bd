//! Tree-sitter-backed source analysis: parses TS/JS/HTML/CSS source
//! files into `cem_model::Module` values. Owns parsing
//! (`parser_pool`), the declarative query layer (`queries`), JSDoc
//! folding (`jsdoc`), generic node introspection (`js_syntax`), built-in
//! type curation (`builtins`), per-file orchestration
//! (`module_processor`), and the two auxiliary passes that enrich an
//! already-built module: design tokens (`design_tokens`) and demo
//! discovery (`demo_discoverer`). Inheritance propagation
//! (`inheritance`) operates across a whole `Package` once every module
//! in it has been processed, so it lives here too rather than in
//! `cem-generate`.

pub mod builtins;
pub mod demo_discoverer;
pub mod design_tokens;
pub mod error;
pub mod inheritance;
pub mod js_syntax;
pub mod jsdoc;
pub mod module_processor;
pub mod parser_pool;
pub mod queries;

pub use error::{AnalyzeError, Result};
pub use module_processor::ModuleProcessor;
pub use parser_pool::{Language, ParserPool};
pub use queries::QueryRegistry;

/// The two shapes a `@deprecated` JSDoc tag can take, pending conversion
/// into `cem_model::Deprecated` once it is attached to a declaration or
/// member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeprecatedTag {
    Flag,
    Reason(String),
}

impl From<DeprecatedTag> for cem_model::Deprecated {
    fn from(tag: DeprecatedTag) -> Self {
        match tag {
            DeprecatedTag::Flag => cem_model::Deprecated::Flag(true),
            DeprecatedTag::Reason(reason) => cem_model::Deprecated::Reason(reason),
        }
    }
}
