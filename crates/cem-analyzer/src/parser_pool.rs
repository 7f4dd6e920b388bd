//! A small pool of reusable tree-sitter parsers, one per source language.
//! Constructing a `tree_sitter::Parser` and setting its grammar is cheap
//! but not free; workers borrow a parser from the pool for the duration
//! of one file and return it afterward instead of building a fresh one
//! per call.

use std::sync::Mutex;

use tree_sitter::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
    Html,
    Css,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            "html" | "htm" => Some(Language::Html),
            "css" => Some(Language::Css),
            _ => None,
        }
    }

    fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::Html => tree_sitter_html::LANGUAGE.into(),
            Language::Css => tree_sitter_css::LANGUAGE.into(),
        }
    }
}

struct LanguagePool {
    language: Language,
    idle: Mutex<Vec<Parser>>,
}

impl LanguagePool {
    fn new(language: Language) -> Self {
        Self {
            language,
            idle: Mutex::new(Vec::new()),
        }
    }

    fn acquire(&self) -> Parser {
        if let Some(parser) = self.idle.lock().unwrap().pop() {
            return parser;
        }
        let mut parser = Parser::new();
        parser
            .set_language(&self.language.grammar())
            .expect("bundled grammar is always a valid tree-sitter language");
        parser
    }

    fn release(&self, parser: Parser) {
        self.idle.lock().unwrap().push(parser);
    }
}

/// Pools parsers for every supported language; safe to share across worker
/// threads.
pub struct ParserPool {
    typescript: LanguagePool,
    tsx: LanguagePool,
    javascript: LanguagePool,
    html: LanguagePool,
    css: LanguagePool,
}

impl ParserPool {
    pub fn new() -> Self {
        Self {
            typescript: LanguagePool::new(Language::TypeScript),
            tsx: LanguagePool::new(Language::Tsx),
            javascript: LanguagePool::new(Language::JavaScript),
            html: LanguagePool::new(Language::Html),
            css: LanguagePool::new(Language::Css),
        }
    }

    fn pool(&self, language: Language) -> &LanguagePool {
        match language {
            Language::TypeScript => &self.typescript,
            Language::Tsx => &self.tsx,
            Language::JavaScript => &self.javascript,
            Language::Html => &self.html,
            Language::Css => &self.css,
        }
    }

    /// Parses `source` with the pooled parser for `language`, returning the
    /// parser to the pool before returning. Identical bytes always produce
    /// an identical tree.
    pub fn parse(&self, language: Language, source: &str) -> Option<tree_sitter::Tree> {
        let pool = self.pool(language);
        let mut parser = pool.acquire();
        let tree = parser.parse(source, None);
        pool.release(parser);
        tree
    }
}

impl Default for ParserPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typescript_class() {
        let pool = ParserPool::new();
        let tree = pool
            .parse(Language::TypeScript, "class Foo extends HTMLElement {}")
            .unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn reused_parser_yields_identical_tree_shape() {
        let pool = ParserPool::new();
        let source = "class Foo {}";
        let first = pool.parse(Language::TypeScript, source).unwrap();
        let second = pool.parse(Language::TypeScript, source).unwrap();
        assert_eq!(
            first.root_node().to_sexp(),
            second.root_node().to_sexp()
        );
    }

    #[test]
    fn language_from_extension_covers_supported_set() {
        assert_eq!(Language::from_extension("TS"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("mjs"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("md"), None);
    }
}
