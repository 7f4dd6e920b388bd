//! The registry of compiled tree-sitter queries this crate runs over
//! parsed source. Each query is an s-expression file packaged with the
//! tool, compiled once at startup, and run against a parsed tree to
//! yield a stream of matches. Folding a match into a domain value is the
//! module processor's job, not this registry's — this module only owns
//! compiling queries and walking the cursor.

use std::collections::HashMap;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};

use crate::error::{AnalyzeError, Result};
use crate::parser_pool::Language;

const CLASSES_QUERY: &str = include_str!("classes.scm");
const DECORATORS_QUERY: &str = include_str!("decorators.scm");
const MEMBERS_QUERY: &str = include_str!("members.scm");
const JSDOC_QUERY: &str = include_str!("jsdoc.scm");
const HTML_DEMO_QUERY: &str = include_str!("html_demo.scm");

/// One captured node, kept as the live `tree_sitter::Node` rather than a
/// pre-extracted copy: folding often needs more structure than a single
/// capture exposes (a field's modifiers, a method's parameter list), and
/// the node gives the processor that without a second query pass. Byte
/// spans (`node.start_byte()`/`node.end_byte()`) are what let later merge
/// phases attribute facts back to precise source locations.
#[derive(Debug, Clone, Copy)]
pub struct Capture<'t> {
    pub node: Node<'t>,
}

impl<'t> Capture<'t> {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.node.utf8_text(source.as_bytes()).unwrap_or_default()
    }

    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    pub fn start_byte(&self) -> usize {
        self.node.start_byte()
    }

    pub fn end_byte(&self) -> usize {
        self.node.end_byte()
    }
}

/// One query match: every capture name mapped to the (possibly several)
/// nodes it captured, in query order.
pub type Match<'t> = HashMap<String, Vec<Capture<'t>>>;

fn compiled(name: &'static str, language: tree_sitter::Language, source: &str) -> Result<Query> {
    Query::new(&language, source).map_err(|source| AnalyzeError::QueryCompile { name, source })
}

/// Compiles every registered query once; holds no per-file state so a
/// single instance is shared read-only across worker threads.
pub struct QueryRegistry {
    classes_ts: Query,
    classes_js: Query,
    decorators_ts: Query,
    decorators_js: Query,
    members_ts: Query,
    members_js: Query,
    jsdoc_ts: Query,
    jsdoc_js: Query,
    html_demo: Query,
}

impl QueryRegistry {
    pub fn new() -> Result<Self> {
        let ts_lang: tree_sitter::Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
        let js_lang: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        let html_lang: tree_sitter::Language = tree_sitter_html::LANGUAGE.into();

        Ok(Self {
            classes_ts: compiled("classes(ts)", ts_lang.clone(), CLASSES_QUERY)?,
            classes_js: compiled("classes(js)", js_lang.clone(), CLASSES_QUERY)?,
            decorators_ts: compiled("decorators(ts)", ts_lang.clone(), DECORATORS_QUERY)?,
            decorators_js: compiled("decorators(js)", js_lang.clone(), DECORATORS_QUERY)?,
            members_ts: compiled("members(ts)", ts_lang.clone(), MEMBERS_QUERY)?,
            members_js: compiled("members(js)", js_lang.clone(), MEMBERS_QUERY)?,
            jsdoc_ts: compiled("jsdoc(ts)", ts_lang, JSDOC_QUERY)?,
            jsdoc_js: compiled("jsdoc(js)", js_lang, JSDOC_QUERY)?,
            html_demo: compiled("html_demo", html_lang, HTML_DEMO_QUERY)?,
        })
    }

    fn classes_for(&self, language: Language) -> &Query {
        match language {
            Language::TypeScript | Language::Tsx => &self.classes_ts,
            _ => &self.classes_js,
        }
    }

    fn decorators_for(&self, language: Language) -> &Query {
        match language {
            Language::TypeScript | Language::Tsx => &self.decorators_ts,
            _ => &self.decorators_js,
        }
    }

    fn members_for(&self, language: Language) -> &Query {
        match language {
            Language::TypeScript | Language::Tsx => &self.members_ts,
            _ => &self.members_js,
        }
    }

    fn jsdoc_for(&self, language: Language) -> &Query {
        match language {
            Language::TypeScript | Language::Tsx => &self.jsdoc_ts,
            _ => &self.jsdoc_js,
        }
    }

    /// Every `class_declaration` reachable from `node` (usually the tree
    /// root), with name and superclass expression when present.
    pub fn classes<'t>(&self, language: Language, node: Node<'t>, source: &str) -> Vec<Match<'t>> {
        run_query(self.classes_for(language), node, source)
    }

    /// Decorators whose nearest enclosing node is `node` — callers scope
    /// this to a single `class_declaration` (for class decorators) or a
    /// single field/method node (for member decorators) so results are
    /// never cross-attributed between declarations.
    pub fn decorators<'t>(&self, language: Language, node: Node<'t>, source: &str) -> Vec<Match<'t>> {
        run_query(self.decorators_for(language), node, source)
    }

    /// Field and method members inside a single `class_body` node.
    pub fn members<'t>(&self, language: Language, node: Node<'t>, source: &str) -> Vec<Match<'t>> {
        run_query(self.members_for(language), node, source)
    }

    pub fn jsdoc_comments<'t>(&self, language: Language, node: Node<'t>, source: &str) -> Vec<Match<'t>> {
        run_query(self.jsdoc_for(language), node, source)
    }

    pub fn html_demo_scripts<'t>(&self, node: Node<'t>, source: &str) -> Vec<Match<'t>> {
        run_query(&self.html_demo, node, source)
    }
}

impl Default for QueryRegistry {
    fn default() -> Self {
        Self::new().expect("bundled query sources always compile")
    }
}

/// Runs `query` over `node`'s subtree and folds each raw tree-sitter
/// match into the capture-name-keyed form the processor folds further.
/// Pure and deterministic: identical `(node, source)` always yields
/// identical output.
fn run_query<'t>(query: &Query, node: Node<'t>, source: &str) -> Vec<Match<'t>> {
    let mut cursor = QueryCursor::new();
    let names = query.capture_names();
    let mut out = Vec::new();
    let mut matches = cursor.matches(query, node, source.as_bytes());
    while let Some(m) = matches.next() {
        let mut folded: Match<'t> = HashMap::new();
        for capture in m.captures {
            let name = names[capture.index as usize].to_string();
            folded.entry(name).or_default().push(Capture { node: capture.node });
        }
        out.push(folded);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::ParserPool;

    #[test]
    fn classes_query_finds_name_and_superclass() {
        let registry = QueryRegistry::new().unwrap();
        let pool = ParserPool::new();
        let source = "class Foo extends HTMLElement {}";
        let tree = pool.parse(Language::TypeScript, source).unwrap();
        let matches = registry.classes(Language::TypeScript, tree.root_node(), source);
        let m = matches
            .iter()
            .find(|m| m.contains_key("class.name"))
            .expect("one class match");
        assert_eq!(m["class.name"][0].text(source), "Foo");
        assert_eq!(m["class.superclass"][0].text(source), "HTMLElement");
    }

    #[test]
    fn jsdoc_query_finds_block_comments() {
        let registry = QueryRegistry::new().unwrap();
        let pool = ParserPool::new();
        let source = "/** doc */\nclass Foo {}";
        let tree = pool.parse(Language::TypeScript, source).unwrap();
        let matches = registry.jsdoc_comments(Language::TypeScript, tree.root_node(), source);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["jsdoc.comment"][0].text(source), "/** doc */");
    }
}
