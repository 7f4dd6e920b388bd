//! Small, generic tree-sitter node introspection helpers shared by the
//! module processor's folding functions: modifier keywords, type
//! annotations, default-value text, and JS object-literal pairs. None of
//! these are specific to custom elements — they read plain TS/JS syntax
//! — which is why they live apart from `module_processor`'s domain
//! folding.

use std::collections::HashMap;

use tree_sitter::Node;

/// True if `node` has a direct child whose grammar kind is the literal
/// keyword `keyword` (e.g. `"static"`, `"readonly"`, `"get"`).
pub fn has_modifier(node: Node<'_>, keyword: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == keyword)
}

/// The accessibility modifier keyword (`public`/`protected`/`private`)
/// on a class member, if written explicitly.
pub fn accessibility_text<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| c.kind() == "accessibility_modifier")
        .and_then(|c| c.utf8_text(source.as_bytes()).ok())
}

/// The textual contents of a `type_annotation` child (the part after
/// `:`), if the member or parameter carries one.
pub fn type_annotation_text<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    let mut cursor = node.walk();
    let annotation = node
        .children(&mut cursor)
        .find(|c| c.kind() == "type_annotation")?;
    let mut inner_cursor = annotation.walk();
    let inner = annotation
        .children(&mut inner_cursor)
        .find(|c| c.kind() != ":")?;
    inner.utf8_text(source.as_bytes()).ok()
}

/// A field/variable's initializer text (the right-hand side of `=`), via
/// the grammar's `value` field when present.
pub fn value_field_text<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    node.child_by_field_name("value")
        .and_then(|v| v.utf8_text(source.as_bytes()).ok())
}

/// The member/declaration name, trying the common field names across the
/// JS and TS grammars' field/method/variable node shapes.
pub fn name_field_text<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    for field in ["name", "property"] {
        if let Some(n) = node.child_by_field_name(field) {
            return n.utf8_text(source.as_bytes()).ok();
        }
    }
    None
}

/// Strips the surrounding quotes from a string-literal node's text.
pub fn unquote(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')));
    trimmed.unwrap_or(text).to_string()
}

/// Finds the first string-literal descendant of `node` and returns its
/// unquoted text — used to read a decorator's single string argument,
/// e.g. `@customElement('my-element')`.
pub fn first_string_literal(node: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if matches!(current.kind(), "string" | "template_string") {
            return current
                .utf8_text(source.as_bytes())
                .ok()
                .map(unquote);
        }
        stack.extend(current.children(&mut cursor));
    }
    None
}

/// Walks the first `object`/`object_pattern` literal reachable from
/// `node` and returns its `pair` entries as raw key/value source text —
/// used to read decorator option objects like
/// `@property({ type: Boolean, reflect: true })`.
pub fn first_object_literal_pairs(node: Node<'_>, source: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let mut cursor = node.walk();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.kind() == "object" {
            let mut pair_cursor = current.walk();
            for pair in current
                .children(&mut pair_cursor)
                .filter(|c| c.kind() == "pair")
            {
                let key = pair
                    .child_by_field_name("key")
                    .and_then(|k| k.utf8_text(source.as_bytes()).ok())
                    .map(|k| unquote(k.trim()));
                let value = pair
                    .child_by_field_name("value")
                    .and_then(|v| v.utf8_text(source.as_bytes()).ok())
                    .map(str::to_string);
                if let (Some(key), Some(value)) = (key, value) {
                    out.insert(key, value);
                }
            }
            return out;
        }
        stack.extend(current.children(&mut cursor));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::{Language, ParserPool};

    #[test]
    fn reads_object_literal_pairs_from_decorator_arguments() {
        let pool = ParserPool::new();
        let source = "class X { @property({type: Boolean, reflect: true}) open; }";
        let tree = pool.parse(Language::TypeScript, source).unwrap();
        let root = tree.root_node();
        let decorator = find_kind(root, "decorator").unwrap();
        let pairs = first_object_literal_pairs(decorator, source);
        assert_eq!(pairs.get("reflect").map(String::as_str), Some("true"));
        assert_eq!(pairs.get("type").map(String::as_str), Some("Boolean"));
    }

    #[test]
    fn unquotes_single_and_double_quoted_strings() {
        assert_eq!(unquote("'my-element'"), "my-element");
        assert_eq!(unquote("\"my-element\""), "my-element");
    }

    fn find_kind<'t>(node: tree_sitter::Node<'t>, kind: &str) -> Option<tree_sitter::Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(found) = find_kind(child, kind) {
                return Some(found);
            }
        }
        None
    }
}
