//! Per-module orchestration: parse once, run the class,
//! member, decorator and JSDoc queries, fold JSDoc tags onto the
//! declarations/members they document, lift `LitElement`-ish classes
//! into `CustomElementDeclaration`s, and materialize `Attribute`s.
//!
//! Folding follows a fixed source-of-truth order for
//! conflicting facts: explicit JSDoc beats decorator options, which beat
//! a `static observedAttributes` entry, which beats the zero-value
//! default.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

use cem_model::{
    Attribute, ClassDeclaration, ClassMember, CssCustomProperty, CssPart, CssState,
    CustomElementDeclaration, Declaration, Demo, Event, Export, ExportKind, FieldMember,
    MethodMember, Module, Parameter, Privacy, Reference, Slot, TypeRef,
};

use crate::builtins;
use crate::error::{AnalyzeError, Result};
use crate::js_syntax;
use crate::jsdoc::{self, JsDocComment};
use crate::parser_pool::{Language, ParserPool};
use crate::queries::QueryRegistry;
use crate::DeprecatedTag;

/// Superclass names the processor treats as a `LitElement`-ish base when
/// deciding whether a plain class with a `render` method is really a
/// custom element. Cross-module transitive
/// resolution through re-exported base classes is a coordinator-level
/// concern this single-file processor does not attempt; see DESIGN.md.
const KNOWN_REACTIVE_BASES: &[&str] = &[
    "LitElement",
    "ReactiveElement",
    "HTMLElement",
];

pub struct ModuleProcessor<'r> {
    pool: &'r ParserPool,
    registry: &'r QueryRegistry,
}

impl<'r> ModuleProcessor<'r> {
    pub fn new(pool: &'r ParserPool, registry: &'r QueryRegistry) -> Self {
        Self { pool, registry }
    }

    /// Parses `source` (project-root-relative `path` is only used for
    /// error attribution and the resulting `Module.path`) and folds it
    /// into a `Module`.
    pub fn process(&self, path: &str, source: &str) -> Result<Module> {
        let ext = path.rsplit('.').next().unwrap_or_default();
        let language = Language::from_extension(ext)
            .ok_or_else(|| AnalyzeError::UnsupportedExtension(ext.to_string()))?;

        let tree = self
            .pool
            .parse(language, source)
            .ok_or_else(|| AnalyzeError::Syntax {
                path: path.to_string(),
                byte: 0,
            })?;

        if let Some(byte) = first_error_byte(tree.root_node()) {
            return Err(AnalyzeError::Syntax {
                path: path.to_string(),
                byte,
            });
        }

        let jsdocs = self.collect_jsdoc(language, tree.root_node(), source);

        let mut module = Module::new(path.to_string());
        for class_match in self.registry.classes(language, tree.root_node(), source) {
            let Some(decl_node) = class_match
                .get("class.declaration")
                .and_then(|v| v.first())
                .map(|c| c.node)
            else {
                continue;
            };
            let Some(name) = class_match
                .get("class.name")
                .and_then(|v| v.first())
                .map(|c| c.text(source).to_string())
            else {
                continue;
            };
            let body_node = class_match
                .get("class.body")
                .and_then(|v| v.first())
                .map(|c| c.node);
            let superclass_node = class_match
                .get("class.superclass")
                .and_then(|v| v.first())
                .map(|c| c.node);

            let declaration = self.fold_class(
                language,
                &name,
                decl_node,
                body_node,
                superclass_node,
                source,
                &jsdocs,
            );
            module.declarations.push(declaration);
        }

        fold_exports(&mut module, source);
        module.validate()?;
        Ok(module)
    }

    fn collect_jsdoc(&self, language: Language, root: Node<'_>, source: &str) -> Vec<JsDocComment> {
        let mut comments: Vec<JsDocComment> = self
            .registry
            .jsdoc_comments(language, root, source)
            .into_iter()
            .filter_map(|m| m.get("jsdoc.comment").and_then(|v| v.first()).copied())
            .filter(|c| c.text(source).starts_with("/**"))
            .map(|c| jsdoc::parse(c.text(source), c.start_byte(), c.end_byte()))
            .collect();
        comments.sort_by_key(|c| c.start_byte);
        comments
    }

    fn fold_class(
        &self,
        language: Language,
        name: &str,
        decl_node: Node<'_>,
        body_node: Option<Node<'_>>,
        superclass_node: Option<Node<'_>>,
        source: &str,
        jsdocs: &[JsDocComment],
    ) -> Declaration {
        let class_doc = find_attached_doc(jsdocs, decl_node.start_byte(), source);

        let superclass_name = superclass_node.map(|n| n.utf8_text(source.as_bytes()).unwrap_or_default());
        let superclass = superclass_name.map(|text| reference_for(base_identifier(text)));

        // `decorators()` is scoped to `decl_node`, but a class_declaration's
        // subtree also contains its body — filter to decorators that start
        // before the body so a field's `@property(...)` is never read as
        // a class-level decorator.
        let class_decorators: Vec<_> = self
            .registry
            .decorators(language, decl_node, source)
            .into_iter()
            .filter(|m| {
                let Some(cap) = m.get("decorator").and_then(|v| v.first()) else {
                    return true;
                };
                body_node
                    .map(|b| cap.start_byte() < b.start_byte())
                    .unwrap_or(true)
            })
            .collect();
        let custom_element_tag = decorator_string_arg(&class_decorators, "customElement", source);

        let (members, attributes) =
            self.fold_members(language, body_node, source, jsdocs);

        let tag_from_jsdoc = class_doc.and_then(|d| {
            d.tags_named("tag")
                .chain(d.tags_named("customelement"))
                .next()
                .and_then(|t| t.name.clone())
        });

        let has_render = members
            .iter()
            .any(|m| matches!(m, ClassMember::Method(method) if method.name == "render"));
        let is_reactive_base = superclass_name
            .map(base_identifier)
            .map(|s| KNOWN_REACTIVE_BASES.contains(&s))
            .unwrap_or(false);

        let tag_name = custom_element_tag.or(tag_from_jsdoc);

        if let Some(tag_name) = tag_name.filter(|t| !t.is_empty()) {
            let mut ce = CustomElementDeclaration {
                name: name.to_string(),
                tag_name,
                superclass,
                members,
                attributes,
                description: class_doc.and_then(|d| d.description.clone()),
                summary: class_doc.and_then(|d| d.summary.clone()),
                deprecated: class_doc
                    .and_then(|d| d.deprecated.clone())
                    .map(DeprecatedTag::into),
                ..Default::default()
            };
            fold_class_level_tags(&mut ce, class_doc);
            Declaration::CustomElement(ce)
        } else if has_render && is_reactive_base {
            // A Lit-ish class with a render method but no discoverable
            // tag name: this is kept as a plain class rather
            // than inventing a tag.
            Declaration::Class(ClassDeclaration {
                name: name.to_string(),
                superclass,
                members,
                description: class_doc.and_then(|d| d.description.clone()),
                summary: class_doc.and_then(|d| d.summary.clone()),
                deprecated: class_doc
                    .and_then(|d| d.deprecated.clone())
                    .map(DeprecatedTag::into),
            })
        } else {
            Declaration::Class(ClassDeclaration {
                name: name.to_string(),
                superclass,
                members,
                description: class_doc.and_then(|d| d.description.clone()),
                summary: class_doc.and_then(|d| d.summary.clone()),
                deprecated: class_doc
                    .and_then(|d| d.deprecated.clone())
                    .map(DeprecatedTag::into),
            })
        }
    }

    fn fold_members(
        &self,
        language: Language,
        body_node: Option<Node<'_>>,
        source: &str,
        jsdocs: &[JsDocComment],
    ) -> (Vec<ClassMember>, Vec<Attribute>) {
        let Some(body) = body_node else {
            return (Vec::new(), Vec::new());
        };

        let mut members = Vec::new();
        let mut attributes = Vec::new();
        let mut observed_attrs: Vec<String> = Vec::new();

        // Two passes: first collect `static observedAttributes`, then fold every member in source order.
        for member_match in self.registry.members(language, body, source) {
            if let Some(field_cap) = member_match.get("member.field").and_then(|v| v.first()) {
                let field_node = field_cap.node;
                let field_name = js_syntax::name_field_text(field_node, source).unwrap_or_default();
                if field_name == "observedAttributes" && js_syntax::has_modifier(field_node, "static") {
                    if let Some(value) = js_syntax::value_field_text(field_node, source) {
                        observed_attrs = parse_string_array(value);
                    }
                }
            }
        }

        for member_match in self.registry.members(language, body, source) {
            if let Some(field_cap) = member_match.get("member.field").and_then(|v| v.first()) {
                let field_node = field_cap.node;
                let field_name = js_syntax::name_field_text(field_node, source)
                    .unwrap_or_default()
                    .to_string();
                if field_name.is_empty() || field_name == "observedAttributes" {
                    continue;
                }

                let field_doc = find_attached_doc(jsdocs, field_node.start_byte(), source);
                let field_decorators = self.registry.decorators(language, field_node, source);
                let property_pairs = decorator_object_args(&field_decorators, &["property", "state"], source);

                let type_text = js_syntax::type_annotation_text(field_node, source).map(str::to_string);
                let default_text = js_syntax::value_field_text(field_node, source).map(str::to_string);

                let jsdoc_attr_tag = field_doc.and_then(|d| d.tags_named("attr").next());

                // Source-of-truth order for reflection: explicit JSDoc
                // (`@attr {noreflect}`) overrides the decorator's `reflect`
                // option, which overrides the default of `false`.
                let reflects = match jsdoc_attr_tag.and_then(|t| t.type_text.as_deref()) {
                    Some("noreflect") => false,
                    _ => property_pairs
                        .as_ref()
                        .and_then(|p| p.get("reflect"))
                        .map(|v| v.trim() == "true")
                        .unwrap_or(false),
                };

                let field_member = FieldMember {
                    name: field_name.clone(),
                    privacy: privacy_from(js_syntax::accessibility_text(field_node, source)),
                    r#static: js_syntax::has_modifier(field_node, "static"),
                    readonly: js_syntax::has_modifier(field_node, "readonly"),
                    r#type: type_text.clone().map(TypeRef::plain),
                    default: default_text.clone(),
                    description: field_doc.and_then(|d| d.description.clone()),
                    summary: field_doc.and_then(|d| d.summary.clone()),
                    deprecated: field_doc.and_then(|d| d.deprecated.clone()).map(DeprecatedTag::into),
                    reflects,
                    inherited_from: None,
                };

                let decorated = property_pairs.is_some();
                if decorated || jsdoc_attr_tag.is_some() || observed_attrs.iter().any(|a| a == &field_name) {
                    attributes.push(build_attribute(
                        &field_name,
                        jsdoc_attr_tag,
                        property_pairs.as_ref(),
                        type_text.as_deref(),
                        default_text.as_deref(),
                    ));
                }

                members.push(ClassMember::Field(field_member));
            } else if let Some(method_cap) = member_match.get("member.method").and_then(|v| v.first()) {
                let method_node = method_cap.node;
                let method_name = member_match
                    .get("method.name")
                    .and_then(|v| v.first())
                    .map(|c| c.text(source).to_string())
                    .unwrap_or_default();
                if method_name.is_empty() {
                    continue;
                }
                let method_doc = find_attached_doc(jsdocs, method_node.start_byte(), source);
                members.push(ClassMember::Method(MethodMember {
                    name: method_name,
                    privacy: privacy_from(js_syntax::accessibility_text(method_node, source)),
                    r#static: js_syntax::has_modifier(method_node, "static"),
                    parameters: fold_parameters(method_node, source),
                    return_type: method_node
                        .child_by_field_name("return_type")
                        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                        .map(|t| TypeRef::plain(t.trim_start_matches(':').trim())),
                    description: method_doc.and_then(|d| d.description.clone()),
                    summary: method_doc.and_then(|d| d.summary.clone()),
                    deprecated: method_doc.and_then(|d| d.deprecated.clone()).map(DeprecatedTag::into),
                    inherited_from: None,
                }));
            }
        }

        attributes.sort_by(|a, b| a.name.cmp(&b.name));
        (members, attributes)
    }
}

fn fold_class_level_tags(ce: &mut CustomElementDeclaration, doc: Option<&JsDocComment>) {
    let Some(doc) = doc else { return };
    for t in doc.tags_named("fires") {
        ce.events.push(Event {
            name: t.name.clone().unwrap_or_default(),
            r#type: t.type_text.clone().map(TypeRef::plain),
            description: non_empty(&t.description),
            deprecated: None,
        });
    }
    for t in doc.tags_named("slot") {
        ce.slots.push(Slot {
            name: t.name.clone().unwrap_or_default(),
            description: non_empty(&t.description),
        });
    }
    for t in doc.tags_named("cssprop") {
        ce.css_properties.push(CssCustomProperty {
            name: t.name.clone().unwrap_or_default(),
            syntax: t.type_text.clone(),
            default: None,
            description: non_empty(&t.description),
        });
    }
    for t in doc.tags_named("csspart") {
        ce.css_parts.push(CssPart {
            name: t.name.clone().unwrap_or_default(),
            description: non_empty(&t.description),
        });
    }
    for t in doc.tags_named("cssstate") {
        ce.css_states.push(CssState {
            name: t.name.clone().unwrap_or_default(),
            description: non_empty(&t.description),
        });
    }
    for t in doc.tags_named("demo") {
        if let Some(url) = &t.name {
            ce.demos.push(Demo {
                url: url.clone(),
                source: None,
                description: non_empty(&t.description),
            });
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn build_attribute(
    field_name: &str,
    jsdoc_attr_tag: Option<&crate::jsdoc::JsDocTag>,
    decorator_pairs: Option<&HashMap<String, String>>,
    field_type_text: Option<&str>,
    field_default: Option<&str>,
) -> Attribute {
    let attr_name = jsdoc_attr_tag
        .and_then(|t| t.name.clone())
        .or_else(|| {
            decorator_pairs
                .and_then(|p| p.get("attribute"))
                .map(|v| js_syntax::unquote(v))
        })
        .unwrap_or_else(|| field_name.to_string());

    let type_text = jsdoc_attr_tag
        .and_then(|t| t.type_text.clone())
        .filter(|t| t != "noreflect")
        .or_else(|| decorator_pairs.and_then(|p| p.get("type")).map(|v| v.to_lowercase()))
        .or_else(|| field_type_text.map(str::to_string));

    Attribute {
        name: attr_name,
        r#type: type_text.map(TypeRef::plain),
        default: field_default.map(str::to_string),
        description: jsdoc_attr_tag.and_then(|t| non_empty(&t.description)),
        field_name: Some(field_name.to_string()),
        deprecated: None,
    }
}

fn fold_parameters(method_node: Node<'_>, source: &str) -> Vec<Parameter> {
    let Some(params_node) = method_node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = params_node.walk();
    for p in params_node.children(&mut cursor) {
        if !matches!(
            p.kind(),
            "required_parameter" | "optional_parameter" | "identifier" | "rest_pattern"
        ) {
            continue;
        }
        let name_node = p.child_by_field_name("pattern").unwrap_or(p);
        let name = name_node
            .utf8_text(source.as_bytes())
            .unwrap_or_default()
            .trim_start_matches("...")
            .to_string();
        out.push(Parameter {
            name,
            r#type: js_syntax::type_annotation_text(p, source).map(TypeRef::plain),
            description: None,
            default: js_syntax::value_field_text(p, source).map(str::to_string),
            optional: p.kind() == "optional_parameter",
        });
    }
    out
}

fn parse_string_array(text: &str) -> Vec<String> {
    let inner = text.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(|s| js_syntax::unquote(s.trim()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn privacy_from(accessibility: Option<&str>) -> Privacy {
    match accessibility {
        Some("protected") => Privacy::Protected,
        Some("private") => Privacy::Private,
        _ => Privacy::Public,
    }
}

fn base_identifier(text: &str) -> &str {
    text.split(['(', '<', '.']).next().unwrap_or(text).trim()
}

fn reference_for(name: &str) -> Reference {
    if builtins::is_builtin(name) {
        Reference::global(name)
    } else {
        Reference::new(name)
    }
}

fn decorator_string_arg<'t>(
    decorators: &[crate::queries::Match<'t>],
    decorator_name: &str,
    source: &str,
) -> Option<String> {
    decorators.iter().find_map(|m| {
        let deco_name = m.get("decorator.name")?.first()?.text(source);
        if deco_name != decorator_name {
            return None;
        }
        let args = m.get("decorator.arguments")?.first()?.node;
        js_syntax::first_string_literal(args, source)
    })
}

fn decorator_object_args<'t>(
    decorators: &[crate::queries::Match<'t>],
    decorator_names: &[&str],
    source: &str,
) -> Option<HashMap<String, String>> {
    decorators.iter().find_map(|m| {
        let deco_name = m.get("decorator.name")?.first()?.text(source);
        if !decorator_names.contains(&deco_name) {
            return None;
        }
        let args = m.get("decorator.arguments")?.first()?.node;
        Some(js_syntax::first_object_literal_pairs(args, source))
    })
}

fn first_error_byte(node: Node<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_byte());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(b) = first_error_byte(child) {
            return Some(b);
        }
    }
    None
}

/// Finds the JSDoc comment that attaches to the declaration/member
/// starting at `target_start`: the closest comment above it whose gap to
/// `target_start` is only whitespace and/or decorators.
fn find_attached_doc<'a>(
    jsdocs: &'a [JsDocComment],
    target_start: usize,
    source: &str,
) -> Option<&'a JsDocComment> {
    jsdocs
        .iter()
        .filter(|d| d.end_byte <= target_start)
        .filter(|d| is_whitespace_or_decorators(&source[d.end_byte..target_start]))
        .max_by_key(|d| d.end_byte)
}

fn is_whitespace_or_decorators(gap: &str) -> bool {
    let mut remaining = gap;
    loop {
        let trimmed = remaining.trim_start();
        if trimmed.is_empty() {
            return true;
        }
        let Some(rest) = trimmed.strip_prefix('@') else {
            return false;
        };
        let ident_end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(rest.len());
        let after_ident = rest[ident_end..].trim_start();
        if let Some(args) = after_ident.strip_prefix('(') {
            match find_matching_paren(args) {
                Some(close) => remaining = &args[close + 1..],
                None => return false,
            }
        } else {
            remaining = after_ident;
        }
    }
}

fn find_matching_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

static EXPORT_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"export\s*\{([^}]*)\}").expect("static regex"));

/// Export folding is regex-based over the raw source text rather than a
/// tree-sitter query: a module's top-level export list rarely needs full
/// parse fidelity, and a regex keeps this pass independent of the class
/// query above.
fn fold_exports(module: &mut Module, source: &str) {
    let names: Vec<String> = module.declarations.iter().map(|d| d.name().to_string()).collect();
    for name in &names {
        let decl = module.declarations.iter().find(|d| d.name() == name).unwrap();
        let is_exported = source.contains(&format!("export class {name}"))
            || source.contains(&format!("export default class {name}"))
            || source.contains(&format!("export abstract class {name}"))
            || source.contains(&format!("export const {name}"))
            || source.contains(&format!("export function {name}"))
            || export_braces_contains(source, name);

        if is_exported {
            module.exports.push(Export {
                kind: ExportKind::JavascriptModule,
                name: name.clone(),
                declaration: Some(Reference::new(name.clone())),
            });
        }

        if let Declaration::CustomElement(ce) = decl {
            let registered = source.contains(&format!("customElements.define('{}'", ce.tag_name))
                || source.contains(&format!("customElements.define(\"{}\"", ce.tag_name))
                || source.contains("@customElement");
            if is_exported && registered {
                module.exports.push(Export {
                    kind: ExportKind::CustomElementDefinition,
                    name: name.clone(),
                    declaration: Some(Reference::new(name.clone())),
                });
            }
        }
    }
}

fn export_braces_contains(source: &str, name: &str) -> bool {
    EXPORT_BRACE.captures_iter(source).any(|caps| {
        caps[1]
            .split(',')
            .map(str::trim)
            .any(|entry| entry == name || entry.ends_with(&format!("as {name}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::ParserPool;

    fn process(source: &str) -> Module {
        let pool = ParserPool::new();
        let registry = QueryRegistry::new().unwrap();
        let processor = ModuleProcessor::new(&pool, &registry);
        processor.process("my-element.js", source).unwrap()
    }

    #[test]
    fn minimal_element_scenario() {
        let module = process(
            r#"
            /** A basic element. */
            @customElement('my-element')
            export class MyElement extends HTMLElement {}
            customElements.define('my-element', MyElement);
            "#,
        );
        assert_eq!(module.declarations.len(), 1);
        let ce = module.declarations[0].as_custom_element().unwrap();
        assert_eq!(ce.tag_name, "my-element");
        assert_eq!(ce.description.as_deref(), Some("A basic element."));
        let superclass = ce.superclass.as_ref().unwrap();
        assert_eq!(superclass.name, "HTMLElement");
        assert_eq!(superclass.package.as_deref(), Some("global:"));
    }

    #[test]
    fn reflecting_attribute_scenario() {
        let module = process(
            r#"
            @customElement('my-element')
            export class MyElement extends HTMLElement {
                @property({type: Boolean, reflect: true})
                open = false;
            }
            "#,
        );
        let ce = module.declarations[0].as_custom_element().unwrap();
        let attr = ce.attributes.iter().find(|a| a.name == "open").unwrap();
        assert_eq!(attr.field_name.as_deref(), Some("open"));
        assert_eq!(attr.default.as_deref(), Some("false"));
        let field = ce
            .members
            .iter()
            .find_map(|m| match m {
                ClassMember::Field(f) if f.name == "open" => Some(f),
                _ => None,
            })
            .unwrap();
        assert!(field.reflects);
    }

    #[test]
    fn jsdoc_noreflect_overrides_decorator_reflect() {
        let module = process(
            r#"
            @customElement('my-element')
            export class MyElement extends HTMLElement {
                /**
                 * @attr {noreflect} open
                 */
                @property({type: Boolean, reflect: true})
                open = false;
            }
            "#,
        );
        let ce = module.declarations[0].as_custom_element().unwrap();
        let field = ce
            .members
            .iter()
            .find_map(|m| match m {
                ClassMember::Field(f) if f.name == "open" => Some(f),
                _ => None,
            })
            .unwrap();
        assert!(!field.reflects);
    }

    #[test]
    fn plain_class_with_no_custom_element_signals() {
        let module = process("export class Helper { doThing() {} }");
        assert!(matches!(module.declarations[0], Declaration::Class(_)));
    }

    #[test]
    fn class_level_jsdoc_tags_populate_events_slots_and_css() {
        let module = process(
            r#"
            /**
             * @fires change - fired on change
             * @slot - default content
             * @cssprop {<color>} --brand-color - brand color
             * @csspart button
             */
            @customElement('my-element')
            export class MyElement extends HTMLElement {}
            "#,
        );
        let ce = module.declarations[0].as_custom_element().unwrap();
        assert_eq!(ce.events.len(), 1);
        assert_eq!(ce.events[0].name, "change");
        assert_eq!(ce.slots.len(), 1);
        assert_eq!(ce.css_properties.len(), 1);
        assert_eq!(ce.css_properties[0].name, "--brand-color");
        assert_eq!(ce.css_parts.len(), 1);
        assert_eq!(ce.css_parts[0].name, "button");
    }

    #[test]
    fn syntax_error_is_reported_with_path() {
        let pool = ParserPool::new();
        let registry = QueryRegistry::new().unwrap();
        let processor = ModuleProcessor::new(&pool, &registry);
        let err = processor.process("broken.js", "class {{{").unwrap_err();
        assert!(matches!(err, AnalyzeError::Syntax { .. }));
    }
}
