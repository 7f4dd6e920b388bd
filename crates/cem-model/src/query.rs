//! Query API over a loaded [`Package`].
//!
//! Used by the out-of-core `list`/`search`/`health` CLI commands and the
//! LSP/MCP servers; this module only builds the query surface those
//! boundary tools call, not their rendering.

use std::collections::HashMap;

use regex::Regex;

use crate::model::{
    ClassMember, CustomElementDeclaration, Declaration, Deprecated, Module, Package, Reference,
};

/// `superclass`/`inheritedFrom` are resolved here, by name, never by
/// pointer: first within the same package, then — when a
/// `Reference` carries a `package`/`module` pair that doesn't match the
/// loaded package — left unresolved for the caller to fetch externally.
const MAX_INHERITANCE_DEPTH: usize = 64;

/// A declaration together with the module and package context it was
/// found in, as returned by `get_all_tag_names_with_context`.
#[derive(Debug, Clone)]
pub struct TagContext<'a> {
    pub tag_name: &'a str,
    pub module: &'a Module,
    pub declaration: &'a CustomElementDeclaration,
}

pub struct PackageQuery<'a> {
    package: &'a Package,
}

impl<'a> PackageQuery<'a> {
    pub fn new(package: &'a Package) -> Self {
        Self { package }
    }

    pub fn get_all_tag_names_with_context(&self) -> Vec<TagContext<'a>> {
        let mut out = Vec::new();
        for module in &self.package.modules {
            for decl in &module.declarations {
                if let Declaration::CustomElement(ce) = decl {
                    out.push(TagContext {
                        tag_name: &ce.tag_name,
                        module,
                        declaration: ce,
                    });
                }
            }
        }
        out
    }

    pub fn find_by_tag_name(&self, tag_name: &str) -> Option<TagContext<'a>> {
        self.get_all_tag_names_with_context()
            .into_iter()
            .find(|c| c.tag_name == tag_name)
    }

    fn find_declaration_by_name(&self, name: &str) -> Option<&'a Declaration> {
        self.package
            .modules
            .iter()
            .flat_map(|m| &m.declarations)
            .find(|d| d.name() == name)
    }

    /// Walks `superclass` references starting at `tag_name`, collecting
    /// every member for which `selector` returns `Some`, attaching
    /// `inheritedFrom` once the walk leaves the declaring class. Same-name
    /// members on a subclass shadow inherited ones (first write wins).
    fn walk_members<T: Clone>(
        &self,
        tag_name: &str,
        mut selector: impl FnMut(&ClassMember) -> Option<T>,
    ) -> Vec<(String, T)> {
        let Some(ctx) = self.find_by_tag_name(tag_name) else {
            return Vec::new();
        };
        let mut seen_names = std::collections::HashSet::new();
        let mut results = Vec::new();
        let mut current_name = ctx.declaration.name.clone();
        let mut current_decl: Option<&Declaration> = self.find_declaration_by_name(&current_name);
        let mut depth = 0;

        while let Some(decl) = current_decl {
            for member in decl.members() {
                if let Some(value) = selector(member) {
                    if seen_names.insert(member.name().to_string()) {
                        results.push((member.name().to_string(), value));
                    }
                }
            }

            depth += 1;
            if depth >= MAX_INHERITANCE_DEPTH {
                break;
            }
            match decl.superclass() {
                Some(sup) if sup.package.is_none() || sup.package.as_deref() == Some("") => {
                    current_name = sup.name.clone();
                    current_decl = self.find_declaration_by_name(&current_name);
                }
                _ => break,
            }
        }
        results
    }

    pub fn get_tag_fields(&self, tag_name: &str) -> Vec<(String, crate::model::FieldMember)> {
        self.walk_members(tag_name, |m| match m {
            ClassMember::Field(f) => Some(f.clone()),
            _ => None,
        })
    }

    pub fn get_tag_methods(&self, tag_name: &str) -> Vec<(String, crate::model::MethodMember)> {
        self.walk_members(tag_name, |m| match m {
            ClassMember::Method(f) => Some(f.clone()),
            _ => None,
        })
    }

    pub fn get_tag_attrs(&self, tag_name: &str) -> Vec<crate::model::Attribute> {
        self.find_by_tag_name(tag_name)
            .map(|c| c.declaration.attributes.clone())
            .unwrap_or_default()
    }

    pub fn get_tag_slots(&self, tag_name: &str) -> Vec<crate::model::Slot> {
        self.find_by_tag_name(tag_name)
            .map(|c| c.declaration.slots.clone())
            .unwrap_or_default()
    }

    pub fn get_tag_css_properties(&self, tag_name: &str) -> Vec<crate::model::CssCustomProperty> {
        self.find_by_tag_name(tag_name)
            .map(|c| c.declaration.css_properties.clone())
            .unwrap_or_default()
    }

    pub fn get_tag_css_parts(&self, tag_name: &str) -> Vec<crate::model::CssPart> {
        self.find_by_tag_name(tag_name)
            .map(|c| c.declaration.css_parts.clone())
            .unwrap_or_default()
    }

    pub fn get_tag_css_states(&self, tag_name: &str) -> Vec<crate::model::CssState> {
        self.find_by_tag_name(tag_name)
            .map(|c| c.declaration.css_states.clone())
            .unwrap_or_default()
    }

    pub fn get_tag_events(&self, tag_name: &str) -> Vec<crate::model::Event> {
        self.find_by_tag_name(tag_name)
            .map(|c| c.declaration.events.clone())
            .unwrap_or_default()
    }

    /// Runs `pattern` as a regex over `name`/`description`/`summary`/
    /// `label` of every `Renderable` reachable from the package root —
    /// declarations, their members (including member description/
    /// summary, not just the name), and every custom-element-only
    /// collection (attributes, events, slots, css properties/parts/
    /// states) — falling back to a literal substring match when
    /// `pattern` doesn't compile as a regex.
    pub fn search(&self, pattern: &str) -> Vec<SearchHit<'a>> {
        let regex = Regex::new(pattern).ok();
        let is_match = |haystack: &str| -> bool {
            match &regex {
                Some(re) => re.is_match(haystack),
                None => haystack.contains(pattern),
            }
        };
        let any_match = |fields: &[Option<&str>]| fields.iter().flatten().any(|f| is_match(f));

        let mut hits = Vec::new();
        for module in &self.package.modules {
            for decl in &module.declarations {
                let label = decl.name();
                if any_match(&[Some(label), decl.description(), decl.summary()]) {
                    hits.push(SearchHit {
                        module,
                        path: vec![label.to_string()],
                    });
                }
                for member in decl.members() {
                    let name = member.name();
                    if any_match(&[Some(name), member.description(), member.summary()]) {
                        hits.push(SearchHit {
                            module,
                            path: vec![label.to_string(), name.to_string()],
                        });
                    }
                }
                if let Declaration::CustomElement(ce) = decl {
                    for attr in &ce.attributes {
                        if any_match(&[Some(attr.name.as_str()), attr.description.as_deref()]) {
                            hits.push(SearchHit {
                                module,
                                path: vec![label.to_string(), attr.name.clone()],
                            });
                        }
                    }
                    for event in &ce.events {
                        if any_match(&[Some(event.name.as_str()), event.description.as_deref()]) {
                            hits.push(SearchHit {
                                module,
                                path: vec![label.to_string(), event.name.clone()],
                            });
                        }
                    }
                    for slot in &ce.slots {
                        if any_match(&[Some(slot.name.as_str()), slot.description.as_deref()]) {
                            hits.push(SearchHit {
                                module,
                                path: vec![label.to_string(), slot.name.clone()],
                            });
                        }
                    }
                    for prop in &ce.css_properties {
                        if any_match(&[Some(prop.name.as_str()), prop.description.as_deref()]) {
                            hits.push(SearchHit {
                                module,
                                path: vec![label.to_string(), prop.name.clone()],
                            });
                        }
                    }
                    for part in &ce.css_parts {
                        if any_match(&[Some(part.name.as_str()), part.description.as_deref()]) {
                            hits.push(SearchHit {
                                module,
                                path: vec![label.to_string(), part.name.clone()],
                            });
                        }
                    }
                    for state in &ce.css_states {
                        if any_match(&[Some(state.name.as_str()), state.description.as_deref()]) {
                            hits.push(SearchHit {
                                module,
                                path: vec![label.to_string(), state.name.clone()],
                            });
                        }
                    }
                }
            }
        }
        hits
    }

    /// Propagates ancestor deprecation down through inheritance without
    /// mutating any declaration's own `deprecated` field, returning a map
    /// keyed by tag name of the effective (own-or-inherited) deprecation.
    /// Idempotent: running this twice over the same package yields the
    /// same map.
    pub fn effective_deprecations(&self) -> HashMap<String, Deprecated> {
        let mut out = HashMap::new();
        for ctx in self.get_all_tag_names_with_context() {
            if let Some(dep) = self.effective_deprecation_for(&ctx.declaration.name) {
                out.insert(ctx.tag_name.to_string(), dep);
            }
        }
        out
    }

    fn effective_deprecation_for(&self, decl_name: &str) -> Option<Deprecated> {
        let mut current = self.find_declaration_by_name(decl_name);
        let mut depth = 0;
        while let Some(decl) = current {
            if let Some(dep) = decl.deprecated() {
                return Some(dep.clone());
            }
            depth += 1;
            if depth >= MAX_INHERITANCE_DEPTH {
                break;
            }
            current = decl
                .superclass()
                .filter(|s| s.package.is_none())
                .and_then(|s| self.find_declaration_by_name(&s.name));
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub module: &'a Module,
    pub path: Vec<String>,
}

/// The polymorphic capability surface tooling builds on. List/search/
/// health/LSP/MCP (out of core scope) build their table/tree rendering
/// on top of this; this crate only supplies the data they need.
pub trait Renderable {
    fn label(&self) -> String;
    fn children(&self) -> Vec<Box<dyn Renderable + '_>>;
    fn sections(&self) -> Vec<(&'static str, String)>;
    fn deprecation(&self) -> Option<Deprecated>;
    fn column_headings() -> Vec<&'static str>
    where
        Self: Sized;
    fn to_table_row(&self) -> Vec<String>;
    fn to_tree_node(&self) -> TreeNode {
        TreeNode {
            label: self.label(),
            children: self.children().iter().map(|c| c.to_tree_node()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl Renderable for Declaration {
    fn label(&self) -> String {
        self.name().to_string()
    }

    fn children(&self) -> Vec<Box<dyn Renderable + '_>> {
        Vec::new()
    }

    fn sections(&self) -> Vec<(&'static str, String)> {
        let mut sections = Vec::new();
        if let Some(desc) = self.description() {
            sections.push(("description", desc.to_string()));
        }
        if let Some(sum) = self.summary() {
            sections.push(("summary", sum.to_string()));
        }
        sections
    }

    fn deprecation(&self) -> Option<Deprecated> {
        self.deprecated().cloned()
    }

    fn column_headings() -> Vec<&'static str> {
        vec!["name", "kind"]
    }

    fn to_table_row(&self) -> Vec<String> {
        vec![self.name().to_string(), self.label()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, CssCustomProperty, FieldMember, Privacy, Slot};

    fn package_with_element() -> Package {
        let mut package = Package::new();
        let mut module = Module::new("a.js");
        module.declarations.push(Declaration::CustomElement(CustomElementDeclaration {
            name: "MyElement".to_string(),
            tag_name: "my-element".to_string(),
            members: vec![ClassMember::Field(FieldMember {
                name: "open".to_string(),
                privacy: Privacy::Public,
                r#static: false,
                readonly: false,
                r#type: None,
                default: None,
                description: Some("Whether the panel is open.".to_string()),
                summary: None,
                deprecated: None,
                reflects: true,
                inherited_from: None,
            })],
            attributes: vec![Attribute {
                name: "open".to_string(),
                r#type: None,
                default: None,
                description: Some("Reflects the open property.".to_string()),
                field_name: Some("open".to_string()),
                deprecated: None,
            }],
            slots: vec![Slot {
                name: "header".to_string(),
                description: Some("Slot for the header content.".to_string()),
            }],
            css_properties: vec![CssCustomProperty {
                name: "--brand-color".to_string(),
                syntax: None,
                default: None,
                description: Some("Primary brand color.".to_string()),
            }],
            ..Default::default()
        }));
        package.modules.push(module);
        package
    }

    #[test]
    fn search_matches_member_description_not_just_name() {
        let package = package_with_element();
        let query = PackageQuery::new(&package);
        let hits = query.search("panel is open");
        assert!(hits.iter().any(|h| h.path == vec!["MyElement".to_string(), "open".to_string()]));
    }

    #[test]
    fn search_matches_slot_description() {
        let package = package_with_element();
        let query = PackageQuery::new(&package);
        let hits = query.search("header content");
        assert!(hits.iter().any(|h| h.path.last() == Some(&"header".to_string())));
    }

    #[test]
    fn search_matches_css_property_description() {
        let package = package_with_element();
        let query = PackageQuery::new(&package);
        let hits = query.search("brand color");
        assert!(hits.iter().any(|h| h.path.last() == Some(&"--brand-color".to_string())));
    }
}
