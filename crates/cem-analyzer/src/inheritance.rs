//! Generation-time inheritance propagation: folds same-package ancestor members into a
//! subclass's own `members` list, tagging each folded member with
//! `inheritedFrom` so a manifest reader sees the full member set without
//! re-walking `superclass` chains itself.
//!
//! This is distinct from `cem_model::query::PackageQuery`'s on-demand
//! walk, which out-of-core tooling (list/search/health/LSP/MCP) uses
//! against an already-loaded manifest; this pass runs once, during
//! generation, before serialization.
//!
//! Non-destructive: a declaration's own `deprecated` field is never
//! written by this pass — ancestor deprecation is a query
//! concern, not a stored one. Idempotent: only a declaration's
//! originally-own members (no `inheritedFrom`) are folded into
//! descendants, so re-running this pass over an already-propagated
//! package adds nothing new.

use std::collections::HashSet;

use cem_model::{ClassMember, Declaration, Package, Reference};

const MAX_INHERITANCE_DEPTH: usize = 64;

/// Folds inherited members into every declaration in `package`, in
/// place. Declarations are resolved by name within the package first;
/// a `superclass` pointing across packages or at a built-in
/// (`package: "global:"`) ends the walk for that branch.
pub fn propagate(package: &mut Package) {
    let own_members_by_name = collect_own_members(package);

    for module_index in 0..package.modules.len() {
        let decl_count = package.modules[module_index].declarations.len();
        for decl_index in 0..decl_count {
            let chain = ancestor_chain(package, module_index, decl_index);
            let Some(members_mut) = package.modules[module_index].declarations[decl_index].members_mut() else {
                continue;
            };
            let mut seen: HashSet<(String, bool)> = members_mut
                .iter()
                .map(|m| (m.name().to_string(), m.is_static()))
                .collect();

            for (ancestor_name, ancestor_module_path) in chain {
                let Some(ancestor_members) = own_members_by_name.get(&ancestor_name) else {
                    continue;
                };
                for member in ancestor_members {
                    let key = (member.name().to_string(), member.is_static());
                    if !seen.insert(key) {
                        continue;
                    }
                    let mut inherited = member.clone();
                    inherited.set_inherited_from(Reference {
                        name: ancestor_name.clone(),
                        package: None,
                        module: Some(ancestor_module_path.clone()),
                    });
                    members_mut.push(inherited);
                }
            }
        }
    }
}

/// Every declaration's originally-own members (no `inheritedFrom`),
/// keyed by declaration name — the fold source for descendants. Reading
/// this once up front, rather than re-deriving it mid-mutation, is what
/// keeps the pass idempotent: a declaration's fold source never includes
/// what a previous `propagate` run already added to some other
/// declaration's member list.
fn collect_own_members(package: &Package) -> std::collections::HashMap<String, Vec<ClassMember>> {
    let mut out = std::collections::HashMap::new();
    for module in &package.modules {
        for decl in &module.declarations {
            let own: Vec<ClassMember> = decl
                .members()
                .iter()
                .filter(|m| !has_inherited_from(m))
                .cloned()
                .collect();
            out.insert(decl.name().to_string(), own);
        }
    }
    out
}

fn has_inherited_from(member: &ClassMember) -> bool {
    match member {
        ClassMember::Field(f) => f.inherited_from.is_some(),
        ClassMember::Method(m) => m.inherited_from.is_some(),
    }
}

/// Same-package ancestor declaration names (and their module path) for
/// the declaration at `(module_index, decl_index)`, nearest ancestor
/// first, stopping at a built-in or cross-package superclass or at
/// `MAX_INHERITANCE_DEPTH`.
fn ancestor_chain(package: &Package, module_index: usize, decl_index: usize) -> Vec<(String, String)> {
    let mut chain = Vec::new();
    let mut current = package.modules[module_index].declarations[decl_index]
        .superclass()
        .cloned();
    let mut depth = 0;

    while let Some(superclass) = current {
        if superclass.package.is_some() {
            break;
        }
        let Some((found_module, found_decl)) = find_declaration(package, &superclass.name) else {
            break;
        };
        chain.push((superclass.name.clone(), found_module.path.clone()));

        depth += 1;
        if depth >= MAX_INHERITANCE_DEPTH {
            break;
        }
        current = found_decl.superclass().cloned();
    }
    chain
}

fn find_declaration<'a>(package: &'a Package, name: &str) -> Option<(&'a cem_model::Module, &'a Declaration)> {
    package.modules.iter().find_map(|m| m.find_declaration(name).map(|d| (m, d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cem_model::{ClassDeclaration, CustomElementDeclaration, FieldMember, Module, ModuleKind, Privacy};

    fn field(name: &str) -> ClassMember {
        ClassMember::Field(FieldMember {
            name: name.to_string(),
            privacy: Privacy::Public,
            r#static: false,
            readonly: false,
            r#type: None,
            default: None,
            description: None,
            summary: None,
            deprecated: None,
            reflects: false,
            inherited_from: None,
        })
    }

    fn sample_package() -> Package {
        let base = Declaration::Class(ClassDeclaration {
            name: "BaseElement".to_string(),
            superclass: None,
            members: vec![field("hidden"), field("shared")],
            ..Default::default()
        });
        let sub = Declaration::CustomElement(CustomElementDeclaration {
            name: "MyElement".to_string(),
            tag_name: "my-element".to_string(),
            superclass: Some(Reference::new("BaseElement")),
            members: vec![field("shared")],
            ..Default::default()
        });
        Package {
            schema_version: cem_model::SchemaVersion::current(),
            readme: None,
            modules: vec![Module {
                kind: ModuleKind::JavascriptModule,
                path: "src/base.js".to_string(),
                declarations: vec![base],
                exports: Vec::new(),
            }, Module {
                kind: ModuleKind::JavascriptModule,
                path: "src/my-element.js".to_string(),
                declarations: vec![sub],
                exports: Vec::new(),
            }],
        }
    }

    #[test]
    fn folds_ancestor_members_not_shadowed_by_own() {
        let mut package = sample_package();
        propagate(&mut package);
        let ce = package.modules[1].declarations[0].as_custom_element().unwrap();
        let names: Vec<_> = ce.members.iter().map(|m| m.name()).collect();
        assert!(names.contains(&"hidden"));
        assert_eq!(names.iter().filter(|n| **n == "shared").count(), 1, "own member shadows inherited");

        let hidden = ce.members.iter().find(|m| m.name() == "hidden").unwrap();
        match hidden {
            ClassMember::Field(f) => {
                let inherited_from = f.inherited_from.as_ref().unwrap();
                assert_eq!(inherited_from.name, "BaseElement");
                assert_eq!(inherited_from.module.as_deref(), Some("src/base.js"));
            }
            _ => panic!("expected field"),
        }
    }

    #[test]
    fn is_idempotent() {
        let mut package = sample_package();
        propagate(&mut package);
        let first = package.modules[1].declarations[0].members().to_vec();
        propagate(&mut package);
        let second = package.modules[1].declarations[0].members().to_vec();
        assert_eq!(first.len(), second.len());
        let first_names: HashSet<_> = first.iter().map(|m| m.name().to_string()).collect();
        let second_names: HashSet<_> = second.iter().map(|m| m.name().to_string()).collect();
        assert_eq!(first_names, second_names);
    }

    #[test]
    fn stops_at_builtin_superclass() {
        let mut package = Package::new();
        package.modules.push(Module {
            kind: ModuleKind::JavascriptModule,
            path: "src/a.js".to_string(),
            declarations: vec![Declaration::CustomElement(CustomElementDeclaration {
                name: "MyElement".to_string(),
                tag_name: "my-element".to_string(),
                superclass: Some(Reference::global("HTMLElement")),
                members: vec![],
                ..Default::default()
            })],
            exports: Vec::new(),
        });
        propagate(&mut package);
        let ce = package.modules[0].declarations[0].as_custom_element().unwrap();
        assert!(ce.members.is_empty());
    }
}
