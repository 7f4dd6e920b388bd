//! Import-Map Builder: walks `package.json`
//! dependencies, resolving each into a `node_modules`-relative URL via
//! [`PackageJson::resolve_entry`], and merges a user-supplied override
//! on top.

use std::collections::BTreeMap;
use std::path::Path;

use cem_model::config::ImportMapConfig;
use cem_model::package_json::PackageJson;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportMap {
    pub imports: BTreeMap<String, String>,
    pub scopes: BTreeMap<String, BTreeMap<String, String>>,
}

/// Builds the import map rooted at `root`, then merges `config`'s
/// override file and inline overrides on top.
pub fn build(root: &Path, config: &ImportMapConfig) -> Result<ImportMap> {
    let mut map = ImportMap::default();
    if !config.generate {
        apply_overrides(&mut map, root, config)?;
        return Ok(map);
    }

    if let Some(pkg) = read_package_json(root, ".")? {
        walk_dependencies(root, &pkg, "node_modules", &mut map)?;
    }

    apply_overrides(&mut map, root, config)?;
    Ok(map)
}

fn walk_dependencies(
    root: &Path,
    pkg: &PackageJson,
    node_modules_prefix: &str,
    map: &mut ImportMap,
) -> Result<()> {
    for name in pkg.all_dependency_names() {
        let package_dir = format!("{node_modules_prefix}/{name}");
        let Some(dep_pkg) = read_package_json(root, &package_dir)? else {
            continue;
        };
        if let Some(entry) = dep_pkg.resolve_entry(None) {
            let url = join_url(&package_dir, &entry);
            let scope = scope_for(node_modules_prefix);
            match scope {
                Some(scope) => {
                    map.scopes.entry(scope).or_default().insert(name.clone(), format!("/{url}"));
                }
                None => {
                    map.imports.insert(name.clone(), format!("/{url}"));
                }
            }
        }

        let nested_prefix = format!("{package_dir}/node_modules");
        if root.join(&nested_prefix).is_dir() {
            walk_dependencies(root, &dep_pkg, &nested_prefix, map)?;
        }
    }
    Ok(())
}

/// A nested dependency's imports live in a scope keyed by its parent
/// package's directory; a top-level dependency has no scope.
fn scope_for(node_modules_prefix: &str) -> Option<String> {
    if node_modules_prefix == "node_modules" {
        return None;
    }
    let parent_dir = node_modules_prefix.trim_end_matches("/node_modules");
    Some(format!("/{parent_dir}/"))
}

fn join_url(package_dir: &str, entry: &str) -> String {
    let entry = entry.trim_start_matches("./");
    format!("{package_dir}/{entry}")
}

fn read_package_json(root: &Path, dir: &str) -> Result<Option<PackageJson>> {
    let path = if dir == "." { root.join("package.json") } else { root.join(dir).join("package.json") };
    if !path.is_file() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    Ok(Some(PackageJson::from_str(&contents).map_err(|e| {
        crate::error::ServerError::Transform {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    })?))
}

fn apply_overrides(map: &mut ImportMap, root: &Path, config: &ImportMapConfig) -> Result<()> {
    if let Some(override_file) = &config.override_file {
        let path = root.join(override_file);
        let contents = std::fs::read_to_string(&path)?;
        let overrides: ImportMap = serde_json::from_str(&contents).map_err(|e| crate::error::ServerError::Transform {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        merge(map, overrides);
    }
    if !config.r#override.is_empty() {
        for (bare, url) in &config.r#override {
            map.imports.insert(bare.clone(), url.clone());
        }
    }
    Ok(())
}

fn merge(into: &mut ImportMap, from: ImportMap) {
    into.imports.extend(from.imports);
    for (scope, entries) in from.scopes {
        into.scopes.entry(scope).or_default().extend(entries);
    }
}

impl ImportMap {
    pub fn to_script_tag(&self) -> String {
        let body = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("<script type=\"importmap\">{body}</script>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn resolves_top_level_dependency() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "package.json", r#"{"name":"app","dependencies":{"lit":"^3.0.0"}}"#);
        write(
            dir.path(),
            "node_modules/lit/package.json",
            r#"{"name":"lit","main":"index.js"}"#,
        );

        let map = build(dir.path(), &ImportMapConfig { generate: true, ..Default::default() }).unwrap();
        assert_eq!(map.imports.get("lit").map(String::as_str), Some("/node_modules/lit/index.js"));
    }

    #[test]
    fn nested_dependency_gets_a_scope() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "package.json", r#"{"name":"app","dependencies":{"a":"1.0.0"}}"#);
        write(
            dir.path(),
            "node_modules/a/package.json",
            r#"{"name":"a","main":"index.js","dependencies":{"b":"1.0.0"}}"#,
        );
        write(
            dir.path(),
            "node_modules/a/node_modules/b/package.json",
            r#"{"name":"b","main":"index.js"}"#,
        );

        let map = build(dir.path(), &ImportMapConfig { generate: true, ..Default::default() }).unwrap();
        assert_eq!(map.imports.get("a").map(String::as_str), Some("/node_modules/a/index.js"));
        let scope = map.scopes.get("/node_modules/a/").unwrap();
        assert_eq!(scope.get("b").map(String::as_str), Some("/node_modules/a/node_modules/b/index.js"));
    }

    #[test]
    fn inline_override_wins_over_automatic_generation() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "package.json", r#"{"name":"app","dependencies":{"lit":"^3.0.0"}}"#);
        write(
            dir.path(),
            "node_modules/lit/package.json",
            r#"{"name":"lit","main":"index.js"}"#,
        );

        let mut overrides = BTreeMap::new();
        overrides.insert("lit".to_string(), "/vendor/lit.js".to_string());
        let config = ImportMapConfig {
            generate: true,
            r#override: overrides,
            ..Default::default()
        };
        let map = build(dir.path(), &config).unwrap();
        assert_eq!(map.imports.get("lit").map(String::as_str), Some("/vendor/lit.js"));
    }
}
