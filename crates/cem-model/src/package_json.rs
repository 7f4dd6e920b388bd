//! Typed view over `package.json`: a struct over the handful of fields
//! this toolkit actually reads, with everything else passed through as
//! untyped JSON so round-tripping an unfamiliar `package.json` never
//! loses data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    pub main: Option<String>,
    pub module: Option<String>,
    #[serde(rename = "customElements")]
    pub custom_elements: Option<String>,
    #[serde(default)]
    pub exports: Option<Value>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(rename = "devDependencies", default)]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Everything else in the document, preserved verbatim.
    #[serde(flatten)]
    pub rest: BTreeMap<String, Value>,
}

impl PackageJson {
    pub fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Walks `exports`/`main`/`module` to find the entry point a bare
    /// specifier resolves to, for the Import-Map Builder.
    pub fn resolve_entry(&self, subpath: Option<&str>) -> Option<String> {
        if let Some(exports) = &self.exports {
            if let Some(resolved) = resolve_exports_field(exports, subpath.unwrap_or(".")) {
                return Some(resolved);
            }
        }
        if subpath.is_none() || subpath == Some(".") {
            return self.module.clone().or_else(|| self.main.clone());
        }
        None
    }

    /// All `dependencies` + `devDependencies` entries, in a stable order,
    /// for the Import-Map Builder's `node_modules` walk.
    pub fn all_dependency_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

fn resolve_exports_field(exports: &Value, subpath: &str) -> Option<String> {
    match exports {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            if let Some(entry) = map.get(subpath) {
                return resolve_exports_condition(entry);
            }
            if subpath == "." {
                // Condition-keyed export map at the top level, e.g.
                // {"import": "./x.js", "default": "./x.js"}.
                return resolve_exports_condition(exports);
            }
            None
        }
        _ => None,
    }
}

fn resolve_exports_condition(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            for condition in ["import", "module", "default", "require"] {
                if let Some(v) = map.get(condition) {
                    if let Some(resolved) = resolve_exports_condition(v) {
                        return Some(resolved);
                    }
                }
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_module_over_main() {
        let pkg = PackageJson::from_str(
            r#"{"name":"x","main":"./index.cjs.js","module":"./index.esm.js"}"#,
        )
        .unwrap();
        assert_eq!(pkg.resolve_entry(None).as_deref(), Some("./index.esm.js"));
    }

    #[test]
    fn resolves_conditional_exports() {
        let pkg = PackageJson::from_str(
            r#"{"name":"x","exports":{".":{"import":"./esm/index.js","default":"./cjs/index.js"}}}"#,
        )
        .unwrap();
        assert_eq!(
            pkg.resolve_entry(None).as_deref(),
            Some("./esm/index.js")
        );
    }

    #[test]
    fn resolves_subpath_exports() {
        let pkg = PackageJson::from_str(
            r#"{"name":"x","exports":{"./button.js":"./src/button.js"}}"#,
        )
        .unwrap();
        assert_eq!(
            pkg.resolve_entry(Some("./button.js")).as_deref(),
            Some("./src/button.js")
        );
    }

    #[test]
    fn custom_elements_field_is_read() {
        let pkg =
            PackageJson::from_str(r#"{"name":"x","customElements":"custom-elements.json"}"#)
                .unwrap();
        assert_eq!(pkg.custom_elements.as_deref(), Some("custom-elements.json"));
    }
}
