//! DTCG-format design token loading and merging.
//!
//! Accepts either the `$value`/`$description` DTCG key spelling or the
//! older unprefixed `value`/`description` style-dictionary spelling a
//! token document may use; both are walked the same way.

use std::collections::HashMap;

use serde_json::Value;

use cem_model::Declaration;

use crate::error::{AnalyzeError, Result};

/// A flattened index of CSS custom property name → token description,
/// built once from a token document and merged into however many
/// modules share it.
pub struct DesignTokenIndex {
    descriptions: HashMap<String, String>,
}

impl DesignTokenIndex {
    pub fn load(document: &str, prefix: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(document)
            .map_err(|e| AnalyzeError::InvalidTokenDocument(e.to_string()))?;
        if !root.is_object() {
            return Err(AnalyzeError::InvalidTokenDocument(
                "token document root must be an object".to_string(),
            ));
        }
        let mut descriptions = HashMap::new();
        let mut path = Vec::new();
        collect(&root, &mut path, prefix, &mut descriptions);
        Ok(Self { descriptions })
    }

    pub fn description_for(&self, var_name: &str) -> Option<&str> {
        self.descriptions.get(var_name).map(String::as_str)
    }

    /// Copies a token's description onto every `cssProperties` entry
    /// across `declarations` whose `name` matches and whose own
    /// description is empty, prefixed `"DESIGN TOKEN: "`.
    pub fn merge_into(&self, declarations: &mut [Declaration]) {
        for decl in declarations.iter_mut() {
            let Some(ce) = decl.as_custom_element_mut() else {
                continue;
            };
            for prop in &mut ce.css_properties {
                let is_empty = prop.description.as_deref().map(str::is_empty).unwrap_or(true);
                if !is_empty {
                    continue;
                }
                if let Some(desc) = self.description_for(&prop.name) {
                    prop.description = Some(format!("DESIGN TOKEN: {desc}"));
                }
            }
        }
    }
}

fn is_leaf_token(value: &Value) -> bool {
    value.get("$value").is_some() || value.get("value").is_some()
}

fn collect(value: &Value, path: &mut Vec<String>, prefix: &str, out: &mut HashMap<String, String>) {
    let Value::Object(map) = value else { return };

    if is_leaf_token(value) {
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("--{prefix}-{}", path.join("-")));
        let description = map
            .get("$description")
            .or_else(|| map.get("description"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !description.is_empty() {
            out.insert(name, description.to_string());
        }
        return;
    }

    for (key, child) in map {
        if key.starts_with('$') {
            continue;
        }
        path.push(key.clone());
        collect(child, path, prefix, out);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cem_model::{CssCustomProperty, CustomElementDeclaration};

    #[test]
    fn indexes_nested_dtcg_tokens_by_generated_variable_name() {
        let doc = r#"{
            "color": {
                "brand": { "$value": "#ff0000", "$description": "the brand color" }
            }
        }"#;
        let index = DesignTokenIndex::load(doc, "my-app").unwrap();
        assert_eq!(
            index.description_for("--my-app-color-brand"),
            Some("the brand color")
        );
    }

    #[test]
    fn prefers_explicit_name_field_over_generated_path() {
        let doc = r#"{ "color": { "brand": { "value": "#f00", "name": "--brand", "description": "d" } } }"#;
        let index = DesignTokenIndex::load(doc, "prefix").unwrap();
        assert_eq!(index.description_for("--brand"), Some("d"));
    }

    #[test]
    fn merge_only_fills_empty_descriptions() {
        let doc = r#"{ "brand": { "value": "#f00", "name": "--brand-color", "description": "token desc" } }"#;
        let index = DesignTokenIndex::load(doc, "x").unwrap();
        let mut declarations = vec![Declaration::CustomElement(CustomElementDeclaration {
            name: "MyElement".to_string(),
            tag_name: "my-element".to_string(),
            css_properties: vec![
                CssCustomProperty {
                    name: "--brand-color".to_string(),
                    syntax: None,
                    default: None,
                    description: None,
                },
                CssCustomProperty {
                    name: "--brand-color".to_string(),
                    syntax: None,
                    default: None,
                    description: Some("already documented".to_string()),
                },
            ],
            ..Default::default()
        })];
        index.merge_into(&mut declarations);
        let ce = declarations[0].as_custom_element().unwrap();
        assert_eq!(
            ce.css_properties[0].description.as_deref(),
            Some("DESIGN TOKEN: token desc")
        );
        assert_eq!(
            ce.css_properties[1].description.as_deref(),
            Some("already documented")
        );
    }
}
