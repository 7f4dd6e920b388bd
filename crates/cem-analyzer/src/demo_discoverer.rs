//! HTML demo discovery: glob for demo files, turn a
//! matched path into a canonical URL via a named-capture regex and a
//! template, then scan the file's `<script type="module">` imports to
//! find which already-processed module(s) it exercises.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use cem_model::{Demo, Module};
use cem_workspace::Workspace;

use crate::error::{AnalyzeError, Result};
use crate::parser_pool::{Language, ParserPool};
use crate::queries::QueryRegistry;

pub struct DemoDiscoveryConfig<'a> {
    pub file_glob: &'a str,
    pub url_pattern: &'a str,
    pub url_template: &'a str,
}

static IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s+(?:[^'";]*?from\s+)?['"]([^'"]+)['"]"#).expect("static regex"));

/// Attaches a `Demo` to every `CustomElementDeclaration` whose module is
/// imported from a matched demo file. Files matching no
/// module, or with no module-script import, are silently skipped — not
/// every demo file documents a custom element.
pub fn discover(
    workspace: &dyn Workspace,
    pool: &ParserPool,
    registry: &QueryRegistry,
    config: &DemoDiscoveryConfig<'_>,
    modules: &mut [Module],
) -> Result<()> {
    let url_pattern = Regex::new(config.url_pattern).map_err(AnalyzeError::InvalidDemoPattern)?;

    for demo_path in workspace.glob(config.file_glob)? {
        let Some(caps) = url_pattern.captures(&demo_path) else {
            continue;
        };
        let url = interpolate(config.url_template, &caps)?;

        let bytes = workspace.read_file(&demo_path)?;
        let source = String::from_utf8_lossy(&bytes).into_owned();
        let Some(tree) = pool.parse(Language::Html, &source) else {
            continue;
        };
        let demo_dir = Path::new(&demo_path).parent();

        for script_match in registry.html_demo_scripts(tree.root_node(), &source) {
            let is_module_script = script_match
                .get("script.attr_name")
                .and_then(|v| v.first())
                .map(|c| c.text(&source) == "type")
                .unwrap_or(false)
                && script_match
                    .get("script.attr_value")
                    .and_then(|v| v.first())
                    .map(|c| c.text(&source) == "module")
                    .unwrap_or(false);
            if !is_module_script {
                continue;
            }
            let Some(body) = script_match.get("script.body").and_then(|v| v.first()) else {
                continue;
            };
            for specifier in import_specifiers(body.text(&source)) {
                let Some(target_path) = resolve_relative(demo_dir, &specifier) else {
                    continue;
                };
                let Some(module) = modules.iter_mut().find(|m| m.path == target_path) else {
                    continue;
                };
                for decl in &mut module.declarations {
                    if let Some(ce) = decl.as_custom_element_mut() {
                        ce.demos.push(Demo {
                            url: url.clone(),
                            source: Some(demo_path.clone()),
                            description: None,
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

/// Expands `{group}` placeholders in `template` from `caps`'s named
/// groups. A placeholder with no matching group is a hard error rather
/// than a silent leave-unreplaced, since a half-interpolated URL would
/// be worse than failing generation outright.
fn interpolate(template: &str, caps: &Captures<'_>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let group = &after[..end];
        match caps.name(group) {
            Some(m) => out.push_str(m.as_str()),
            None => {
                return Err(AnalyzeError::DemoTemplate {
                    template: template.to_string(),
                    group: group.to_string(),
                })
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn import_specifiers(text: &str) -> Vec<String> {
    IMPORT_RE.captures_iter(text).map(|c| c[1].to_string()).collect()
}

/// Resolves a relative import specifier against the demo file's
/// directory into a project-root-relative path, purely lexically (no
/// filesystem access — the result is only ever compared against already
/// known `Module.path` strings).
fn resolve_relative(demo_dir: Option<&Path>, specifier: &str) -> Option<String> {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return None;
    }
    let mut segments: Vec<&str> = demo_dir
        .map(|d| d.components().map(|c| c.as_os_str().to_str().unwrap_or("")).collect())
        .unwrap_or_default();
    for part in specifier.split('/') {
        match part {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_named_capture_groups() {
        let pattern = Regex::new(r"^demo/(?P<slug>[^/]+)/index\.html$").unwrap();
        let caps = pattern.captures("demo/my-element/index.html").unwrap();
        let url = interpolate("https://example.com/demos/{slug}/", &caps).unwrap();
        assert_eq!(url, "https://example.com/demos/my-element/");
    }

    #[test]
    fn missing_capture_group_is_an_error() {
        let pattern = Regex::new(r"^demo/(?P<slug>[^/]+)/index\.html$").unwrap();
        let caps = pattern.captures("demo/my-element/index.html").unwrap();
        let err = interpolate("https://example.com/{missing}/", &caps).unwrap_err();
        assert!(matches!(err, AnalyzeError::DemoTemplate { .. }));
    }

    #[test]
    fn resolves_relative_specifier_against_demo_directory() {
        let dir = Path::new("demo/my-element");
        assert_eq!(
            resolve_relative(Some(dir), "../../src/my-element.js"),
            Some("src/my-element.js".to_string())
        );
    }

    #[test]
    fn extracts_bare_and_named_imports() {
        let specifiers = import_specifiers("import './a.js'; import { X } from '../b.js';");
        assert_eq!(specifiers, vec!["./a.js".to_string(), "../b.js".to_string()]);
    }
}
