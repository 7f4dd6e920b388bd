//! Wraps a CSS file as a JS module exporting a constructable
//! `CSSStyleSheet`, so plain
//! `import styles from './x.css'` works in a module-enabled browser.

use super::cache::CompiledSource;

pub fn to_module(css_text: &str) -> CompiledSource {
    let escaped = escape_template_literal(css_text);
    let code = format!(
        "const sheet = new CSSStyleSheet();\nsheet.replaceSync(`{escaped}`);\nexport default sheet;\n"
    );
    CompiledSource {
        code,
        mime: "application/javascript",
    }
}

fn escape_template_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_css_as_constructable_stylesheet() {
        let out = to_module(":host { color: red; }");
        assert!(out.code.contains("new CSSStyleSheet()"));
        assert!(out.code.contains(":host { color: red; }"));
        assert!(out.code.contains("export default sheet;"));
        assert_eq!(out.mime, "application/javascript");
    }

    #[test]
    fn escapes_backticks_and_interpolation_markers() {
        let out = to_module("content: \"a`b${c}\";");
        assert!(out.code.contains("\\`"));
        assert!(out.code.contains("\\${"));
    }
}
