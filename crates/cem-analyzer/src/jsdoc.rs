//! JSDoc comment extraction and tag folding.
//!
//! Extraction (pairing a comment with the declaration/member it
//! documents) happens in `module_processor`; this module only turns a
//! single `/** ... */` comment's text into a structured value. Folding
//! is pure: the same comment text always yields the same `JsDocComment`.

use once_cell::sync::Lazy;
use regex::Regex;

/// One `@tag` line: the tag name, an optional `{type}` annotation, an
/// optional leading identifier (a param/attr/slot/cssprop name), and the
/// remaining free-text description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsDocTag {
    pub tag: String,
    pub type_text: Option<String>,
    pub name: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsDocComment {
    pub start_byte: usize,
    pub end_byte: usize,
    /// Free text before the first `@tag` line (or an explicit `@description`).
    pub description: Option<String>,
    pub summary: Option<String>,
    pub deprecated: Option<crate::DeprecatedTag>,
    pub tags: Vec<JsDocTag>,
}

impl JsDocComment {
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a JsDocTag> {
        self.tags.iter().filter(move |t| t.tag == name)
    }
}

static TAG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@(?P<tag>[A-Za-z][\w-]*)(?:\s+\{(?P<type>[^}]*)\})?(?:\s+(?P<name>[^\s-][\w./:*-]*))?(?:\s*[-–]?\s*(?P<desc>.*))?$")
        .expect("static JSDoc tag regex is valid")
});

/// Parses one `/** ... */` (or `//`-style, tolerated for robustness)
/// comment's text into summary/description/tags, per the tag set named
/// below.
pub fn parse(raw: &str, start_byte: usize, end_byte: usize) -> JsDocComment {
    let stripped = raw
        .trim()
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_end_matches("*/")
        .trim();

    let mut description_lines: Vec<String> = Vec::new();
    let mut tags: Vec<JsDocTag> = Vec::new();

    for raw_line in stripped.lines() {
        let line = raw_line.trim().trim_start_matches('*').trim();
        if line.is_empty() {
            continue;
        }
        if let Some(line) = line.strip_prefix('@') {
            let full = format!("@{line}");
            if let Some(caps) = TAG_LINE.captures(&full) {
                let tag = normalize_tag_alias(&caps["tag"]);
                let type_text = caps.name("type").map(|m| m.as_str().trim().to_string());
                let name = caps.name("name").map(|m| m.as_str().trim().to_string());
                let description = caps
                    .name("desc")
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                tags.push(JsDocTag {
                    tag,
                    type_text,
                    name,
                    description,
                });
                continue;
            }
        }
        if tags.is_empty() {
            description_lines.push(line.to_string());
        } else if let Some(last) = tags.last_mut() {
            if last.description.is_empty() {
                last.description = line.to_string();
            } else {
                last.description.push(' ');
                last.description.push_str(line);
            }
        }
    }

    let mut comment = JsDocComment {
        start_byte,
        end_byte,
        description: None,
        summary: None,
        deprecated: None,
        tags,
    };

    if !description_lines.is_empty() {
        comment.description = Some(description_lines.join(" "));
    }
    if let Some(summary_tag) = comment.tags.iter().find(|t| t.tag == "summary") {
        comment.summary = Some(summary_tag.description.clone());
    }
    if let Some(description_tag) = comment.tags.iter().find(|t| t.tag == "description") {
        comment.description = Some(description_tag.description.clone());
    }
    if let Some(dep) = comment.tags.iter().find(|t| t.tag == "deprecated") {
        comment.deprecated = Some(if dep.description.is_empty() {
            crate::DeprecatedTag::Flag
        } else {
            crate::DeprecatedTag::Reason(dep.description.clone())
        });
    }

    comment
}

/// Several tags have a shorthand/longhand pair;
/// normalize to the longhand so folding downstream only checks one name.
fn normalize_tag_alias(tag: &str) -> String {
    match tag {
        "event" => "fires",
        "cssproperty" => "cssprop",
        "attribute" => "attr",
        "tagname" => "tag",
        "return" => "returns",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_description_and_tags() {
        let doc = parse(
            "/**\n * A basic element.\n * @deprecated use new-element instead\n * @slot - default slot\n */",
            0,
            0,
        );
        assert_eq!(doc.description.as_deref(), Some("A basic element."));
        assert_eq!(
            doc.deprecated,
            Some(crate::DeprecatedTag::Reason(
                "use new-element instead".to_string()
            ))
        );
        assert_eq!(doc.tags_named("slot").count(), 1);
    }

    #[test]
    fn parses_typed_tag_with_name() {
        let doc = parse(
            "/** @cssprop {<color>} --brand-color - the brand color */",
            0,
            0,
        );
        let tag = doc.tags_named("cssprop").next().unwrap();
        assert_eq!(tag.type_text.as_deref(), Some("<color>"));
        assert_eq!(tag.name.as_deref(), Some("--brand-color"));
        assert_eq!(tag.description, "the brand color");
    }

    #[test]
    fn normalizes_shorthand_aliases() {
        let doc = parse("/** @event change - fired on change */", 0, 0);
        assert_eq!(doc.tags[0].tag, "fires");
    }

    #[test]
    fn bare_deprecated_tag_has_no_reason() {
        let doc = parse("/** @deprecated */", 0, 0);
        assert_eq!(doc.deprecated, Some(crate::DeprecatedTag::Flag));
    }
}
