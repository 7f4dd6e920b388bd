//! Transform Middleware: on-the-fly TypeScript and
//! CSS-to-module compilation with a shared single-flight cache.

mod cache;
mod css;
mod typescript;

pub use cache::{CacheKey, CompiledSource, TransformCache};

use std::path::Path;

use crate::error::{Result, ServerError};
use crate::options::ServeOptions;

/// Version stamp folded into the cache key; bumped whenever the transform output for a given source
/// would change for a reason other than the source or target changing.
pub const TRANSFORMER_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    TypeScript,
    Css,
}

/// Decides whether `path` (project-root-relative, forward-slash) is
/// handled by the transform middleware, and if so which transformer.
pub fn classify(path: &str, options: &ServeOptions) -> Option<Kind> {
    if options.typescript_enabled && (path.ends_with(".ts") || path.ends_with(".tsx")) {
        return Some(Kind::TypeScript);
    }
    if options.css.enabled && matches_css(path, options) {
        return Some(Kind::Css);
    }
    None
}

fn matches_css(path: &str, options: &ServeOptions) -> bool {
    if options.css.include.is_empty() {
        return false;
    }
    let included = build_globset(&options.css.include).is_match(path);
    let excluded = !options.css.exclude.is_empty() && build_globset(&options.css.exclude).is_match(path);
    included && !excluded
}

fn build_globset(patterns: &[String]) -> globset::GlobSet {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = globset::Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| globset::GlobSetBuilder::new().build().unwrap())
}

/// Runs the transform for `path`, consulting `cache` first. `root` is the
/// workspace's absolute root, used to stat the file's mtime and to read
/// its contents.
pub async fn run(
    kind: Kind,
    root: &Path,
    path: &str,
    target: &str,
    cache: &TransformCache,
) -> Result<CompiledSource> {
    let abs = root.join(path);
    let metadata = tokio::fs::metadata(&abs).await?;
    let mtime_nanos = mtime_nanos(&metadata);
    let key = CacheKey {
        path: abs.clone(),
        mtime_nanos,
        target: target.to_string(),
        transformer_version: TRANSFORMER_VERSION,
    };

    let path_owned = path.to_string();
    let target_owned = target.to_string();
    cache
        .get_or_compile(key, move || async move {
            let text = tokio::fs::read_to_string(&abs).await?;
            match kind {
                Kind::TypeScript => typescript::transpile(&path_owned, text, &target_owned),
                Kind::Css => Ok(css::to_module(&text)),
            }
        })
        .await
}

fn mtime_nanos(metadata: &std::fs::Metadata) -> i128 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as i128)
        .unwrap_or(0)
}

pub(crate) fn transform_error(path: &str, message: impl std::fmt::Display) -> ServerError {
    ServerError::Transform {
        path: path.to_string(),
        message: message.to_string(),
    }
}
