use thiserror::Error;

/// Errors raised while building, loading or querying a manifest document.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duplicate module path: {0}")]
    DuplicateModulePath(String),

    #[error("module path is not project-root-relative or uses backslashes: {0}")]
    InvalidModulePath(String),

    #[error("duplicate declaration name {name:?} in module {module:?}")]
    DuplicateDeclarationName { module: String, name: String },

    #[error("duplicate tag name {0:?} across package")]
    DuplicateTagName(String),

    #[error("attribute {attr:?} on {tag:?} references unknown field {field:?}")]
    UnknownFieldReference {
        tag: String,
        attr: String,
        field: String,
    },

    #[error("custom-element-definition export {name:?} in module {module:?} has no matching declaration")]
    DanglingExportReference { module: String, name: String },

    #[error("unknown declaration kind {0:?}")]
    UnknownKind(String),

    #[error("demo url could not be canonicalized: {0}")]
    InvalidDemoUrl(String),

    #[error("failed to parse manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
