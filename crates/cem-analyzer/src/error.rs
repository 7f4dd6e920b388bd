use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{path}: syntax error near byte {byte}")]
    Syntax { path: String, byte: usize },

    #[error("unsupported source extension: {0}")]
    UnsupportedExtension(String),

    #[error("failed to compile query {name}: {source}")]
    QueryCompile {
        name: &'static str,
        #[source]
        source: tree_sitter::QueryError,
    },

    #[error("demo url template {template:?} references unmatched capture group {group:?}")]
    DemoTemplate { template: String, group: String },

    #[error("invalid demo url pattern: {0}")]
    InvalidDemoPattern(#[source] regex::Error),

    #[error("invalid design token document: {0}")]
    InvalidTokenDocument(String),

    #[error(transparent)]
    Workspace(#[from] cem_workspace::WorkspaceError),

    #[error(transparent)]
    Model(#[from] cem_model::ModelError),
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
