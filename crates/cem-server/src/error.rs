use thiserror::Error;

/// Errors the dev server surfaces, mirroring the per-crate error enums
/// used throughout this workspace (`WorkspaceError`, `GenerateError`, ...)
/// rather than a single catch-all type.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid target {0:?}: expected one of es2015..es2023, esnext")]
    InvalidTarget(String),

    #[error(transparent)]
    Workspace(#[from] cem_workspace::WorkspaceError),

    #[error(transparent)]
    Generate(#[from] cem_generate::GenerateError),

    #[error("could not bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("transform failed for {path}: {message}")]
    Transform { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
