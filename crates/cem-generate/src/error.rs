use thiserror::Error;

/// One source file's failure during the fan-out in `Coordinator::generate`:
/// recorded against the file, the coordinator continues with the rest, and
/// every failure is joined into a single [`GenerateError::Composite`].
#[derive(Debug)]
pub struct FileFailure {
    pub path: String,
    pub source: cem_analyzer::AnalyzeError,
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.source)
    }
}

impl std::error::Error for FileFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Workspace(#[from] cem_workspace::WorkspaceError),

    #[error(transparent)]
    Model(#[from] cem_model::ModelError),

    #[error(transparent)]
    Analyze(#[from] cem_analyzer::AnalyzeError),

    #[error("{message}")]
    Composite {
        message: String,
        failures: Vec<FileFailure>,
    },

    #[error("generation cancelled")]
    Cancelled,
}

impl GenerateError {
    pub fn composite(failures: Vec<FileFailure>) -> Self {
        let mut message = format!("{} of the source file(s) failed to parse:", failures.len());
        for failure in &failures {
            message.push_str("\n  ");
            message.push_str(&failure.to_string());
        }
        GenerateError::Composite { message, failures }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
