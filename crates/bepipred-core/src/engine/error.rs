use crate::core::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Required program '{program}' was not found on PATH")]
    MissingProgram { program: String },

    #[error("Another installation is in progress (lock file {})", .lock.display())]
    InstallInProgress { lock: PathBuf },

    #[error("Installation step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract archive '{}': {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("No activation command available for {tool}")]
    NotActivatable { tool: String },

    #[error("Command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Job failed: {0}")]
    Job(String),

    #[error("Installation is not ready:\n{0}")]
    NotReady(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| EngineError::Io { path, source }
    }
}
