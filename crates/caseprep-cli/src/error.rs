use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] caseprep_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No text provided")]
    EmptyText,
    #[error("Case ID cannot be empty")]
    EmptyCaseId,
    #[error("Case not found for id/prefix: {0}")]
    CaseNotFound(String),
    #[error("{0}")]
    AmbiguousCaseId(String),
    #[error("Positions start at 1")]
    InvalidPosition,
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Profile '{0}' is not signed in. Run `caseprep auth login --email <email> --password <password>`.")]
    SignInRequired(String),
    #[error("{0} change(s) could not be saved")]
    FlushFailed(usize),
}
