//! Error types for caseprep-core

use thiserror::Error;

/// Result type alias using caseprep-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in caseprep-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Case not found
    #[error("Case not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Hosted backend error (transport or API)
    #[error("Remote store error: {0}")]
    Remote(String),

    /// No active session; the caller must send the user to sign in
    #[error("Sign-in required")]
    SignInRequired,

    /// List position does not exist
    #[error("Index {index} out of range for {what} (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Side selector is bound to a fixed side
    #[error("Side selector is locked to one side")]
    SideLocked,
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Remote(error.to_string())
    }
}
