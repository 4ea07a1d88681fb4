//! Error types for keymagic.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Setup errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Remote licensing errors
    #[error("Licensing request failed: {0}")]
    Transport(String),

    #[error("Unexpected licensing response: {0}")]
    UnexpectedResponse(String),

    // Form errors
    #[error("Nonce verification failed for action: {0}")]
    InvalidNonce(String),

    #[error("Setting is managed by the licensing service: {0}")]
    ReadOnlySetting(String),

    // Infrastructure errors
    #[error("Settings store error: {0}")]
    Store(String),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether the error came from talking to the licensing service.
    ///
    /// Callers treat these as a silent no-op: the persisted status stays as
    /// it was and the next scheduled check tries again.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::UnexpectedResponse(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
