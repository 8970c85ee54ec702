//! Logging errors.

/// Errors raised while setting up logging.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The level/filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed.
    #[error("logger already initialised: {0}")]
    AlreadyInitialized(String),
}

/// Result alias for logging setup.
pub type LogResult<T> = Result<T, LogError>;
