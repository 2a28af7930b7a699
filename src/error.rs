use thiserror::Error;

/// CNC intake errors
///
/// File validation failures are not errors; they are reported as
/// [`RejectionReason`](crate::intake::RejectionReason) values. This enum
/// covers the runtime failures around the intake core.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upload transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Event bus errors
    #[error("Event error: {0}")]
    Event(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Mutex poison error
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl<T> From<std::sync::PoisonError<T>> for IntakeError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        IntakeError::LockPoisoned(err.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> Result<T, IntakeError>;
}

impl<T, E: Into<IntakeError>> ErrorContext<T> for Result<T, E> {
    fn context(self, msg: &str) -> Result<T, IntakeError> {
        self.map_err(|e| {
            let err: IntakeError = e.into();
            match err {
                IntakeError::Other(s) => IntakeError::Other(format!("{}: {}", msg, s)),
                IntakeError::Config(s) => IntakeError::Config(format!("{}: {}", msg, s)),
                IntakeError::Transport(s) => IntakeError::Transport(format!("{}: {}", msg, s)),
                IntakeError::Event(s) => IntakeError::Event(format!("{}: {}", msg, s)),
                IntakeError::LockPoisoned(s) => {
                    IntakeError::LockPoisoned(format!("{}: {}", msg, s))
                }
                IntakeError::Io(e) => IntakeError::Io(e),
                IntakeError::Json(e) => IntakeError::Json(e),
            }
        })
    }
}
