use thiserror::Error;

/// Top-level error type for Parrot.
#[derive(Debug, Error)]
pub enum ParrotError {
    /// Malformed command or rule arguments — reported back to the requester.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Requester is not in the admin set. Deliberately carries no detail.
    #[error("not permitted")]
    Unauthorized,

    /// Edit/delete/cancel referenced a key that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Durable store unavailable or a write was rejected.
    #[error("store error: {0}")]
    Store(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
