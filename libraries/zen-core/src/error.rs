/// Core error types for Desert Zen
use thiserror::Error;

/// Result type alias using `ZenError`
pub type Result<T> = std::result::Result<T, ZenError>;

/// Core error type for Desert Zen
#[derive(Error, Debug)]
pub enum ZenError {
    /// Form input that fails local validation
    #[error("{0}")]
    InvalidInput(String),
}

impl ZenError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
