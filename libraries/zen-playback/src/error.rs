//! Error types for the audio transport

use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// No meditation is currently loaded
    #[error("No meditation loaded")]
    NoMeditationLoaded,

    /// The media backend could not load a source
    #[error("Failed to load audio: {0}")]
    Load(String),

    /// The media backend rejected a command on a loaded sound
    #[error("Media backend error: {0}")]
    Media(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl PlaybackError {
    /// Shorthand for a backend command failure
    pub fn media(message: impl Into<String>) -> Self {
        Self::Media(message.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
