//! Error types for session management.

use thiserror::Error;
use zen_backend::{BackendError, BackendErrorKind};
use zen_core::ZenError;

/// Errors surfaced by the session layer.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The hosted backend rejected or failed the call
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Input failed validation
    #[error(transparent)]
    Validation(#[from] ZenError),

    /// Sign-up for an email that already has a profile
    #[error("User already registered")]
    AlreadyRegistered,

    /// Deep-link URL could not be parsed
    #[error("Invalid callback URL: {0}")]
    InvalidCallback(String),

    /// The session worker has shut down
    #[error("Session worker stopped")]
    WorkerStopped,
}

impl SessionError {
    /// Backend classification of this error, if it has one
    pub fn kind(&self) -> Option<BackendErrorKind> {
        match self {
            Self::Backend(e) => Some(e.kind()),
            Self::AlreadyRegistered => Some(BackendErrorKind::UserAlreadyRegistered),
            _ => None,
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_registered_maps_to_backend_kind() {
        assert_eq!(
            SessionError::AlreadyRegistered.kind(),
            Some(BackendErrorKind::UserAlreadyRegistered)
        );
    }

    #[test]
    fn backend_message_is_passed_through() {
        let err = SessionError::from(BackendError::api(
            BackendErrorKind::InvalidCredentials,
            400,
            "Invalid login credentials",
        ));
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert_eq!(err.kind(), Some(BackendErrorKind::InvalidCredentials));
    }

    #[test]
    fn worker_errors_have_no_kind() {
        assert_eq!(SessionError::WorkerStopped.kind(), None);
    }
}
