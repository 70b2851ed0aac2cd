//! Session states and the events that drive them.

use serde::Serialize;
use zen_backend::Session;
use zen_core::{User, UserId};

/// Where the session currently stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Startup; the persisted session has not been examined yet
    Uninitialized,

    /// A user is signed in and their profile is being resolved
    Loading,

    /// Profile resolved
    Authenticated(User),

    /// The user explicitly dismissed sign-in
    Guest,

    /// No session
    Unauthenticated,

    /// Profile lookup or creation failed for a signed-in user.
    ///
    /// Stays here until the next event (sign-in, sign-out, guest, ...).
    Stalled {
        /// User whose profile could not be resolved
        user_id: UserId,
        /// Failure description
        reason: String,
    },
}

impl SessionState {
    /// Resolved user, if any
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Whether a resolution is still pending
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }

    /// Whether the user chose guest mode
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    /// Short label for logs and the CLI
    pub fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Authenticated(_) => "authenticated",
            Self::Guest => "guest",
            Self::Unauthenticated => "unauthenticated",
            Self::Stalled { .. } => "stalled",
        }
    }
}

/// Discrete inputs to the session state machine
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Startup: the session found in persistent storage, if any
    SessionRestored(Option<Session>),

    /// A session was established (password sign-in, deep-link exchange, auto-confirmed sign-up)
    SignedIn(Session),

    /// The session ended
    SignedOut,

    /// Tokens were rotated for the current session
    TokenRefreshed(Session),

    /// A recovery link was followed; the user must set a new password
    PasswordRecoveryRequested(Session),

    /// The user chose to continue without an account
    GuestRequested,
}

impl SessionEvent {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::SessionRestored(_) => "session_restored",
            Self::SignedIn(_) => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed(_) => "token_refreshed",
            Self::PasswordRecoveryRequested(_) => "password_recovery",
            Self::GuestRequested => "guest_requested",
        }
    }
}

/// Everything observers see about the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// State machine position
    pub state: SessionState,

    /// Current backend session (tokens + auth user)
    pub session: Option<Session>,

    /// A recovery link was followed and the password has not been changed yet
    pub recovery_pending: bool,
}

impl SessionSnapshot {
    /// Resolved user, if any
    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: SessionState::Uninitialized,
            session: None,
            recovery_pending: false,
        }
    }
}
