//! Auth email links: callback URL parsing and routing.

use crate::error::{Result, SessionError};
use std::future::Future;
use url::Url;
use zen_backend::Session;

/// Flow an auth email link belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    /// Password reset link
    Recovery,
    /// Sign-up confirmation link
    Signup,
    /// Anything else (magic link, absent `type`)
    Other,
}

impl CallbackKind {
    fn parse(value: &str) -> Self {
        match value {
            "recovery" => Self::Recovery,
            "signup" => Self::Signup,
            _ => Self::Other,
        }
    }
}

/// Parameters carried by an auth callback URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCallback {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub kind: Option<CallbackKind>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl AuthCallback {
    /// Both tokens, if the link carries a session
    pub fn tokens(&self) -> Option<(&str, &str)> {
        match (self.access_token.as_deref(), self.refresh_token.as_deref()) {
            (Some(access), Some(refresh)) => Some((access, refresh)),
            _ => None,
        }
    }

    /// Error text to show: the description if present, else the code
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().map(|code| self.error_description.as_deref().unwrap_or(code))
    }
}

/// Where the app should go after handling a callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackRoute {
    /// Back to sign-in showing this message
    Error(String),
    /// Recovery session established; ask for a new password
    SetNewPassword,
    /// Email confirmed
    SignupConfirmed,
    /// Session established; go to the main screen
    Home,
    /// Nothing actionable in the link
    Auth,
}

/// Parse an auth callback URL
///
/// Accepts both app-scheme (`desertzen://auth/callback?...`) and web
/// bridge URLs. Parameters may arrive in the query or in the fragment
/// (`#access_token=...`); fragment values win.
pub fn parse_auth_callback(url: &str) -> Result<AuthCallback> {
    let parsed =
        Url::parse(url).map_err(|e| SessionError::InvalidCallback(format!("{}: {}", url, e)))?;

    let mut callback = AuthCallback::default();
    let fragment_pairs = parsed
        .fragment()
        .map(|fragment| url::form_urlencoded::parse(fragment.as_bytes()).into_owned().collect::<Vec<_>>())
        .unwrap_or_default();

    for (key, value) in parsed.query_pairs().into_owned().chain(fragment_pairs) {
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "access_token" => callback.access_token = Some(value),
            "refresh_token" => callback.refresh_token = Some(value),
            "type" => callback.kind = Some(CallbackKind::parse(&value)),
            "error" => callback.error = Some(value),
            "error_description" => callback.error_description = Some(value),
            _ => {}
        }
    }

    Ok(callback)
}

/// Decide where a callback leads, exchanging its tokens for a session.
///
/// `exchange` is called only when the link carries both tokens and no error.
pub async fn resolve_callback<F, Fut>(callback: &AuthCallback, exchange: F) -> CallbackRoute
where
    F: FnOnce(String, String) -> Fut,
    Fut: Future<Output = Result<Session>>,
{
    if let Some(message) = callback.error_message() {
        return CallbackRoute::Error(message.to_string());
    }

    if let Some((access, refresh)) = callback.tokens() {
        return match exchange(access.to_string(), refresh.to_string()).await {
            Ok(_) => match callback.kind {
                Some(CallbackKind::Recovery) => CallbackRoute::SetNewPassword,
                Some(CallbackKind::Signup) => CallbackRoute::SignupConfirmed,
                _ => CallbackRoute::Home,
            },
            Err(e) => CallbackRoute::Error(e.to_string()),
        };
    }

    if callback.kind == Some(CallbackKind::Signup) {
        CallbackRoute::SignupConfirmed
    } else {
        CallbackRoute::Auth
    }
}
