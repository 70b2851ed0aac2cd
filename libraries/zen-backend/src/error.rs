//! Error types for the hosted backend client.
//!
//! The provider reports failures as JSON bodies with a mix of machine codes
//! (`error_code`, `code`) and prose (`msg`, `message`, `error_description`).
//! They are classified into a [`BackendErrorKind`] once, here, so callers
//! match on the kind instead of on message text.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Classification of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendErrorKind {
    /// Wrong email or password
    InvalidCredentials,
    /// Account exists but the confirmation link was never followed
    EmailNotConfirmed,
    /// Sign-up for an email that already has an account
    UserAlreadyRegistered,
    /// New registrations are turned off on the project
    SignupDisabled,
    /// Password rejected by the provider's strength rules
    WeakPassword,
    /// Row or resource does not exist
    NotFound,
    /// Missing, expired, or rejected access token
    Unauthorized,
    /// Too many requests
    RateLimited,
    /// Connection failure or timeout
    Network,
    /// Any other server-side failure
    Server,
    /// Response body did not match the expected shape
    Decode,
    /// Client misconfiguration (bad URL, missing key)
    InvalidConfig,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidCredentials => "invalid credentials",
            Self::EmailNotConfirmed => "email not confirmed",
            Self::UserAlreadyRegistered => "user already registered",
            Self::SignupDisabled => "signup disabled",
            Self::WeakPassword => "weak password",
            Self::NotFound => "not found",
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate limited",
            Self::Network => "network",
            Self::Server => "server",
            Self::Decode => "decode",
            Self::InvalidConfig => "invalid config",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when talking to the hosted backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend is offline, unreachable, or timed out
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// Backend answered with an error body
    #[error("{message}")]
    Api {
        kind: BackendErrorKind,
        status: u16,
        message: String,
    },

    /// Authentication required but no session available
    #[error("Authentication required")]
    AuthRequired,

    /// Failed to parse a response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BackendError {
    /// Build an API error directly (used by fakes and tests)
    pub fn api(kind: BackendErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            kind,
            status,
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> BackendErrorKind {
        match self {
            Self::Request(e) if e.is_timeout() || e.is_connect() => BackendErrorKind::Network,
            Self::Request(e) if e.is_decode() => BackendErrorKind::Decode,
            Self::Request(_) | Self::Unreachable(_) => BackendErrorKind::Network,
            Self::Api { kind, .. } => *kind,
            Self::AuthRequired => BackendErrorKind::Unauthorized,
            Self::ParseError(_) => BackendErrorKind::Decode,
            Self::InvalidConfig(_) => BackendErrorKind::InvalidConfig,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { kind, status, .. } => {
                *kind == BackendErrorKind::RateLimited
                    || (*kind == BackendErrorKind::Server && *status >= 500)
            }
            other => other.kind() == BackendErrorKind::Network,
        }
    }

    /// Whether the backend reported a missing row
    pub fn is_not_found(&self) -> bool {
        self.kind() == BackendErrorKind::NotFound
    }

    /// Map a transport error, separating connectivity failures
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::Unreachable(e.to_string())
        } else {
            Self::Request(e)
        }
    }
}

/// Result type for backend client operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Union of the error body shapes the auth service and REST layer return.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorBody {
    fn text(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.error_description.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }

    fn code(&self) -> Option<String> {
        if let Some(code) = &self.error_code {
            return Some(code.clone());
        }
        match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            _ => None,
        }
    }
}

/// Classify an error response from its status and body.
pub(crate) fn classify(status: u16, body: &str) -> BackendError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .text()
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string());
    let kind = classify_kind(status, parsed.code().as_deref(), &message);

    BackendError::Api {
        kind,
        status,
        message: if message.is_empty() {
            format!("Request failed with status {}", status)
        } else {
            message
        },
    }
}

fn classify_kind(status: u16, code: Option<&str>, message: &str) -> BackendErrorKind {
    if let Some(code) = code {
        match code {
            "invalid_credentials" => return BackendErrorKind::InvalidCredentials,
            "email_not_confirmed" => return BackendErrorKind::EmailNotConfirmed,
            "user_already_exists" | "email_exists" => {
                return BackendErrorKind::UserAlreadyRegistered;
            }
            "signup_disabled" | "email_provider_disabled" => {
                return BackendErrorKind::SignupDisabled;
            }
            "weak_password" => return BackendErrorKind::WeakPassword,
            "over_request_rate_limit" | "over_email_send_rate_limit" => {
                return BackendErrorKind::RateLimited;
            }
            "PGRST116" | "user_not_found" => return BackendErrorKind::NotFound,
            "bad_jwt" | "no_authorization" | "session_not_found" | "PGRST301" => {
                return BackendErrorKind::Unauthorized;
            }
            _ => {}
        }
    }

    // Older deployments omit `error_code` and only send prose
    let lower = message.to_lowercase();
    if lower.contains("invalid login credentials") {
        return BackendErrorKind::InvalidCredentials;
    }
    if lower.contains("email not confirmed") {
        return BackendErrorKind::EmailNotConfirmed;
    }
    if lower.contains("user already registered") {
        return BackendErrorKind::UserAlreadyRegistered;
    }
    if lower.contains("signup disabled") || lower.contains("signups not allowed") {
        return BackendErrorKind::SignupDisabled;
    }

    match status {
        401 | 403 => BackendErrorKind::Unauthorized,
        404 => BackendErrorKind::NotFound,
        422 if lower.contains("password") => BackendErrorKind::WeakPassword,
        429 => BackendErrorKind::RateLimited,
        _ => BackendErrorKind::Server,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(status: u16, body: &str) -> BackendErrorKind {
        classify(status, body).kind()
    }

    #[test]
    fn structured_codes_take_priority() {
        assert_eq!(
            kind_of(400, r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#),
            BackendErrorKind::InvalidCredentials
        );
        assert_eq!(
            kind_of(400, r#"{"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#),
            BackendErrorKind::EmailNotConfirmed
        );
        assert_eq!(
            kind_of(422, r#"{"error_code":"user_already_exists","msg":"User already registered"}"#),
            BackendErrorKind::UserAlreadyRegistered
        );
        assert_eq!(
            kind_of(422, r#"{"error_code":"signup_disabled","msg":"Signups not allowed for this instance"}"#),
            BackendErrorKind::SignupDisabled
        );
    }

    #[test]
    fn rest_layer_no_rows_is_not_found() {
        let err = classify(
            406,
            r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#,
        );
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn legacy_prose_bodies_are_classified() {
        assert_eq!(
            kind_of(400, r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#),
            BackendErrorKind::EmailNotConfirmed
        );
        assert_eq!(
            kind_of(400, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            BackendErrorKind::InvalidCredentials
        );
    }

    #[test]
    fn status_fallbacks() {
        assert_eq!(kind_of(401, ""), BackendErrorKind::Unauthorized);
        assert_eq!(kind_of(404, "missing"), BackendErrorKind::NotFound);
        assert_eq!(kind_of(429, "{}"), BackendErrorKind::RateLimited);
        assert_eq!(kind_of(503, "upstream down"), BackendErrorKind::Server);
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(classify(503, "").is_transient());
        assert!(classify(429, "").is_transient());
        assert!(!classify(400, r#"{"error_code":"invalid_credentials"}"#).is_transient());
        assert!(BackendError::Unreachable("refused".into()).is_transient());
        assert!(!BackendError::AuthRequired.is_transient());
    }

    #[test]
    fn message_prefers_provider_text() {
        let err = classify(400, r#"{"msg":"Invalid login credentials"}"#);
        assert_eq!(err.to_string(), "Invalid login credentials");

        let err = classify(500, "");
        assert_eq!(err.to_string(), "Request failed with status 500");
    }
}
