//! Types for hosted backend requests and responses.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use zen_core::{CategoryId, MeditationId, UserId};

/// Configuration for connecting to the hosted backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project base URL (e.g., "https://abc.supabase.co")
    pub url: String,
    /// Public anonymous API key sent with every request
    pub anon_key: String,
    /// Overall request timeout
    pub timeout: Duration,
    /// Session restored from the host's secure storage, if any
    pub session: Option<Session>,
}

impl BackendConfig {
    /// Create a config with the project URL and anon key.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            timeout: Duration::from_secs(30),
            session: None,
        }
    }

    /// Start with a previously persisted session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Metadata attached to an auth user at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserMetadata {
    /// Metadata carrying the same display name in both fields.
    pub fn with_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: Some(name.clone()),
            full_name: Some(name),
        }
    }
}

/// Auth-service user record (distinct from the application profile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
}

/// Access/refresh token pair plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Token validity in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Result of a sign-up call.
///
/// With email confirmation enabled only `user` is present; with
/// auto-confirm a full session comes back. Both are absent when the
/// provider hides whether the address is already registered.
#[derive(Debug, Clone, Default)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

/// Auth state change notification, broadcast to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    PasswordRecovery,
    UserUpdated,
}

/// An auth state change together with the session after the change.
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

/// Request body for password sign-in.
#[derive(Debug, Serialize)]
pub(crate) struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for the refresh-token grant.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

/// Request body for sign-up.
#[derive(Debug, Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: &'a UserMetadata,
}

/// Request body carrying only an email (recover).
#[derive(Debug, Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub email: &'a str,
}

/// Request body for resending a confirmation email.
#[derive(Debug, Serialize)]
pub(crate) struct ResendRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub email: &'a str,
}

/// Request body for updating the signed-in user's password.
#[derive(Debug, Serialize)]
pub(crate) struct PasswordUpdate<'a> {
    pub password: &'a str,
}

// =============================================================================
// Table Rows
// =============================================================================

/// Row of the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Insert payload for `profiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

/// Projection of a `favorites` row.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FavoriteRow {
    pub meditation_id: MeditationId,
}

/// Insert payload for `favorites`.
#[derive(Debug, Serialize)]
pub(crate) struct NewFavorite<'a> {
    pub user_id: &'a UserId,
    pub meditation_id: &'a MeditationId,
}

/// Row of the `categories` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Category reference embedded in a meditation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedCategory {
    pub id: CategoryId,
    pub name: String,
}

/// Row of the `meditations` table with its embedded category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationRow {
    pub id: MeditationId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: CategoryId,
    pub duration_minutes: u32,
    pub audio_url: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub featured: bool,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub categories: Option<EmbeddedCategory>,
}
