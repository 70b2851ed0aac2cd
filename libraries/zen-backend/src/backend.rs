//! Capability traits the session and catalog layers are written against.
//!
//! [`BackendClient`] implements both; tests substitute in-memory fakes.

use crate::client::BackendClient;
use crate::error::Result;
use crate::types::{AuthChange, AuthUser, CategoryRow, MeditationRow, NewProfile, ProfileRow, Session, SignUpOutcome, UserMetadata};
use async_trait::async_trait;
use tokio::sync::broadcast;
use zen_core::{MeditationId, UserId};

/// Hosted authentication service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Email/password sign-in
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Register; the confirmation email links to `redirect_to`
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome>;

    /// End the current session
    async fn sign_out(&self) -> Result<()>;

    /// Email a password reset link
    async fn reset_password(&self, email: &str, redirect_to: Option<&str>) -> Result<()>;

    /// Change the signed-in user's password
    async fn update_password(&self, password: &str) -> Result<AuthUser>;

    /// Resend the sign-up confirmation email
    async fn resend_confirmation(&self, email: &str, redirect_to: Option<&str>) -> Result<()>;

    /// Exchange a token pair (from a deep link) for a session
    async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session>;

    /// Session currently held, if any
    async fn current_session(&self) -> Option<Session>;

    /// Auth state change notifications
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}

/// Hosted relational store (profiles, favorites, catalog tables).
#[async_trait]
pub trait DataBackend: Send + Sync {
    /// Profile by user id; a missing row is a `NotFound` error
    async fn fetch_profile(&self, user_id: &UserId) -> Result<ProfileRow>;

    /// Profile by email, if any
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<ProfileRow>>;

    /// Insert a profile and return the stored row
    async fn create_profile(&self, profile: &NewProfile) -> Result<ProfileRow>;

    /// Favorited meditation ids for a user
    async fn list_favorites(&self, user_id: &UserId) -> Result<Vec<MeditationId>>;

    /// Insert a `(user_id, meditation_id)` favorite row
    async fn insert_favorite(&self, user_id: &UserId, meditation_id: &MeditationId) -> Result<()>;

    /// Delete a `(user_id, meditation_id)` favorite row
    async fn delete_favorite(&self, user_id: &UserId, meditation_id: &MeditationId) -> Result<()>;

    /// Categories ordered by name
    async fn list_categories(&self) -> Result<Vec<CategoryRow>>;

    /// Meditations with embedded category, newest first
    async fn list_meditations(&self) -> Result<Vec<MeditationRow>>;
}

#[async_trait]
impl AuthBackend for BackendClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        BackendClient::sign_in(self, email, password).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome> {
        BackendClient::sign_up(self, email, password, metadata, redirect_to).await
    }

    async fn sign_out(&self) -> Result<()> {
        BackendClient::sign_out(self).await
    }

    async fn reset_password(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        BackendClient::reset_password(self, email, redirect_to).await
    }

    async fn update_password(&self, password: &str) -> Result<AuthUser> {
        BackendClient::update_password(self, password).await
    }

    async fn resend_confirmation(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        BackendClient::resend_confirmation(self, email, redirect_to).await
    }

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session> {
        BackendClient::set_session(self, access_token, refresh_token).await
    }

    async fn current_session(&self) -> Option<Session> {
        self.session().await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        BackendClient::subscribe(self)
    }
}

#[async_trait]
impl DataBackend for BackendClient {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<ProfileRow> {
        self.with_auto_refresh(move || async move {
            let bearer = self.bearer().await;
            self.tables(&bearer).fetch_profile(user_id).await
        })
        .await
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<ProfileRow>> {
        self.with_auto_refresh(move || async move {
            let bearer = self.bearer().await;
            self.tables(&bearer).find_profile_by_email(email).await
        })
        .await
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<ProfileRow> {
        self.with_auto_refresh(move || async move {
            let bearer = self.bearer().await;
            self.tables(&bearer).create_profile(profile).await
        })
        .await
    }

    async fn list_favorites(&self, user_id: &UserId) -> Result<Vec<MeditationId>> {
        self.with_auto_refresh(move || async move {
            let bearer = self.bearer().await;
            self.tables(&bearer).list_favorites(user_id).await
        })
        .await
    }

    async fn insert_favorite(&self, user_id: &UserId, meditation_id: &MeditationId) -> Result<()> {
        self.with_auto_refresh(move || async move {
            let bearer = self.bearer().await;
            self.tables(&bearer).insert_favorite(user_id, meditation_id).await
        })
        .await
    }

    async fn delete_favorite(&self, user_id: &UserId, meditation_id: &MeditationId) -> Result<()> {
        self.with_auto_refresh(move || async move {
            let bearer = self.bearer().await;
            self.tables(&bearer).delete_favorite(user_id, meditation_id).await
        })
        .await
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        self.with_auto_refresh(move || async move {
            let bearer = self.bearer().await;
            self.tables(&bearer).list_categories().await
        })
        .await
    }

    async fn list_meditations(&self) -> Result<Vec<MeditationRow>> {
        self.with_auto_refresh(move || async move {
            let bearer = self.bearer().await;
            self.tables(&bearer).list_meditations().await
        })
        .await
    }
}
