//! Authentication endpoints of the hosted backend.

use crate::error::{BackendError, Result};
use crate::response::{ensure_success, json};
use crate::types::{
    AuthUser, EmailRequest, PasswordGrant, PasswordUpdate, RefreshGrant, ResendRequest, Session,
    SignUpOutcome, SignUpRequest, UserMetadata,
};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};

/// Authentication client for the hosted backend.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    anon_key: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, anon_key: &'a str) -> Self {
        Self {
            http,
            base_url,
            anon_key,
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", self.anon_key)
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        debug!(email = %email, "Attempting password sign-in");

        let response = self
            .post("token")
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password })
            .send()
            .await
            .map_err(BackendError::from_send)?;

        let session: Session = json(response, "sign-in response").await?;
        info!(user_id = %session.user.id, "Sign in successful");
        Ok(session)
    }

    /// Register a new account. The confirmation email links to `redirect_to`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome> {
        debug!(email = %email, redirect = ?redirect_to, "Attempting sign-up");

        let mut request = self.post("signup");
        if let Some(redirect) = redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }

        let response = request
            .json(&SignUpRequest {
                email,
                password,
                data: metadata,
            })
            .send()
            .await
            .map_err(BackendError::from_send)?;

        let body: serde_json::Value = json(response, "sign-up response").await?;
        let outcome = parse_sign_up(body)?;

        info!(
            user_id = ?outcome.user.as_ref().map(|u| u.id.to_string()),
            has_session = outcome.session.is_some(),
            "Sign up accepted"
        );
        Ok(outcome)
    }

    /// Revoke the session behind `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .post("logout")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(BackendError::from_send)?;

        ensure_success(response).await?;
        Ok(())
    }

    /// Send a password reset email.
    pub async fn reset_password(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        let mut request = self.post("recover");
        if let Some(redirect) = redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }

        let response = request
            .json(&EmailRequest { email })
            .send()
            .await
            .map_err(BackendError::from_send)?;

        ensure_success(response).await?;
        info!(email = %email, "Password reset email sent");
        Ok(())
    }

    /// Resend the sign-up confirmation email.
    pub async fn resend_confirmation(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        let mut request = self.post("resend");
        if let Some(redirect) = redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }

        let response = request
            .json(&ResendRequest {
                kind: "signup",
                email,
            })
            .send()
            .await
            .map_err(BackendError::from_send)?;

        ensure_success(response).await?;
        info!(email = %email, "Confirmation email resent");
        Ok(())
    }

    /// Change the password of the user owning `access_token`.
    pub async fn update_password(&self, access_token: &str, password: &str) -> Result<AuthUser> {
        let response = self
            .http
            .put(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", self.anon_key)
            .bearer_auth(access_token)
            .json(&PasswordUpdate { password })
            .send()
            .await
            .map_err(BackendError::from_send)?;

        let user: AuthUser = json(response, "user").await?;
        info!(user_id = %user.id, "Password updated");
        Ok(user)
    }

    /// Fetch the auth user behind an access token.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(BackendError::from_send)?;

        json(response, "user").await
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        debug!("Refreshing session");

        let response = self
            .post("token")
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshGrant { refresh_token })
            .send()
            .await
            .map_err(BackendError::from_send)?;

        json(response, "refresh response").await
    }
}

fn parse_sign_up(body: serde_json::Value) -> Result<SignUpOutcome> {
    if body.get("access_token").is_some() {
        let session: Session = serde_json::from_value(body)
            .map_err(|e| BackendError::ParseError(format!("Failed to parse session: {}", e)))?;
        return Ok(SignUpOutcome {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }

    let has_id = body
        .get("id")
        .and_then(|id| id.as_str())
        .is_some_and(|id| !id.is_empty());

    if has_id {
        let user: AuthUser = serde_json::from_value(body)
            .map_err(|e| BackendError::ParseError(format!("Failed to parse user: {}", e)))?;
        return Ok(SignUpOutcome {
            user: Some(user),
            session: None,
        });
    }

    Ok(SignUpOutcome::default())
}
