//! Relational store operations (profiles, favorites, catalog).

use crate::error::{BackendError, Result};
use crate::response::{ensure_success, json};
use crate::types::{CategoryRow, FavoriteRow, MeditationRow, NewFavorite, NewProfile, ProfileRow};
use reqwest::{Client, RequestBuilder};
use tracing::debug;
use zen_core::{MeditationId, UserId};

/// Media type asking the REST layer for exactly one object.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Table client for the hosted relational store.
///
/// Requests are authorized with the user's access token when signed in,
/// otherwise with the anon key; row-level security decides visibility.
pub struct TablesClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    anon_key: &'a str,
    bearer: &'a str,
}

impl<'a> TablesClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, anon_key: &'a str, bearer: &'a str) -> Self {
        Self {
            http,
            base_url,
            anon_key,
            bearer,
        }
    }

    fn table(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", self.anon_key)
            .bearer_auth(self.bearer)
    }

    /// Get the profile row for a user. Missing rows yield a `NotFound` error.
    pub async fn fetch_profile(&self, user_id: &UserId) -> Result<ProfileRow> {
        debug!(user_id = %user_id, "Fetching profile");

        let response = self
            .table(reqwest::Method::GET, "profiles")
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", user_id))])
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await
            .map_err(BackendError::from_send)?;

        json(response, "profile").await
    }

    /// Look up a profile by email.
    pub async fn find_profile_by_email(&self, email: &str) -> Result<Option<ProfileRow>> {
        let response = self
            .table(reqwest::Method::GET, "profiles")
            .query(&[
                ("select", "*".to_string()),
                ("email", format!("eq.{}", email)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(BackendError::from_send)?;

        let rows: Vec<ProfileRow> = json(response, "profiles").await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a profile row and return it as stored.
    pub async fn create_profile(&self, profile: &NewProfile) -> Result<ProfileRow> {
        debug!(user_id = %profile.id, "Creating profile");

        let response = self
            .table(reqwest::Method::POST, "profiles")
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(profile)
            .send()
            .await
            .map_err(BackendError::from_send)?;

        json(response, "created profile").await
    }

    /// Meditation ids favorited by a user.
    pub async fn list_favorites(&self, user_id: &UserId) -> Result<Vec<MeditationId>> {
        let response = self
            .table(reqwest::Method::GET, "favorites")
            .query(&[
                ("select", "meditation_id".to_string()),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .send()
            .await
            .map_err(BackendError::from_send)?;

        let rows: Vec<FavoriteRow> = json(response, "favorites").await?;
        debug!(user_id = %user_id, count = rows.len(), "Fetched favorites");
        Ok(rows.into_iter().map(|row| row.meditation_id).collect())
    }

    /// Insert a favorite edge.
    pub async fn insert_favorite(&self, user_id: &UserId, meditation_id: &MeditationId) -> Result<()> {
        let response = self
            .table(reqwest::Method::POST, "favorites")
            .header("Prefer", "return=minimal")
            .json(&NewFavorite {
                user_id,
                meditation_id,
            })
            .send()
            .await
            .map_err(BackendError::from_send)?;

        ensure_success(response).await?;
        Ok(())
    }

    /// Delete a favorite edge. Deleting a missing edge succeeds.
    pub async fn delete_favorite(&self, user_id: &UserId, meditation_id: &MeditationId) -> Result<()> {
        let response = self
            .table(reqwest::Method::DELETE, "favorites")
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("meditation_id", format!("eq.{}", meditation_id)),
            ])
            .send()
            .await
            .map_err(BackendError::from_send)?;

        ensure_success(response).await?;
        Ok(())
    }

    /// All categories, ordered by name.
    pub async fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        let response = self
            .table(reqwest::Method::GET, "categories")
            .query(&[("select", "*"), ("order", "name.asc")])
            .send()
            .await
            .map_err(BackendError::from_send)?;

        json(response, "categories").await
    }

    /// All meditations with their category embedded, newest first.
    pub async fn list_meditations(&self) -> Result<Vec<MeditationRow>> {
        let response = self
            .table(reqwest::Method::GET, "meditations")
            .query(&[
                ("select", "*,categories!inner(id,name)"),
                ("order", "created_at.desc"),
            ])
            .send()
            .await
            .map_err(BackendError::from_send)?;

        let rows: Vec<MeditationRow> = json(response, "meditations").await?;
        debug!(count = rows.len(), "Fetched meditations");
        Ok(rows)
    }
}
