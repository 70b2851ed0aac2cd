//! Client-side cache of the signed-in user's favorite meditations.
//!
//! Mutations are confirmed remotely before the local set changes, so a
//! failed call leaves the set as it was. Without a signed-in owner every
//! mutation answers [`FavoriteOutcome::RedirectToAuth`] and the backend is
//! never called.

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use zen_backend::{BackendError, DataBackend};
use zen_core::{MeditationId, UserId};

/// Result of a favorites mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    /// The meditation is now a favorite
    Added,
    /// The meditation is no longer a favorite
    Removed,
    /// No signed-in user; the caller should show the sign-in screen
    RedirectToAuth,
}

#[derive(Debug, Default)]
struct Inner {
    owner: Option<UserId>,
    ids: BTreeSet<MeditationId>,
}

/// Favorites of the current user. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct FavoritesSet {
    data: Arc<dyn DataBackend>,
    inner: Arc<RwLock<Inner>>,
}

impl FavoritesSet {
    pub fn new(data: Arc<dyn DataBackend>) -> Self {
        Self {
            data,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Whether `id` is a favorite of the current user
    pub async fn is_favorite(&self, id: &MeditationId) -> bool {
        self.inner.read().await.ids.contains(id)
    }

    /// Favorite ids in stable order
    pub async fn ids(&self) -> Vec<MeditationId> {
        self.inner.read().await.ids.iter().cloned().collect()
    }

    /// User the set belongs to
    pub async fn owner(&self) -> Option<UserId> {
        self.inner.read().await.owner.clone()
    }

    /// Add a favorite. Already-favorite ids are not sent again.
    pub async fn add(&self, id: &MeditationId) -> Result<FavoriteOutcome, BackendError> {
        let owner = {
            let inner = self.inner.read().await;
            match &inner.owner {
                None => return Ok(FavoriteOutcome::RedirectToAuth),
                Some(_) if inner.ids.contains(id) => return Ok(FavoriteOutcome::Added),
                Some(owner) => owner.clone(),
            }
        };

        self.data.insert_favorite(&owner, id).await?;

        let mut inner = self.inner.write().await;
        if inner.owner.as_ref() == Some(&owner) {
            inner.ids.insert(id.clone());
        }
        debug!(user_id = %owner, meditation_id = %id, "Favorite added");
        Ok(FavoriteOutcome::Added)
    }

    /// Remove a favorite
    pub async fn remove(&self, id: &MeditationId) -> Result<FavoriteOutcome, BackendError> {
        let Some(owner) = self.owner().await else {
            return Ok(FavoriteOutcome::RedirectToAuth);
        };

        self.data.delete_favorite(&owner, id).await?;

        let mut inner = self.inner.write().await;
        if inner.owner.as_ref() == Some(&owner) {
            inner.ids.remove(id);
        }
        debug!(user_id = %owner, meditation_id = %id, "Favorite removed");
        Ok(FavoriteOutcome::Removed)
    }

    /// Add if absent, remove if present
    pub async fn toggle(&self, id: &MeditationId) -> Result<FavoriteOutcome, BackendError> {
        if self.is_favorite(id).await {
            self.remove(id).await
        } else {
            self.add(id).await
        }
    }

    /// Replace the set with `user_id`'s favorites.
    ///
    /// On failure the set is left empty but owned by `user_id`, so new
    /// favorites can still be added.
    pub async fn load(&self, user_id: &UserId) -> Result<(), BackendError> {
        {
            let mut inner = self.inner.write().await;
            inner.owner = Some(user_id.clone());
            inner.ids.clear();
        }

        let ids = match self.data.list_favorites(user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to load favorites");
                return Err(e);
            }
        };

        let mut inner = self.inner.write().await;
        if inner.owner.as_ref() == Some(user_id) {
            inner.ids = ids.into_iter().collect();
            info!(user_id = %user_id, count = inner.ids.len(), "Favorites loaded");
        }
        Ok(())
    }

    /// Forget the owner and every id
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.owner = None;
        inner.ids.clear();
    }
}
