//! Profile resolution for a signed-in auth user.
//!
//! The profile row is looked up by the auth user's id. A missing row is
//! created exactly once from sign-up metadata, falling back to the email
//! local part.

use std::sync::Arc;
use tracing::{debug, info, warn};
use zen_backend::{AuthUser, BackendError, DataBackend, NewProfile, ProfileRow, RetryPolicy};
use zen_core::validation::email_local_part;
use zen_core::User;

/// Name used when neither metadata nor email provide one
pub const FALLBACK_NAME: &str = "User";

/// Resolves (and provisions) the application profile of an auth user.
pub struct ProfileReconciler {
    data: Arc<dyn DataBackend>,
    retry: RetryPolicy,
}

impl ProfileReconciler {
    pub fn new(data: Arc<dyn DataBackend>, retry: RetryPolicy) -> Self {
        Self { data, retry }
    }

    /// Fetch the profile, creating it if the backend reports it missing.
    ///
    /// Lookups are retried on transient failures; creation is attempted once.
    pub async fn resolve(&self, auth_user: &AuthUser) -> Result<User, BackendError> {
        let data = &self.data;
        let user_id = &auth_user.id;

        let lookup = self
            .retry
            .run("fetch_profile", move || async move { data.fetch_profile(user_id).await })
            .await;

        let row = match lookup {
            Ok(row) => {
                debug!(user_id = %row.id, "Profile loaded");
                row
            }
            Err(e) if e.is_not_found() => {
                info!(user_id = %auth_user.id, "Profile not found, creating");
                let profile = new_profile(auth_user);
                self.data.create_profile(&profile).await.map_err(|e| {
                    warn!(user_id = %auth_user.id, error = %e, "Profile creation failed");
                    e
                })?
            }
            Err(e) => {
                warn!(user_id = %auth_user.id, error = %e, "Profile lookup failed");
                return Err(e);
            }
        };

        Ok(into_user(row))
    }
}

/// Display name for a new profile: metadata `name`, then `full_name`,
/// then the email local part, then [`FALLBACK_NAME`].
pub fn fallback_name(auth_user: &AuthUser) -> String {
    let meta = &auth_user.user_metadata;
    [meta.name.as_deref(), meta.full_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .or_else(|| auth_user.email.as_deref().and_then(email_local_part))
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}

fn new_profile(auth_user: &AuthUser) -> NewProfile {
    NewProfile {
        id: auth_user.id.clone(),
        email: auth_user.email.clone().unwrap_or_default(),
        name: fallback_name(auth_user),
    }
}

fn into_user(row: ProfileRow) -> User {
    User {
        id: row.id,
        email: row.email,
        name: row.name,
    }
}
