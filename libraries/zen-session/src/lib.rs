//! Desert Zen - Session
//!
//! Who is signed in, and what the app knows about them.
//!
//! This crate provides:
//! - A session state machine fed by backend auth notifications, processed
//!   one event at a time by a single worker task
//! - Profile reconciliation: look up the profile of a signed-in user and
//!   create it once if it is missing
//! - The favorites set of the signed-in user
//! - Auth callback (deep link) parsing and routing
//! - The sign-in screen view-model
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zen_backend::{BackendClient, BackendConfig};
//! use zen_session::{SessionConfig, SessionManager};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(BackendClient::new(BackendConfig::new(
//!     "https://abc.supabase.co",
//!     "anon-key",
//! ))?);
//! let session = SessionManager::start(client.clone(), client, SessionConfig::default()).await;
//!
//! let snapshot = session.sign_in("ana@example.com", "secret1").await?;
//! if let Some(user) = snapshot.user() {
//!     println!("Welcome back, {}", user.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth_form;
pub mod deep_link;
mod error;
mod favorites;
mod manager;
mod profile;
mod state;

pub use auth_form::{AuthForm, AuthMode};
pub use deep_link::{
    parse_auth_callback, resolve_callback, AuthCallback, CallbackKind, CallbackRoute,
};
pub use error::{Result, SessionError};
pub use favorites::{FavoriteOutcome, FavoritesSet};
pub use manager::{SessionConfig, SessionManager};
pub use profile::{fallback_name, ProfileReconciler, FALLBACK_NAME};
pub use state::{SessionEvent, SessionSnapshot, SessionState};
