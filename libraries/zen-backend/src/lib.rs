//! Desert Zen Backend Client
//!
//! Typed HTTP client for the hosted backend-as-a-service the app runs on:
//! an auth service and a REST layer over the relational store (with
//! row-level security enforced server-side).
//!
//! # Features
//!
//! - **Authentication**: password sign-in, sign-up with email confirmation,
//!   password reset, token-pair exchange for deep links, session refresh
//! - **Tables**: profiles, favorites, categories, meditations
//! - **Errors**: provider failures classified into [`BackendErrorKind`]
//! - **Retry**: bounded backoff for transient failures via [`RetryPolicy`]
//!
//! # Example
//!
//! ```ignore
//! use zen_backend::{BackendClient, BackendConfig, DataBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BackendClient::new(BackendConfig::new("https://abc.supabase.co", "anon-key"))?;
//!
//!     client.sign_in("ana@example.com", "secret1").await?;
//!     let meditations = client.list_meditations().await?;
//!     println!("Found {} meditations", meditations.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod backend;
mod client;
mod error;
mod response;
mod retry;
mod tables;
mod types;

// Re-export main types
pub use backend::{AuthBackend, DataBackend};
pub use client::BackendClient;
pub use error::{BackendError, BackendErrorKind, Result};
pub use retry::RetryPolicy;
pub use types::{
    AuthChange, AuthChangeEvent, AuthUser, BackendConfig, CategoryRow, EmbeddedCategory,
    MeditationRow, NewProfile, ProfileRow, Session, SignUpOutcome, UserMetadata,
};

// Re-export sub-clients for direct use if needed
pub use auth::AuthClient;
pub use tables::TablesClient;
