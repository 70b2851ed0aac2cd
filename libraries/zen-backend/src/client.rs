//! Main hosted backend client.

use crate::auth::AuthClient;
use crate::error::{BackendError, BackendErrorKind, Result};
use crate::tables::TablesClient;
use crate::types::{AuthChange, AuthChangeEvent, AuthUser, BackendConfig, Session, SignUpOutcome, UserMetadata};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

/// Capacity of the auth change broadcast channel.
const AUTH_EVENT_CAPACITY: usize = 32;

/// Main client for the hosted backend.
///
/// Holds the current session, attaches tokens to table requests, refreshes
/// the session once when a request comes back unauthorized, and broadcasts
/// every session change to subscribers.
///
/// # Example
///
/// ```ignore
/// use zen_backend::{BackendClient, BackendConfig};
///
/// let client = BackendClient::new(BackendConfig::new("https://abc.supabase.co", "anon-key"))?;
/// let mut changes = client.subscribe();
///
/// client.sign_in("ana@example.com", "secret1").await?;
/// let change = changes.recv().await?;
/// println!("{:?}", change.event);
/// ```
pub struct BackendClient {
    http: Client,
    url: String,
    anon_key: String,
    session: Arc<RwLock<Option<Session>>>,
    events: broadcast::Sender<AuthChange>,
}

impl BackendClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BackendConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(BackendError::InvalidConfig("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(BackendError::InvalidConfig(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url)
            .map_err(|e| BackendError::InvalidConfig(format!("Invalid URL '{}': {}", url, e)))?;

        if config.anon_key.trim().is_empty() {
            return Err(BackendError::InvalidConfig("anon key cannot be empty".into()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("DesertZen/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Request)?;

        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);

        Ok(Self {
            http,
            url,
            anon_key: config.anon_key,
            session: Arc::new(RwLock::new(config.session)),
            events,
        })
    }

    /// Get the normalized project URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Subscribe to auth state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }

    /// Current session, if signed in.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Check if the client holds a session.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(&self.http, &self.url, &self.anon_key)
    }

    async fn store(&self, event: AuthChangeEvent, session: Option<Session>) {
        *self.session.write().await = session.clone();
        debug!(event = ?event, "Auth state changed");
        // No subscribers is fine
        let _ = self.events.send(AuthChange { event, session });
    }

    async fn access_token(&self) -> Result<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or(BackendError::AuthRequired)
    }

    /// Sign in with email and password. On success the session is stored.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.auth().sign_in(email, password).await?;
        self.store(AuthChangeEvent::SignedIn, Some(session.clone())).await;
        Ok(session)
    }

    /// Register a new account.
    ///
    /// When the project auto-confirms emails a session is returned and stored.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome> {
        let outcome = self.auth().sign_up(email, password, metadata, redirect_to).await?;
        if let Some(session) = &outcome.session {
            self.store(AuthChangeEvent::SignedIn, Some(session.clone())).await;
        }
        Ok(outcome)
    }

    /// Sign out. The local session is cleared even if revocation fails.
    pub async fn sign_out(&self) -> Result<()> {
        let token = self.session.read().await.as_ref().map(|s| s.access_token.clone());

        let result = match token {
            Some(token) => match self.auth().sign_out(&token).await {
                // An already-invalid token is as good as revoked
                Err(e) if e.kind() == BackendErrorKind::Unauthorized => Ok(()),
                other => other,
            },
            None => Ok(()),
        };

        self.store(AuthChangeEvent::SignedOut, None).await;
        info!("Signed out");
        result
    }

    /// Send a password reset email.
    pub async fn reset_password(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        self.auth().reset_password(email, redirect_to).await
    }

    /// Resend the sign-up confirmation email.
    pub async fn resend_confirmation(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        self.auth().resend_confirmation(email, redirect_to).await
    }

    /// Update the signed-in user's password.
    pub async fn update_password(&self, password: &str) -> Result<AuthUser> {
        let token = self.access_token().await?;
        let user = self.auth().update_password(&token, password).await?;

        let updated = self.session.read().await.clone().map(|mut s| {
            s.user = user.clone();
            s
        });
        self.store(AuthChangeEvent::UserUpdated, updated).await;
        Ok(user)
    }

    /// Establish a session from a token pair (deep-link callback).
    ///
    /// The access token is checked first; if the backend rejects it the
    /// refresh token is exchanged for a fresh pair.
    pub async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session> {
        let session = match self.auth().get_user(access_token).await {
            Ok(user) => Session {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
                expires_in: None,
                token_type: "bearer".to_string(),
                user,
            },
            Err(e) if e.kind() == BackendErrorKind::Unauthorized => {
                debug!("Access token rejected, exchanging refresh token");
                self.auth().refresh(refresh_token).await?
            }
            Err(e) => return Err(e),
        };

        self.store(AuthChangeEvent::SignedIn, Some(session.clone())).await;
        Ok(session)
    }

    /// Refresh the stored session using its refresh token.
    pub async fn refresh_session(&self) -> Result<Session> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or(BackendError::AuthRequired)?;

        let session = self.auth().refresh(&refresh_token).await?;
        self.store(AuthChangeEvent::TokenRefreshed, Some(session.clone())).await;
        Ok(session)
    }

    /// Bearer for table requests: the user's access token, else the anon key.
    pub(crate) async fn bearer(&self) -> String {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    pub(crate) fn tables<'a>(&'a self, bearer: &'a str) -> TablesClient<'a> {
        TablesClient::new(&self.http, &self.url, &self.anon_key, bearer)
    }

    /// Execute an operation with automatic session refresh on 401.
    ///
    /// If the operation fails as unauthorized while a session is held,
    /// attempts to refresh the session and retry once.
    pub async fn with_auto_refresh<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match operation().await {
            Err(e) if e.kind() == BackendErrorKind::Unauthorized && self.is_authenticated().await => {
                warn!("Access token expired, attempting refresh");
                self.refresh_session().await?;
                operation().await
            }
            other => other,
        }
    }
}
