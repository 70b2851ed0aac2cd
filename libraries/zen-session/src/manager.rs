//! Session manager: the auth capability surface plus the worker that keeps
//! the session snapshot in sync with the backend.
//!
//! Every input (backend auth notifications and explicit requests) funnels
//! into one worker task, so events are applied strictly one at a time and a
//! profile lookup never interleaves with another.

use crate::deep_link::{parse_auth_callback, resolve_callback, CallbackKind, CallbackRoute};
use crate::error::{Result, SessionError};
use crate::favorites::FavoritesSet;
use crate::profile::ProfileReconciler;
use crate::state::{SessionEvent, SessionSnapshot, SessionState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use zen_backend::{
    AuthBackend, AuthChange, AuthChangeEvent, AuthUser, DataBackend, RetryPolicy, Session,
    UserMetadata,
};
use zen_core::validation::{validate_email, validate_password};

/// Session manager configuration
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Where confirmation and recovery emails link back to
    pub redirect_url: Option<String>,

    /// Retry policy for profile lookups
    pub retry: RetryPolicy,
}

enum Command {
    Event(SessionEvent),
    Flush(oneshot::Sender<SessionSnapshot>),
    ClearRecovery,
}

/// Owns the session worker and exposes the auth operations.
///
/// Dropping the manager stops the worker.
pub struct SessionManager {
    auth: Arc<dyn AuthBackend>,
    data: Arc<dyn DataBackend>,
    config: SessionConfig,
    favorites: FavoritesSet,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SessionSnapshot>,
}

impl SessionManager {
    /// Spawn the worker, which restores the persisted session before it
    /// applies any other event.
    pub async fn start(
        auth: Arc<dyn AuthBackend>,
        data: Arc<dyn DataBackend>,
        config: SessionConfig,
    ) -> Self {
        let favorites = FavoritesSet::new(data.clone());
        let (state_tx, state_rx) = watch::channel(SessionSnapshot::default());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        // Subscribe before reading the stored session so no change is missed
        let changes = auth.subscribe();
        let restored = auth.current_session().await;

        let worker = Reconciler {
            auth: auth.clone(),
            profiles: ProfileReconciler::new(data.clone(), config.retry),
            favorites: favorites.clone(),
            state: state_tx,
        };
        tokio::spawn(worker.run(restored, changes, commands_rx));

        Self {
            auth,
            data,
            config,
            favorites,
            commands: commands_tx,
            state: state_rx,
        }
    }

    /// Watch the session snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.clone()
    }

    /// Latest published snapshot (may lag queued events; see [`Self::settled`])
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Favorites of the signed-in user
    pub fn favorites(&self) -> &FavoritesSet {
        &self.favorites
    }

    /// Enqueue an event for the worker. Backend notifications already
    /// broadcast are applied first.
    pub fn dispatch(&self, event: SessionEvent) -> Result<()> {
        self.commands
            .send(Command::Event(event))
            .map_err(|_| SessionError::WorkerStopped)
    }

    /// Wait until every event queued so far has been applied
    pub async fn settled(&self) -> Result<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Flush(tx))
            .map_err(|_| SessionError::WorkerStopped)?;
        rx.await.map_err(|_| SessionError::WorkerStopped)
    }

    // =========================================================================
    // Auth operations
    // =========================================================================

    /// Sign in with email and password; returns once the profile is resolved.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionSnapshot> {
        let email = email.trim();
        validate_email(email)?;

        self.auth.sign_in(email, password).await?;
        info!("Signed in");
        self.settled().await
    }

    /// Register a new account.
    ///
    /// The backend may hide that an address is taken by returning neither a
    /// user nor a session; the profile table is consulted in that case.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SessionSnapshot> {
        let email = email.trim();
        validate_email(email)?;
        validate_password(password)?;

        let metadata = UserMetadata::with_name(name.trim());
        let outcome = self
            .auth
            .sign_up(email, password, &metadata, self.redirect())
            .await?;

        if outcome.user.is_none() && outcome.session.is_none() {
            match self.data.find_profile_by_email(email).await {
                Ok(Some(_)) => return Err(SessionError::AlreadyRegistered),
                Ok(None) => {}
                Err(e) => debug!(error = %e, "Existing-profile check failed"),
            }
        }

        info!(confirmed = outcome.session.is_some(), "Signed up");
        self.settled().await
    }

    /// Sign out. Local state is cleared even when revocation fails.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.auth.sign_out().await;
        if let Err(e) = &result {
            warn!(error = %e, "Sign-out revocation failed");
        }
        self.settled().await?;
        result.map_err(SessionError::from)
    }

    /// Email a password reset link
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        let email = email.trim();
        validate_email(email)?;
        self.auth.reset_password(email, self.redirect()).await?;
        Ok(())
    }

    /// Set a new password for the signed-in (or recovering) user
    pub async fn update_user_password(&self, password: &str) -> Result<AuthUser> {
        validate_password(password)?;
        let user = self.auth.update_password(password).await?;
        self.commands
            .send(Command::ClearRecovery)
            .map_err(|_| SessionError::WorkerStopped)?;
        self.settled().await?;
        Ok(user)
    }

    /// Resend the sign-up confirmation email
    pub async fn resend_confirmation_email(&self, email: &str) -> Result<()> {
        let email = email.trim();
        validate_email(email)?;
        self.auth.resend_confirmation(email, self.redirect()).await?;
        Ok(())
    }

    /// Continue without an account
    pub async fn continue_as_guest(&self) -> Result<SessionSnapshot> {
        self.dispatch(SessionEvent::GuestRequested)?;
        self.settled().await
    }

    /// Exchange a deep-link token pair for a session
    pub async fn exchange_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
        kind: Option<CallbackKind>,
    ) -> Result<Session> {
        let session = self.auth.set_session(access_token, refresh_token).await?;
        if kind == Some(CallbackKind::Recovery) {
            self.dispatch(SessionEvent::PasswordRecoveryRequested(session.clone()))?;
        }
        self.settled().await?;
        Ok(session)
    }

    /// Parse and act on an auth callback URL
    pub async fn handle_callback(&self, url: &str) -> Result<CallbackRoute> {
        let callback = parse_auth_callback(url)?;
        let kind = callback.kind;
        let route = resolve_callback(&callback, |access, refresh| async move {
            self.exchange_tokens(&access, &refresh, kind).await
        })
        .await;
        debug!(route = ?route, "Auth callback handled");
        Ok(route)
    }

    fn redirect(&self) -> Option<&str> {
        self.config.redirect_url.as_deref()
    }
}

// =============================================================================
// Worker
// =============================================================================

struct Reconciler {
    auth: Arc<dyn AuthBackend>,
    profiles: ProfileReconciler,
    favorites: FavoritesSet,
    state: watch::Sender<SessionSnapshot>,
}

impl Reconciler {
    async fn run(
        mut self,
        restored: Option<Session>,
        mut changes: broadcast::Receiver<AuthChange>,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) {
        // The stored session was read after subscribing, so it precedes every
        // change still buffered in `changes`
        self.handle(SessionEvent::SessionRestored(restored)).await;

        let mut changes_open = true;

        loop {
            tokio::select! {
                // Backend notifications first: a flush must observe every
                // change that was broadcast before it was requested
                biased;

                change = changes.recv(), if changes_open => match change {
                    Ok(change) => {
                        if let Some(event) = translate(change) {
                            self.handle(event).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Auth notifications lagged, resyncing");
                        let session = self.auth.current_session().await;
                        self.handle(SessionEvent::SessionRestored(session)).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Auth notifications closed");
                        changes_open = false;
                    }
                },

                command = commands.recv() => match command {
                    Some(Command::Event(event)) => self.handle(event).await,
                    Some(Command::Flush(reply)) => {
                        let _ = reply.send(self.state.borrow().clone());
                    }
                    Some(Command::ClearRecovery) => {
                        self.state.send_modify(|s| s.recovery_pending = false);
                    }
                    None => break,
                },
            }
        }

        debug!("Session worker stopped");
    }

    async fn handle(&mut self, event: SessionEvent) {
        debug!(event = event.label(), state = self.current().state.label(), "Session event");

        match event {
            SessionEvent::SessionRestored(Some(session)) | SessionEvent::SignedIn(session) => {
                self.resolve(session).await;
            }
            SessionEvent::SessionRestored(None) | SessionEvent::SignedOut => {
                self.favorites.clear().await;
                self.publish(SessionSnapshot {
                    state: SessionState::Unauthenticated,
                    session: None,
                    recovery_pending: false,
                });
            }
            SessionEvent::GuestRequested => {
                self.favorites.clear().await;
                self.publish(SessionSnapshot {
                    state: SessionState::Guest,
                    session: None,
                    recovery_pending: false,
                });
            }
            SessionEvent::TokenRefreshed(session) => {
                if self.is_resolved_for(&session) {
                    self.state.send_modify(|s| s.session = Some(session));
                } else {
                    self.resolve(session).await;
                }
            }
            SessionEvent::PasswordRecoveryRequested(session) => {
                if self.is_resolved_for(&session) {
                    self.state.send_modify(|s| {
                        s.session = Some(session);
                        s.recovery_pending = true;
                    });
                } else {
                    self.resolve(session).await;
                    self.state.send_modify(|s| s.recovery_pending = true);
                }
            }
        }
    }

    /// Load (or create) the profile of the session's user
    async fn resolve(&mut self, session: Session) {
        let previous = self.current();
        let same_user = previous
            .session
            .as_ref()
            .is_some_and(|s| s.user.id == session.user.id);
        let user_id = session.user.id.clone();

        if self.favorites.owner().await.as_ref() != Some(&user_id) {
            self.favorites.clear().await;
        }

        self.publish(SessionSnapshot {
            state: SessionState::Loading,
            session: Some(session.clone()),
            recovery_pending: same_user && previous.recovery_pending,
        });

        match self.profiles.resolve(&session.user).await {
            Ok(user) => {
                if let Err(e) = self.favorites.load(&user.id).await {
                    debug!(user_id = %user.id, error = %e, "Continuing without favorites");
                }
                info!(user_id = %user.id, "Session authenticated");
                self.state.send_modify(|s| s.state = SessionState::Authenticated(user));
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Profile resolution failed");
                self.state.send_modify(|s| {
                    s.state = SessionState::Stalled {
                        user_id,
                        reason: e.to_string(),
                    }
                });
            }
        }
    }

    fn is_resolved_for(&self, session: &Session) -> bool {
        self.state
            .borrow()
            .user()
            .is_some_and(|user| user.id == session.user.id)
    }

    fn current(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        debug!(state = snapshot.state.label(), "Session state published");
        self.state.send_replace(snapshot);
    }
}

/// Map a backend auth notification onto a state machine event
fn translate(change: AuthChange) -> Option<SessionEvent> {
    match (change.event, change.session) {
        (AuthChangeEvent::SignedOut, _) => Some(SessionEvent::SignedOut),
        (AuthChangeEvent::SignedIn, Some(session)) => Some(SessionEvent::SignedIn(session)),
        (AuthChangeEvent::TokenRefreshed | AuthChangeEvent::UserUpdated, Some(session)) => {
            Some(SessionEvent::TokenRefreshed(session))
        }
        (AuthChangeEvent::PasswordRecovery, Some(session)) => {
            Some(SessionEvent::PasswordRecoveryRequested(session))
        }
        (event, None) => {
            debug!(event = ?event, "Ignoring auth change without a session");
            None
        }
    }
}
