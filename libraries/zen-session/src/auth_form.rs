//! View-model behind the sign-in screen.
//!
//! Holds the form fields and the message banner, validates input before any
//! network call, and turns backend failures into user-facing text.

use crate::deep_link::CallbackRoute;
use crate::error::SessionError;
use crate::manager::SessionManager;
use tracing::debug;
use zen_backend::BackendErrorKind;
use zen_core::validation::{is_valid_email, MIN_PASSWORD_LEN};

pub const MSG_FILL_ALL: &str = "Please fill in all fields";
pub const MSG_FILL_BOTH_PASSWORDS: &str = "Please fill in both password fields";
pub const MSG_ENTER_EMAIL: &str = "Please enter your email address";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MSG_SHORT_PASSWORD: &str = "Password must be at least 6 characters";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";

pub const MSG_SIGNED_IN: &str = "Successfully signed in!";
pub const MSG_SIGNED_UP: &str =
    "Account created successfully! Please check your email for a confirmation link before signing in.";
pub const MSG_RESET_SENT: &str =
    "Password reset email sent! Check your inbox and click the link to reset your password.";
pub const MSG_PASSWORD_UPDATED: &str =
    "Password updated successfully! You will now be signed in with your new password.";
pub const MSG_CONFIRMATION_SENT: &str =
    "Confirmation email sent! Please check your inbox and click the verification link.";
pub const MSG_ENTER_NEW_PASSWORD: &str = "Please enter your new password below.";
pub const MSG_EMAIL_CONFIRMED: &str = "Your email has been confirmed. Please sign in.";

pub const MSG_AUTH_FAILED: &str = "Authentication failed. Please try again.";
pub const MSG_EMAIL_NOT_CONFIRMED: &str = "Your email address has not been confirmed. Please check your inbox for a verification link and click it to activate your account.";
pub const MSG_INVALID_CREDENTIALS: &str =
    "Invalid email or password. Please check your credentials and try again.";
pub const MSG_ALREADY_REGISTERED: &str = "An account with this email already exists. Please sign in instead or use the \"Resend Confirmation\" option if you haven't confirmed your email yet.";
pub const MSG_SIGNUP_DISABLED: &str =
    "New account registration is currently disabled. Please contact support for assistance.";

/// Which form the screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
    ForgotPassword,
    SetNewPassword,
}

/// Sign-in screen state
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub name: String,
    pub new_password: String,
    pub confirm_new_password: String,

    /// Error banner
    pub error: Option<String>,
    /// Success banner
    pub success: Option<String>,
    /// Offer the "Resend Confirmation" action
    pub show_resend: bool,
    /// The host should leave the auth screen
    pub navigate_home: bool,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch forms, clearing banners
    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.reset_banners();
        self.show_resend = false;
    }

    fn reset_banners(&mut self) {
        self.error = None;
        self.success = None;
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Check the sign-in / sign-up fields.
    ///
    /// Returns the trimmed `(email, password, name)` or sets the error banner.
    pub fn validate_credentials(&mut self) -> Option<(String, String, String)> {
        let email = self.email.trim().to_string();
        let password = self.password.trim().to_string();
        let name = self.name.trim().to_string();
        let needs_name = self.mode == AuthMode::SignUp;

        if email.is_empty() || password.is_empty() || (needs_name && name.is_empty()) {
            self.fail(MSG_FILL_ALL);
            return None;
        }
        if !is_valid_email(&email) {
            self.fail(MSG_INVALID_EMAIL);
            return None;
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            self.fail(MSG_SHORT_PASSWORD);
            return None;
        }
        Some((email, password, name))
    }

    /// Check the email field alone (forgot password, resend confirmation)
    pub fn validate_email_only(&mut self) -> Option<String> {
        let email = self.email.trim().to_string();
        if email.is_empty() {
            self.fail(MSG_ENTER_EMAIL);
            return None;
        }
        if !is_valid_email(&email) {
            self.fail(MSG_INVALID_EMAIL);
            return None;
        }
        Some(email)
    }

    /// Check the new password pair
    pub fn validate_new_password(&mut self) -> Option<String> {
        let new_password = self.new_password.trim().to_string();
        let confirm = self.confirm_new_password.trim().to_string();

        if new_password.is_empty() || confirm.is_empty() {
            self.fail(MSG_FILL_BOTH_PASSWORDS);
            return None;
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            self.fail(MSG_SHORT_PASSWORD);
            return None;
        }
        if new_password != confirm {
            self.fail(MSG_PASSWORD_MISMATCH);
            return None;
        }
        Some(new_password)
    }

    /// Sign in or sign up depending on the mode
    pub async fn submit(&mut self, session: &SessionManager) {
        self.reset_banners();
        let Some((email, password, name)) = self.validate_credentials() else {
            return;
        };
        self.show_resend = false;

        if self.mode == AuthMode::SignUp {
            match session.sign_up(&email, &password, &name).await {
                Ok(_) => {
                    self.success = Some(MSG_SIGNED_UP.to_string());
                    self.mode = AuthMode::SignIn;
                    self.password.clear();
                    self.show_resend = true;
                }
                Err(e) => self.apply_error(&e),
            }
        } else {
            match session.sign_in(&email, &password).await {
                Ok(_) => {
                    self.success = Some(MSG_SIGNED_IN.to_string());
                    self.navigate_home = true;
                }
                Err(e) => self.apply_error(&e),
            }
        }
    }

    /// Send the password reset email
    pub async fn submit_forgot_password(&mut self, session: &SessionManager) {
        self.reset_banners();
        let Some(email) = self.validate_email_only() else {
            return;
        };

        match session.reset_password(&email).await {
            Ok(()) => {
                self.success = Some(MSG_RESET_SENT.to_string());
                self.mode = AuthMode::SignIn;
            }
            Err(e) => self.fail(message_or(&e, "Failed to send reset email")),
        }
    }

    /// Store the new password after a recovery link
    pub async fn submit_new_password(&mut self, session: &SessionManager) {
        self.reset_banners();
        let Some(password) = self.validate_new_password() else {
            return;
        };

        match session.update_user_password(&password).await {
            Ok(_) => {
                self.success = Some(MSG_PASSWORD_UPDATED.to_string());
                self.mode = AuthMode::SignIn;
                self.new_password.clear();
                self.confirm_new_password.clear();
                self.password.clear();
                self.navigate_home = true;
            }
            Err(e) => self.fail(message_or(&e, "Failed to update password")),
        }
    }

    /// Resend the sign-up confirmation email
    pub async fn resend_confirmation(&mut self, session: &SessionManager) {
        self.reset_banners();
        let Some(email) = self.validate_email_only() else {
            return;
        };

        match session.resend_confirmation_email(&email).await {
            Ok(()) => {
                self.success = Some(MSG_CONFIRMATION_SENT.to_string());
                self.show_resend = false;
            }
            Err(e) => self.fail(message_or(&e, "Failed to send confirmation email")),
        }
    }

    /// Turn a sign-in or sign-up failure into the banner text
    pub fn apply_error(&mut self, error: &SessionError) {
        debug!(kind = ?error.kind(), error = %error, "Auth request failed");

        let (message, offer_resend) = match error.kind() {
            Some(BackendErrorKind::EmailNotConfirmed) => (MSG_EMAIL_NOT_CONFIRMED.to_string(), true),
            Some(BackendErrorKind::InvalidCredentials) => (MSG_INVALID_CREDENTIALS.to_string(), false),
            Some(BackendErrorKind::UserAlreadyRegistered) => {
                self.mode = AuthMode::SignIn;
                self.password.clear();
                (MSG_ALREADY_REGISTERED.to_string(), true)
            }
            Some(BackendErrorKind::SignupDisabled) => (MSG_SIGNUP_DISABLED.to_string(), false),
            _ => (message_or(error, MSG_AUTH_FAILED), false),
        };

        self.error = Some(message);
        self.show_resend = offer_resend;
    }

    /// Reflect a handled auth callback
    pub fn apply_route(&mut self, route: &CallbackRoute) {
        self.reset_banners();
        self.show_resend = false;

        match route {
            CallbackRoute::Error(message) => {
                self.mode = AuthMode::SignIn;
                self.fail(message.clone());
            }
            CallbackRoute::SetNewPassword => {
                self.mode = AuthMode::SetNewPassword;
                self.success = Some(MSG_ENTER_NEW_PASSWORD.to_string());
            }
            CallbackRoute::SignupConfirmed => {
                self.mode = AuthMode::SignIn;
                self.success = Some(MSG_EMAIL_CONFIRMED.to_string());
            }
            CallbackRoute::Home => self.navigate_home = true,
            CallbackRoute::Auth => {}
        }
    }
}

fn message_or(error: &SessionError, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
