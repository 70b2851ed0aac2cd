//! Input rules shared by the auth flows
//!
//! All checks operate on already-trimmed input.

use crate::error::{Result, ZenError};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Check an email address has the shape `local@domain.tld`
///
/// No whitespace anywhere, exactly one `@`, a non-empty local part and a
/// domain containing a dot that is neither its first nor last character.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validate an email, returning the user-facing message on failure
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(ZenError::invalid_input("Please enter your email address"));
    }
    if !is_valid_email(email) {
        return Err(ZenError::invalid_input("Please enter a valid email address"));
    }
    Ok(())
}

/// Validate a password against the minimum length
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ZenError::invalid_input(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Part of an email before the `@`, if any
pub fn email_local_part(email: &str) -> Option<&str> {
    email
        .split_once('@')
        .map(|(local, _)| local)
        .filter(|local| !local.is_empty())
}
