//! Domain service for authentication and account management.
//!
//! Handles registration, login, and password resets. Session lifecycle is
//! owned by the web layer; this service only decides whether credentials
//! and inputs are acceptable.

use thiserror::Error;

/// User-facing messages, shared across pages so that incidental wording
/// differences cannot creep back in.
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid username or password.";
pub const MSG_GENERIC_FAILURE: &str = "Oops! Something went wrong. Please try again later.";
pub const MSG_USERNAME_TAKEN: &str = "This username is already taken.";

/// Field-level validation errors for form re-display.
///
/// Each populated field maps to one named input on the page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.confirm_password.is_none()
    }
}

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username and wrong password are deliberately
    /// indistinguishable to the client.
    #[error("{MSG_INVALID_CREDENTIALS}")]
    InvalidCredentials,

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// The authenticated identity handed to the session layer after login.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a new account. Inputs are trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] with per-field messages on bad
    /// input or a taken username; the caller redirects to login on success.
    async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError>;

    /// Verifies credentials and returns the identity to bind to a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Replaces the password of an already-authenticated user.
    ///
    /// The caller must destroy the acting session afterwards so the user
    /// re-authenticates with the new password.
    async fn reset_password(
        &self,
        user_id: i32,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError>;
}

pub fn validate_username(username: &str) -> Option<String> {
    if username.is_empty() {
        return Some("Please enter a username.".to_string());
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Some("Username can only contain letters, numbers, and underscores.".to_string());
    }

    None
}

pub fn validate_password(password: &str, min_length: usize) -> Option<String> {
    if password.is_empty() {
        return Some("Please enter a password.".to_string());
    }

    if password.len() < min_length {
        return Some(format!("Password must be at least {min_length} characters."));
    }

    None
}

/// Empty confirmation is its own error; a mismatch is only reported when
/// the password itself already passed validation.
pub fn validate_confirm_password(
    password: &str,
    confirm_password: &str,
    password_ok: bool,
) -> Option<String> {
    if confirm_password.is_empty() {
        return Some("Please confirm your password.".to_string());
    }

    if password_ok && password != confirm_password {
        return Some("Passwords do not match.".to_string());
    }

    None
}
