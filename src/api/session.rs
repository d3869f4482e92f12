//! Session lifecycle for authenticated users.
//!
//! The authenticated identity is stored as one value under one key, so a
//! session is either fully authenticated or carries nothing at all.

use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::services::AuthenticatedUser;

use super::PageError;

const SESSION_USER_KEY: &str = "user";

pub const LOGIN_PAGE: &str = "/login";
pub const WELCOME_PAGE: &str = "/welcome";

/// The identity bound to the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}

/// Binds an authenticated identity to the session after a successful login.
pub async fn establish(session: &Session, user: &AuthenticatedUser) -> Result<(), PageError> {
    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
    };
    session.insert(SESSION_USER_KEY, current).await?;
    Ok(())
}

/// Resolves the session to its authenticated identity, if any.
pub async fn current(session: &Session) -> Result<Option<CurrentUser>, PageError> {
    Ok(session.get::<CurrentUser>(SESSION_USER_KEY).await?)
}

/// Destroys the session server-side and expires the client cookie.
/// Safe to call on a session that no longer exists.
pub async fn clear(session: &Session) {
    if let Err(e) = session.flush().await {
        tracing::warn!("Failed to flush session: {}", e);
    }
}

/// Page guard: every protected page calls this exactly once before
/// producing any output. An unauthenticated request becomes a redirect
/// to the login page.
pub async fn require_login(session: &Session) -> Result<CurrentUser, Response> {
    match current(session).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(Redirect::to(LOGIN_PAGE).into_response()),
        Err(e) => Err(e.into_response()),
    }
}
