use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::services::auth_service::{
    AuthError, FieldErrors, MSG_GENERIC_FAILURE, MSG_INVALID_CREDENTIALS,
};

use super::session::{LOGIN_PAGE, WELCOME_PAGE, require_login};
use super::{AppState, PageError, pages, session};

// Missing form fields deserialize as empty strings and fall through to
// the same validation as blank input.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordForm {
    pub new_password: String,
    pub confirm_password: String,
}

/// GET /
pub async fn index() -> Redirect {
    Redirect::to(WELCOME_PAGE)
}

/// GET /login
/// Renders the login form; already-authenticated users go straight to the
/// welcome page.
pub async fn login_form(session: Session) -> Result<Response, PageError> {
    if session::current(&session).await?.is_some() {
        return Ok(Redirect::to(WELCOME_PAGE).into_response());
    }

    let html = pages::login_page("", &FieldErrors::default(), None);
    Ok(Html(html).into_response())
}

/// POST /login
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state.auth.login(&form.username, &form.password).await {
        Ok(user) => {
            session::establish(&session, &user).await?;
            Ok(Redirect::to(WELCOME_PAGE).into_response())
        }
        Err(AuthError::Validation(errors)) => {
            let html = pages::login_page(form.username.trim(), &errors, None);
            Ok(Html(html).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            let html = pages::login_page(
                form.username.trim(),
                &FieldErrors::default(),
                Some(MSG_INVALID_CREDENTIALS),
            );
            Ok(Html(html).into_response())
        }
        Err(AuthError::Database(detail)) => {
            tracing::error!("Database error during login: {}", detail);
            let html = pages::login_page(
                form.username.trim(),
                &FieldErrors::default(),
                Some(MSG_GENERIC_FAILURE),
            );
            Ok(Html(html).into_response())
        }
    }
}

/// GET /register
pub async fn register_form() -> Html<String> {
    Html(pages::register_page("", &FieldErrors::default(), None))
}

/// POST /register
pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    match state
        .auth
        .register(&form.username, &form.password, &form.confirm_password)
        .await
    {
        Ok(()) => Ok(Redirect::to(LOGIN_PAGE).into_response()),
        Err(AuthError::Validation(errors)) => {
            let html = pages::register_page(form.username.trim(), &errors, None);
            Ok(Html(html).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            // Registration never produces this; treat it as unexpected.
            Err(PageError::Internal(
                "Unexpected credential error during registration".to_string(),
            ))
        }
        Err(AuthError::Database(detail)) => {
            tracing::error!("Database error during registration: {}", detail);
            let html = pages::register_page(
                form.username.trim(),
                &FieldErrors::default(),
                Some(MSG_GENERIC_FAILURE),
            );
            Ok(Html(html).into_response())
        }
    }
}

/// GET /welcome (guarded)
pub async fn welcome(session: Session) -> Result<Response, PageError> {
    let user = match require_login(&session).await {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    Ok(Html(pages::welcome_page(&user.username)).into_response())
}

/// GET /reset-password (guarded)
pub async fn reset_password_form(session: Session) -> Result<Response, PageError> {
    if let Err(redirect) = require_login(&session).await {
        return Ok(redirect);
    }

    let html = pages::reset_password_page(&FieldErrors::default(), None);
    Ok(Html(html).into_response())
}

/// POST /reset-password (guarded)
/// On success the acting session is destroyed so the user must log in
/// again with the new password.
pub async fn reset_password_submit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, PageError> {
    let user = match require_login(&session).await {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    match state
        .auth
        .reset_password(user.id, &form.new_password, &form.confirm_password)
        .await
    {
        Ok(()) => {
            session::clear(&session).await;
            Ok(Redirect::to(LOGIN_PAGE).into_response())
        }
        Err(AuthError::Validation(errors)) => {
            let html = pages::reset_password_page(&errors, None);
            Ok(Html(html).into_response())
        }
        Err(AuthError::InvalidCredentials) => Err(PageError::Internal(
            "Unexpected credential error during password reset".to_string(),
        )),
        Err(AuthError::Database(detail)) => {
            tracing::error!(
                "Database error during password reset for user id {}: {}",
                user.id,
                detail
            );
            let html =
                pages::reset_password_page(&FieldErrors::default(), Some(MSG_GENERIC_FAILURE));
            Ok(Html(html).into_response())
        }
    }
}

/// GET /logout
/// Always succeeds, even without a live session.
pub async fn logout(session: Session) -> Redirect {
    session::clear(&session).await;
    Redirect::to(LOGIN_PAGE)
}
