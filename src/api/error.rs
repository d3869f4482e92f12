use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;

use crate::services::auth_service::MSG_GENERIC_FAILURE;

use super::pages;

/// Unrecoverable page-level failure. Detail is logged server-side; the
/// client only ever sees the generic message.
#[derive(Debug)]
pub enum PageError {
    Session(String),

    Internal(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::Session(msg) => write!(f, "Session error: {}", msg),
            PageError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for PageError {}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match &self {
            PageError::Session(msg) => tracing::error!("Session error: {}", msg),
            PageError::Internal(msg) => tracing::error!("Internal error: {}", msg),
        }

        let body = pages::error_page(MSG_GENERIC_FAILURE);
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}

impl From<tower_sessions::session::Error> for PageError {
    fn from(err: tower_sessions::session::Error) -> Self {
        PageError::Session(err.to_string())
    }
}

impl From<anyhow::Error> for PageError {
    fn from(err: anyhow::Error) -> Self {
        PageError::Internal(err.to_string())
    }
}
