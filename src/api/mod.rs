use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService};

pub mod auth;
mod error;
mod pages;
pub mod session;

pub use error::PageError;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let auth: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.security.clone(),
    ));

    Ok(Arc::new(AppState {
        config,
        store,
        auth,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.server.session_timeout_minutes,
        )));

    Router::new()
        .route("/", get(auth::index))
        .route("/register", get(auth::register_form).post(auth::register_submit))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/welcome", get(auth::welcome))
        .route(
            "/reset-password",
            get(auth::reset_password_form).post(auth::reset_password_submit),
        )
        .route("/logout", get(auth::logout))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
