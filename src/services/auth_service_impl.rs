//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{CreateUserOutcome, Store};
use crate::services::auth_service::{
    AuthError, AuthService, AuthenticatedUser, FieldErrors, MSG_USERNAME_TAKEN,
    validate_confirm_password, validate_password, validate_username,
};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        let username = username.trim();
        let password = password.trim();
        let confirm_password = confirm_password.trim();

        let mut errors = FieldErrors {
            username: validate_username(username),
            password: validate_password(password, self.security.min_password_length),
            ..Default::default()
        };
        errors.confirm_password =
            validate_confirm_password(password, confirm_password, errors.password.is_none());

        // Pre-check for a friendlier error before hashing; the unique
        // constraint on insert remains the authority under races.
        if errors.username.is_none() {
            let existing = self.store.find_user_by_username(username).await?;
            if existing.is_some() {
                errors.username = Some(MSG_USERNAME_TAKEN.to_string());
            }
        }

        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        match self
            .store
            .create_user(username, password, &self.security)
            .await?
        {
            CreateUserOutcome::Created(user) => {
                info!("Registered new user: {}", user.username);
                Ok(())
            }
            CreateUserOutcome::UsernameTaken => Err(AuthError::Validation(FieldErrors {
                username: Some(MSG_USERNAME_TAKEN.to_string()),
                ..Default::default()
            })),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthenticatedUser, AuthError> {
        let username = username.trim();
        let password = password.trim();

        let errors = FieldErrors {
            username: username
                .is_empty()
                .then(|| "Please enter your username.".to_string()),
            password: password
                .is_empty()
                .then(|| "Please enter your password.".to_string()),
            ..Default::default()
        };

        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        // No-such-user and wrong-password collapse into the same error.
        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        info!("User logged in: {}", user.username);

        Ok(AuthenticatedUser {
            id: user.id,
            username: user.username,
        })
    }

    async fn reset_password(
        &self,
        user_id: i32,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        let new_password = new_password.trim();
        let confirm_password = confirm_password.trim();

        let mut errors = FieldErrors {
            password: validate_password(new_password, self.security.min_password_length),
            ..Default::default()
        };
        errors.confirm_password =
            validate_confirm_password(new_password, confirm_password, errors.password.is_none());

        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        self.store
            .update_user_password(user_id, new_password, &self.security)
            .await?;

        info!("Password reset for user id {user_id}");

        Ok(())
    }
}
