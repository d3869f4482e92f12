pub mod auth_service;
pub use auth_service::{AuthError, AuthService, AuthenticatedUser, FieldErrors};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;
