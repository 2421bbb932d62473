//! API Middleware
//!
//! Bearer-token authentication for Axum. The resolved identity is handed to
//! handlers as a typed [`Authenticated`] value; a request without a valid
//! token for an existing user never reaches a handler that requires one.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::PlatformError;
use crate::repository::UserRepository;
use crate::service::{extract_bearer_token, AuthContext, AuthService};

/// Shared state for the authentication extractor, installed as a request extension
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_repo: Arc<dyn UserRepository>,
}

/// Extractor for authenticated requests.
/// Validates the bearer token and resolves the caller to a stored user.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = parts
            .extensions
            .get::<AppState>()
            .cloned()
            .ok_or_else(|| PlatformError::internal("AppState not found"))?;

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| PlatformError::unauthorized("Missing Authorization header"))?;

        let token = extract_bearer_token(auth_header)
            .ok_or_else(|| PlatformError::unauthorized("Invalid Authorization header format"))?;

        let user_id = app_state.auth_service.validate(token)?;

        let user = match app_state.user_repo.find_by_id(user_id).await? {
            Some(user) => user,
            None => {
                warn!(user_id, "Token refers to an unknown user");
                return Err(PlatformError::invalid_token("Unknown user"));
            }
        };

        debug!(user_id = user.id, "Authenticated request");
        Ok(Authenticated(AuthContext::from_user(&user)))
    }
}
