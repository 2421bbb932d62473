//! Authentication API
//!
//! Registration, login, and current-user endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::api::common::{require_min_chars, validate_email};
use crate::api::middleware::Authenticated;
use crate::domain::{NewUser, User};
use crate::error::{PlatformError, Result};
use crate::repository::UserRepository;
use crate::service::{AuthService, PasswordService};

/// Registration request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address, used as the login key
    pub email: String,

    /// Plaintext password (at least 8 characters)
    pub password: String,

    /// Display name (at least 2 characters)
    pub name: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Signed bearer token
    pub token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Auth service state
#[derive(Clone)]
pub struct AuthState {
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
    pub user_repo: Arc<dyn UserRepository>,
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_blocking(passwords: Arc<PasswordService>, password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || passwords.hash_password(&password))
        .await
        .map_err(|e| PlatformError::internal(format!("Hashing task failed: {}", e)))?
}

async fn verify_blocking(passwords: Arc<PasswordService>, password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || passwords.verify_password(&password, &hash))
        .await
        .map_err(|e| PlatformError::internal(format!("Verification task failed: {}", e)))?
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AuthState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, PlatformError>,
) -> std::result::Result<(StatusCode, Json<UserResponse>), PlatformError> {
    validate_email(&req.email)?;
    state.password_service.policy().validate(&req.password)?;
    require_min_chars("name", &req.name, 2)?;

    // The UNIQUE constraint still decides races; this avoids hashing for nothing.
    if state.user_repo.find_by_email(&req.email).await?.is_some() {
        return Err(PlatformError::duplicate("User", "email", req.email.trim()));
    }

    let password_hash = hash_blocking(Arc::clone(&state.password_service), req.password).await?;
    let user = state
        .user_repo
        .insert(&NewUser::new(req.email, req.name.trim(), password_hash))
        .await?;

    info!(user_id = user.id, "Registered user");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login with email and password
///
/// Returns a bearer token on success. Unknown email and wrong password are
/// indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, PlatformError>,
) -> std::result::Result<Json<LoginResponse>, PlatformError> {
    require_min_chars("email", &req.email, 1)?;
    if req.password.is_empty() {
        return Err(PlatformError::validation("password is required"));
    }

    let user = match state.user_repo.find_by_email(&req.email).await? {
        Some(user) => user,
        None => {
            let passwords = Arc::clone(&state.password_service);
            tokio::task::spawn_blocking(move || passwords.verify_absent(&req.password))
                .await
                .map_err(|e| PlatformError::internal(format!("Verification task failed: {}", e)))??;
            warn!("Login failed: unknown email");
            return Err(PlatformError::InvalidCredentials);
        }
    };

    let valid = verify_blocking(
        Arc::clone(&state.password_service),
        req.password,
        user.password_hash.clone(),
    )
    .await?;

    if !valid {
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(PlatformError::InvalidCredentials);
    }

    let token = state.auth_service.issue_token(user.id)?;
    info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth_service.token_ttl_secs(),
    }))
}

/// Get the current user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(
    State(state): State<AuthState>,
    auth: Authenticated,
) -> std::result::Result<Json<UserResponse>, PlatformError> {
    let user = state
        .user_repo
        .find_by_id(auth.0.user_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", auth.0.user_id))?;

    Ok(Json(user.into()))
}

/// Create auth router
pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(get_current_user))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{"email":"alice@x.com","password":"secret123","name":"Alice"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.email, "alice@x.com");
        assert_eq!(req.name, "Alice");
    }

    #[test]
    fn test_login_response_serialization() {
        let response = LoginResponse {
            token: "token123".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"token\""));
        assert!(json.contains("tokenType"));
        assert!(json.contains("expiresIn"));
    }

    #[test]
    fn test_user_response_has_no_password() {
        let user = User {
            id: 1,
            email: "alice@x.com".to_string(),
            name: "Alice".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(json.contains("createdAt"));
        assert!(!json.contains("argon2"));
        assert!(!json.to_lowercase().contains("password"));
    }
}
