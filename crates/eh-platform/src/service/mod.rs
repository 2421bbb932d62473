//! Service Layer
//!
//! Token issuance, password hashing and authorization decisions.

pub mod auth;
pub mod authorization;
pub mod password;

pub use auth::{AuthService, AuthConfig, AccessTokenClaims, extract_bearer_token};
pub use authorization::{AuthContext, EventAction, authorize, checks};
pub use password::{PasswordService, PasswordPolicy, Argon2Config};
