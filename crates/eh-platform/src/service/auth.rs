//! Token Service
//!
//! Issues and validates HS256-signed identity assertions. A token carries the
//! user id and an expiry; nothing outside the signed claims is trusted.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlatformError, Result};

/// Default token lifetime: 72 hours
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 72 * 3600;

/// Token configuration, loaded once at startup
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret
    pub secret_key: String,
    /// Lifetime of an issued token in seconds
    pub token_ttl_secs: i64,
}

impl AuthConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    pub fn with_ttl_secs(mut self, token_ttl_secs: i64) -> Self {
        self.token_ttl_secs = token_ttl_secs;
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// Signed claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenClaims {
    pub user_id: i64,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.config.token_ttl_secs
    }

    /// Issue a token for `user_id`, valid from now.
    pub fn issue_token(&self, user_id: i64) -> Result<String> {
        self.issue_token_at(user_id, Utc::now())
    }

    pub fn issue_token_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String> {
        let expires_at = Duration::try_seconds(self.config.token_ttl_secs)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                PlatformError::internal(format!(
                    "Token lifetime of {}s is out of range",
                    self.config.token_ttl_secs
                ))
            })?;
        let claims = AccessTokenClaims {
            user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PlatformError::internal(format!("Error generating token: {}", e)))
    }

    /// Validate signature, structure and expiry.
    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                match e.kind() {
                    JwtErrorKind::ExpiredSignature => PlatformError::invalid_token("Token expired"),
                    JwtErrorKind::InvalidSignature => PlatformError::invalid_token("Signature mismatch"),
                    _ => PlatformError::invalid_token("Malformed token"),
                }
            })?;

        Ok(data.claims)
    }

    /// Validate and return the asserted user id.
    pub fn validate(&self, token: &str) -> Result<i64> {
        self.validate_token(token).map(|claims| claims.user_id)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn service(secret: &str) -> AuthService {
        AuthService::new(AuthConfig::new(secret))
    }

    #[test]
    fn test_issue_and_validate() {
        let auth = service("test-secret-that-is-long-enough-1234");
        let token = auth.issue_token(42).unwrap();

        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(auth.validate(&token).unwrap(), 42);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = service("test-secret-that-is-long-enough-1234");
        let issued = Utc::now() - Duration::hours(73);
        let token = auth.issue_token_at(42, issued).unwrap();

        let err = auth.validate(&token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(matches!(err, PlatformError::InvalidToken { ref message } if message == "Token expired"));
    }

    #[test]
    fn test_token_still_valid_just_before_expiry() {
        let auth = service("test-secret-that-is-long-enough-1234");
        let issued = Utc::now() - Duration::hours(71);
        let token = auth.issue_token_at(7, issued).unwrap();
        assert_eq!(auth.validate(&token).unwrap(), 7);
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let ours = service("test-secret-that-is-long-enough-1234");
        let theirs = service("some-other-secret-entirely-different");
        let token = theirs.issue_token(42).unwrap();

        assert!(ours.validate(&token).is_err());
    }

    #[test]
    fn test_swapped_payload_is_rejected() {
        let auth = service("test-secret-that-is-long-enough-1234");
        let alice = auth.issue_token(1).unwrap();
        let bob = auth.issue_token(2).unwrap();

        let alice_parts: Vec<&str> = alice.split('.').collect();
        let bob_parts: Vec<&str> = bob.split('.').collect();
        let forged = format!("{}.{}.{}", alice_parts[0], bob_parts[1], alice_parts[2]);

        let err = auth.validate(&forged).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let auth = AuthService::new(
            AuthConfig::new("test-secret-that-is-long-enough-1234").with_ttl_secs(i64::MAX),
        );
        let err = auth.issue_token(42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let auth = service("test-secret-that-is-long-enough-1234");
        assert!(auth.validate("not-a-token").is_err());
        assert!(auth.validate("").is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
    }
}
