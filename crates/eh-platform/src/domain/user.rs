//! User Entity
//!
//! Identity record. The password is only ever held as an argon2 PHC string
//! and the type deliberately does not implement `Serialize`; API responses
//! go through `UserResponse`.

use chrono::{DateTime, Utc};

/// Registered user
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned identifier
    pub id: i64,

    /// Login key, unique across users
    pub email: String,

    /// Display name
    pub name: String,

    /// Salted one-way hash of the password
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// User data prior to insertion
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            email: normalize_email(&email.into()),
            name: name.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// Emails are compared case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_email() {
        let user = NewUser::new("  Alice@X.com ", "Alice", "$argon2id$...");
        assert_eq!(user.email, "alice@x.com");
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let user = User {
            id: 1,
            email: "alice@x.com".to_string(),
            name: "Alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: Utc::now(),
        };
        let printed = format!("{:?}", user);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
