//! Platform configuration
//!
//! Loaded once from the environment at startup and passed explicitly to the
//! components that need it.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EH_API_PORT` | `8080` | HTTP API port |
//! | `EH_DATABASE_URL` | `sqlite://eventhub.db` | SQLite database URL |
//! | `EH_DB_MAX_CONNECTIONS` | `5` | Connection pool size |
//! | `EH_JWT_SECRET` | - | HMAC secret for tokens (required) |
//! | `EH_TOKEN_TTL_HOURS` | `72` | Token lifetime |
//! | `EH_STORE_TIMEOUT_MS` | `3000` | Bound on each store call |
//! | `EH_LOG_FORMAT` | `text` | `text` or `json` |

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PlatformError, Result};
use crate::service::AuthConfig;

pub const MIN_SECRET_LEN: usize = 32;

/// Upper bound on `EH_TOKEN_TTL_HOURS` (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(PlatformError::configuration(format!("Unknown log format: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub api_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub token_ttl_secs: i64,
    pub store_timeout: Duration,
    pub log_format: LogFormat,
}

impl PlatformConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("EH_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PlatformError::configuration("EH_JWT_SECRET must be set"))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(PlatformError::configuration(format!(
                "EH_JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let token_ttl_hours: i64 = parse_or(&lookup, "EH_TOKEN_TTL_HOURS", 72)?;
        if token_ttl_hours <= 0 || token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(PlatformError::configuration(format!(
                "EH_TOKEN_TTL_HOURS must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }
        let token_ttl_secs = token_ttl_hours
            .checked_mul(3600)
            .ok_or_else(|| PlatformError::configuration("EH_TOKEN_TTL_HOURS is out of range"))?;

        Ok(Self {
            api_port: parse_or(&lookup, "EH_API_PORT", 8080)?,
            database_url: lookup("EH_DATABASE_URL").unwrap_or_else(|| "sqlite://eventhub.db".to_string()),
            db_max_connections: parse_or(&lookup, "EH_DB_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            token_ttl_hours,
            token_ttl_secs,
            store_timeout: Duration::from_millis(parse_or(&lookup, "EH_STORE_TIMEOUT_MS", 3000)?),
            log_format: lookup("EH_LOG_FORMAT")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or_default(),
        })
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.jwt_secret.clone()).with_ttl_secs(self.token_ttl_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PlatformError::configuration(format!("Invalid value for {}: {}", key, raw))),
        None => Ok(default),
    }
}

/// Lookup over a fixed map, handy for tests and embedding.
pub fn map_lookup(vars: HashMap<String, String>) -> impl Fn(&str) -> Option<String> {
    move |key| vars.get(key).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = PlatformConfig::from_lookup(map_lookup(vars(&[("EH_JWT_SECRET", SECRET)]))).unwrap();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.database_url, "sqlite://eventhub.db");
        assert_eq!(config.token_ttl_hours, 72);
        assert_eq!(config.store_timeout, Duration::from_secs(3));
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.auth_config().token_ttl_secs, 72 * 3600);
    }

    #[test]
    fn test_overrides() {
        let config = PlatformConfig::from_lookup(map_lookup(vars(&[
            ("EH_JWT_SECRET", SECRET),
            ("EH_API_PORT", "9000"),
            ("EH_STORE_TIMEOUT_MS", "250"),
            ("EH_LOG_FORMAT", "JSON"),
        ])))
        .unwrap();
        assert_eq!(config.api_port, 9000);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_secret_fails() {
        assert!(PlatformConfig::from_lookup(map_lookup(HashMap::new())).is_err());
    }

    #[test]
    fn test_short_secret_fails() {
        let result = PlatformConfig::from_lookup(map_lookup(vars(&[("EH_JWT_SECRET", "short")])));
        assert!(result.is_err());
    }

    #[test]
    fn test_token_ttl_bounds() {
        let ttl = |hours: &str| {
            PlatformConfig::from_lookup(map_lookup(vars(&[
                ("EH_JWT_SECRET", SECRET),
                ("EH_TOKEN_TTL_HOURS", hours),
            ])))
        };

        assert!(ttl("0").is_err());
        assert!(ttl("-5").is_err());
        assert!(ttl("1000000000000").is_err());
        assert!(ttl(&(MAX_TOKEN_TTL_HOURS + 1).to_string()).is_err());

        let config = ttl(&MAX_TOKEN_TTL_HOURS.to_string()).unwrap();
        assert_eq!(config.token_ttl_secs, MAX_TOKEN_TTL_HOURS * 3600);
        let auth = crate::service::AuthService::new(config.auth_config());
        assert_eq!(auth.validate(&auth.issue_token(1).unwrap()).unwrap(), 1);
    }

    #[test]
    fn test_invalid_number_fails() {
        let result = PlatformConfig::from_lookup(map_lookup(vars(&[
            ("EH_JWT_SECRET", SECRET),
            ("EH_API_PORT", "not-a-port"),
        ])));
        assert!(result.is_err());
    }
}
