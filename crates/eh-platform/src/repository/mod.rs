//! Repository Layer
//!
//! Store contracts for users, events and attendees, with SQLite
//! implementations. Lookups return `Ok(None)` for absence and `Err` only for
//! storage failures, so callers handle the three outcomes exhaustively.
//! Every call is bounded by the store timeout; expiry surfaces as
//! [`PlatformError::Timeout`], a transient failure.

pub mod schema;
pub mod user;
pub mod event;
pub mod attendee;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{Attendee, Event, NewEvent, NewUser, User};
use crate::error::{PlatformError, Result};

pub use schema::{connect_pool, init_schema};
pub use user::SqliteUserRepository;
pub use event::SqliteEventRepository;
pub use attendee::SqliteAttendeeRepository;

/// Default bound on a single store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(3);

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with a duplicate error when the email is already registered.
    async fn insert(&self, user: &NewUser) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, event: &NewEvent) -> Result<Event>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>>;
    async fn find_all(&self) -> Result<Vec<Event>>;
    /// Replaces the descriptive fields of the stored row. `owner_id` is never written.
    async fn update(&self, event: &Event) -> Result<bool>;
    /// Deletes the event together with its attendee rows.
    async fn delete(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    /// Fails with a duplicate error when the pair already exists.
    async fn insert(&self, event_id: i64, user_id: i64) -> Result<Attendee>;
    async fn find_by_event_and_user(&self, event_id: i64, user_id: i64) -> Result<Option<Attendee>>;
    async fn find_users_by_event(&self, event_id: i64) -> Result<Vec<User>>;
    async fn find_events_by_user(&self, user_id: i64) -> Result<Vec<Event>>;
    async fn delete(&self, event_id: i64, user_id: i64) -> Result<bool>;
}

/// Run a store operation under `limit`.
pub async fn with_timeout<T, F>(limit: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = limit.as_millis() as u64, "Store operation timed out");
            Err(PlatformError::timeout(operation))
        }
    }
}

/// Current time at the millisecond precision the stores persist.
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

pub(crate) fn from_millis(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts)
        .ok_or_else(|| PlatformError::internal(format!("Invalid stored timestamp: {}", ts)))
}

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = connect_pool("sqlite::memory:", 1).await.unwrap();
    init_schema(&pool).await.unwrap();
    pool
}
