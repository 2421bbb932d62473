//! Attendee Repository
//!
//! The UNIQUE (event_id, user_id) index is the final arbiter of membership
//! uniqueness; a violation on insert is reported as a duplicate even when a
//! concurrent request slipped past the caller's pre-check.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::event::{event_from_row, EVENT_COLUMNS};
use super::user::user_from_row;
use super::{from_millis, now_millis, with_timeout, AttendeeRepository, DEFAULT_STORE_TIMEOUT};
use crate::domain::{Attendee, Event, User};
use crate::error::{PlatformError, Result};

pub struct SqliteAttendeeRepository {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteAttendeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn attendee_from_row(row: &SqliteRow) -> Result<Attendee> {
    Ok(Attendee {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        user_id: row.try_get("user_id")?,
        created_at: from_millis(row.try_get("created_at")?)?,
    })
}

fn map_insert_error(err: sqlx::Error, event_id: i64, user_id: i64) -> PlatformError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => PlatformError::duplicate(
            "Attendee",
            "eventId,userId",
            format!("{},{}", event_id, user_id),
        ),
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            PlatformError::not_found("Event or User", format!("{},{}", event_id, user_id))
        }
        _ => PlatformError::from(err),
    }
}

#[async_trait]
impl AttendeeRepository for SqliteAttendeeRepository {
    async fn insert(&self, event_id: i64, user_id: i64) -> Result<Attendee> {
        let created_at = now_millis();

        let result = with_timeout(self.timeout, "attendees.insert", async {
            sqlx::query("INSERT INTO attendees (event_id, user_id, created_at) VALUES (?, ?, ?)")
                .bind(event_id)
                .bind(user_id)
                .bind(created_at.timestamp_millis())
                .execute(&self.pool)
                .await
                .map_err(|e| map_insert_error(e, event_id, user_id))
        })
        .await?;

        info!(event_id, user_id, "Added attendee");
        Ok(Attendee {
            id: result.last_insert_rowid(),
            event_id,
            user_id,
            created_at,
        })
    }

    async fn find_by_event_and_user(&self, event_id: i64, user_id: i64) -> Result<Option<Attendee>> {
        debug!(event_id, user_id, "Looking up attendee");
        with_timeout(self.timeout, "attendees.find_by_event_and_user", async {
            let row = sqlx::query(
                "SELECT id, event_id, user_id, created_at FROM attendees WHERE event_id = ? AND user_id = ?",
            )
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
            row.as_ref().map(attendee_from_row).transpose()
        })
        .await
    }

    async fn find_users_by_event(&self, event_id: i64) -> Result<Vec<User>> {
        with_timeout(self.timeout, "attendees.find_users_by_event", async {
            let rows = sqlx::query(
                r#"
                SELECT u.id, u.email, u.name, u.password_hash, u.created_at
                FROM users u
                JOIN attendees a ON a.user_id = u.id
                WHERE a.event_id = ?
                ORDER BY a.id
                "#,
            )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;
            rows.iter().map(user_from_row).collect::<Result<Vec<_>>>()
        })
        .await
    }

    async fn find_events_by_user(&self, user_id: i64) -> Result<Vec<Event>> {
        with_timeout(self.timeout, "attendees.find_events_by_user", async {
            let query = format!(
                "SELECT {} FROM events e JOIN attendees a ON a.event_id = e.id WHERE a.user_id = ? ORDER BY e.id",
                EVENT_COLUMNS
            );
            let rows = sqlx::query(&query)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
            rows.iter().map(event_from_row).collect::<Result<Vec<_>>>()
        })
        .await
    }

    async fn delete(&self, event_id: i64, user_id: i64) -> Result<bool> {
        let result = with_timeout(self.timeout, "attendees.delete", async {
            sqlx::query("DELETE FROM attendees WHERE event_id = ? AND user_id = ?")
                .bind(event_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(PlatformError::from)
        })
        .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(event_id, user_id, "Removed attendee");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventDetails, NewEvent, NewUser};
    use crate::error::ErrorKind;
    use crate::repository::{test_pool, EventRepository, SqliteEventRepository, SqliteUserRepository, UserRepository};
    use chrono::Utc;

    struct Fixture {
        repo: SqliteAttendeeRepository,
        event_id: i64,
        alice: i64,
        bob: i64,
    }

    async fn fixture() -> Fixture {
        let pool = test_pool().await;
        let users = SqliteUserRepository::new(pool.clone());
        let events = SqliteEventRepository::new(pool.clone());

        let alice = users.insert(&NewUser::new("alice@x.com", "Alice", "h")).await.unwrap().id;
        let bob = users.insert(&NewUser::new("bob@x.com", "Bob", "h")).await.unwrap().id;
        let event = events
            .insert(&NewEvent::new(
                alice,
                EventDetails {
                    name: "Rust Meetup".to_string(),
                    description: "Monthly gathering of Rust users".to_string(),
                    date: Utc::now(),
                    location: "Hamburg".to_string(),
                },
            ))
            .await
            .unwrap();

        Fixture {
            repo: SqliteAttendeeRepository::new(pool),
            event_id: event.id,
            alice,
            bob,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let f = fixture().await;

        let attendee = f.repo.insert(f.event_id, f.bob).await.unwrap();
        assert_eq!(attendee.event_id, f.event_id);
        assert_eq!(attendee.user_id, f.bob);

        let found = f.repo.find_by_event_and_user(f.event_id, f.bob).await.unwrap().unwrap();
        assert_eq!(found, attendee);
        assert!(f.repo.find_by_event_and_user(f.event_id, f.alice).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_rejected_by_store() {
        let f = fixture().await;
        f.repo.insert(f.event_id, f.bob).await.unwrap();

        let err = f.repo.insert(f.event_id, f.bob).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let f = fixture().await;
        let err = f.repo.insert(f.event_id + 50, f.bob).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_listing_by_event_and_by_user() {
        let f = fixture().await;
        f.repo.insert(f.event_id, f.bob).await.unwrap();
        f.repo.insert(f.event_id, f.alice).await.unwrap();

        let users = f.repo.find_users_by_event(f.event_id).await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Alice"]);

        let events = f.repo.find_events_by_user(f.bob).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, f.event_id);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let f = fixture().await;
        f.repo.insert(f.event_id, f.bob).await.unwrap();

        assert!(f.repo.delete(f.event_id, f.bob).await.unwrap());
        assert!(!f.repo.delete(f.event_id, f.bob).await.unwrap());
        assert!(!f.repo.delete(f.event_id, f.bob).await.unwrap());
    }
}
