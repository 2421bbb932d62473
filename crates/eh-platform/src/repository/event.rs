//! Event Repository

use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use super::{from_millis, now_millis, with_timeout, EventRepository, DEFAULT_STORE_TIMEOUT};
use crate::domain::{Event, EventDetails, NewEvent};
use crate::error::{PlatformError, Result};

pub(crate) const EVENT_COLUMNS: &str =
    "e.id, e.owner_id, e.name, e.description, e.date, e.location, e.created_at, e.updated_at";

pub struct SqliteEventRepository {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteEventRepository {
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

pub(crate) fn event_from_row(row: &SqliteRow) -> Result<Event> {
    Ok(Event {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        details: EventDetails {
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            date: from_millis(row.try_get("date")?)?,
            location: row.try_get("location")?,
        },
        created_at: from_millis(row.try_get("created_at")?)?,
        updated_at: from_millis(row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn insert(&self, event: &NewEvent) -> Result<Event> {
        let now = now_millis();

        let result = with_timeout(self.timeout, "events.insert", async {
            sqlx::query(
                r#"
                INSERT INTO events (owner_id, name, description, date, location, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(event.owner_id)
            .bind(&event.details.name)
            .bind(&event.details.description)
            .bind(event.details.date.timestamp_millis())
            .bind(&event.details.location)
            .bind(now.timestamp_millis())
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(PlatformError::from)
        })
        .await?;

        let date = from_millis(event.details.date.timestamp_millis())?;
        Ok(Event {
            id: result.last_insert_rowid(),
            owner_id: event.owner_id,
            details: EventDetails { date, ..event.details.clone() },
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        with_timeout(self.timeout, "events.find_by_id", async {
            let query = format!("SELECT {} FROM events e WHERE e.id = ?", EVENT_COLUMNS);
            let row = sqlx::query(&query)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(event_from_row).transpose()
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Event>> {
        with_timeout(self.timeout, "events.find_all", async {
            let query = format!("SELECT {} FROM events e ORDER BY e.id", EVENT_COLUMNS);
            let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
            rows.iter().map(event_from_row).collect::<Result<Vec<_>>>()
        })
        .await
    }

    async fn update(&self, event: &Event) -> Result<bool> {
        let updated_at = now_millis();

        let result = with_timeout(self.timeout, "events.update", async {
            sqlx::query(
                r#"
                UPDATE events
                SET name = ?, description = ?, date = ?, location = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&event.details.name)
            .bind(&event.details.description)
            .bind(event.details.date.timestamp_millis())
            .bind(&event.details.location)
            .bind(updated_at.timestamp_millis())
            .bind(event.id)
            .execute(&self.pool)
            .await
            .map_err(PlatformError::from)
        })
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let (attendees_removed, deleted) = with_timeout(self.timeout, "events.delete", async {
            let mut tx = self.pool.begin().await?;

            let attendees = sqlx::query("DELETE FROM attendees WHERE event_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let events = sqlx::query("DELETE FROM events WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, PlatformError>((attendees.rows_affected(), events.rows_affected() > 0))
        })
        .await?;

        if deleted {
            info!(event_id = id, attendees_removed, "Deleted event");
        }
        Ok(deleted)
    }
}
