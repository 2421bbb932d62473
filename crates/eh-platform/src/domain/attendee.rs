//! Attendee Entity
//!
//! Membership of one user in one event. At most one row exists per
//! `(event_id, user_id)` pair.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
