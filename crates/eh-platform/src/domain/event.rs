//! Event Entity
//!
//! An event is owned by the user who created it. `owner_id` is fixed at
//! creation; only the descriptive fields in [`EventDetails`] can change.

use chrono::{DateTime, Utc};

/// Mutable, descriptive part of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
}

/// Stored event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Store-assigned identifier
    pub id: i64,

    /// Creating user; never changed after insert
    pub owner_id: i64,

    pub details: EventDetails,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    /// Replace the descriptive fields. The owner is untouched.
    pub fn apply(&mut self, details: EventDetails) {
        self.details = details;
        self.updated_at = Utc::now();
    }
}

/// Event data prior to insertion
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub owner_id: i64,
    pub details: EventDetails,
}

impl NewEvent {
    pub fn new(owner_id: i64, details: EventDetails) -> Self {
        Self { owner_id, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: &str) -> EventDetails {
        EventDetails {
            name: name.to_string(),
            description: "A long enough description".to_string(),
            date: Utc::now(),
            location: "Berlin".to_string(),
        }
    }

    #[test]
    fn test_apply_keeps_owner() {
        let now = Utc::now();
        let mut event = Event {
            id: 1,
            owner_id: 42,
            details: details("Meetup"),
            created_at: now,
            updated_at: now,
        };

        event.apply(details("Renamed Meetup"));

        assert_eq!(event.owner_id, 42);
        assert_eq!(event.details.name, "Renamed Meetup");
        assert!(event.is_owned_by(42));
        assert!(!event.is_owned_by(7));
    }
}
