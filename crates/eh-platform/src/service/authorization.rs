//! Authorization
//!
//! Ownership-based access decisions for events and their attendee rosters.
//! Decisions are pure functions of the caller, the stored event and the
//! action; they never touch a store. Handlers must pass the event as loaded
//! from the store, not as received in a request body.

use crate::domain::{Event, User};
use crate::error::{PlatformError, Result};

/// Identity of an authenticated caller, resolved from a validated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    pub email: String,
    pub name: String,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }

    pub fn owns(&self, event: &Event) -> bool {
        event.is_owned_by(self.user_id)
    }
}

/// Operations on an existing event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Update,
    Delete,
    AddAttendee,
    RemoveAttendee,
}

impl EventAction {
    fn describe(self) -> &'static str {
        match self {
            Self::Update => "update this event",
            Self::Delete => "delete this event",
            Self::AddAttendee => "add attendees to this event",
            Self::RemoveAttendee => "remove attendees from this event",
        }
    }
}

/// Decide whether `caller` may perform `action` on `event`.
///
/// Every action here is owner-only; reads need no decision and creating an
/// event only needs an [`AuthContext`]. A non-owner gets `Forbidden`.
pub fn authorize(caller: &AuthContext, action: EventAction, event: &Event) -> Result<()> {
    if caller.owns(event) {
        Ok(())
    } else {
        Err(PlatformError::forbidden(format!(
            "Only the event owner may {}",
            action.describe()
        )))
    }
}

/// Convenience checks used by the API handlers
pub mod checks {
    use super::*;

    pub fn can_update_event(ctx: &AuthContext, event: &Event) -> Result<()> {
        authorize(ctx, EventAction::Update, event)
    }

    pub fn can_delete_event(ctx: &AuthContext, event: &Event) -> Result<()> {
        authorize(ctx, EventAction::Delete, event)
    }

    pub fn can_add_attendee(ctx: &AuthContext, event: &Event) -> Result<()> {
        authorize(ctx, EventAction::AddAttendee, event)
    }

    pub fn can_remove_attendee(ctx: &AuthContext, event: &Event) -> Result<()> {
        authorize(ctx, EventAction::RemoveAttendee, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventDetails;
    use crate::error::ErrorKind;
    use chrono::Utc;

    fn ctx(user_id: i64) -> AuthContext {
        AuthContext {
            user_id,
            email: format!("user{}@x.com", user_id),
            name: format!("User {}", user_id),
        }
    }

    fn event_owned_by(owner_id: i64) -> Event {
        let now = Utc::now();
        Event {
            id: 10,
            owner_id,
            details: EventDetails {
                name: "Rust Meetup".to_string(),
                description: "Monthly gathering".to_string(),
                date: now,
                location: "Hamburg".to_string(),
            },
            created_at: now,
            updated_at: now,
        }
    }

    const OWNER_ACTIONS: [EventAction; 4] = [
        EventAction::Update,
        EventAction::Delete,
        EventAction::AddAttendee,
        EventAction::RemoveAttendee,
    ];

    #[test]
    fn test_owner_may_mutate() {
        let event = event_owned_by(1);
        for action in OWNER_ACTIONS {
            assert!(authorize(&ctx(1), action, &event).is_ok(), "{:?}", action);
        }
    }

    #[test]
    fn test_non_owner_is_forbidden() {
        let event = event_owned_by(1);
        for action in OWNER_ACTIONS {
            let err = authorize(&ctx(2), action, &event).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Forbidden, "{:?}", action);
        }
    }

    #[test]
    fn test_owner_zero_is_not_a_wildcard() {
        let event = event_owned_by(0);
        for action in OWNER_ACTIONS {
            assert!(authorize(&ctx(7), action, &event).is_err(), "{:?}", action);
        }
    }

    #[test]
    fn test_checks_helpers() {
        let event = event_owned_by(5);
        assert!(checks::can_update_event(&ctx(5), &event).is_ok());
        assert!(checks::can_delete_event(&ctx(6), &event).is_err());
        assert!(checks::can_add_attendee(&ctx(6), &event).is_err());
        assert!(checks::can_remove_attendee(&ctx(5), &event).is_ok());
    }
}
