//! Events API
//!
//! Event CRUD. Reads are public; mutations require the caller to own the
//! stored event.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::api::common::require_min_chars;
use crate::api::middleware::Authenticated;
use crate::domain::{Event, EventDetails, NewEvent};
use crate::error::{PlatformError, Result};
use crate::repository::{AttendeeRepository, EventRepository, UserRepository};
use crate::service::checks;

/// Create or update event request.
///
/// The owner is never taken from the payload; unknown fields such as
/// `ownerId` are ignored.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    /// Event name (at least 3 characters)
    pub name: String,

    /// Description (at least 10 characters)
    pub description: String,

    /// Scheduled date/time (RFC 3339)
    pub date: DateTime<Utc>,

    /// Location (at least 3 characters)
    pub location: String,
}

impl EventRequest {
    pub fn into_details(self) -> Result<EventDetails> {
        require_min_chars("name", &self.name, 3)?;
        require_min_chars("description", &self.description, 10)?;
        require_min_chars("location", &self.location, 3)?;

        Ok(EventDetails {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            date: self.date,
            location: self.location.trim().to_string(),
        })
    }
}

/// Event response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            owner_id: e.owner_id,
            name: e.details.name,
            description: e.details.description,
            date: e.details.date.to_rfc3339(),
            location: e.details.location,
            created_at: e.created_at.to_rfc3339(),
            updated_at: e.updated_at.to_rfc3339(),
        }
    }
}

/// Events service state, shared with the attendee endpoints
#[derive(Clone)]
pub struct EventsState {
    pub event_repo: Arc<dyn EventRepository>,
    pub attendee_repo: Arc<dyn AttendeeRepository>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl EventsState {
    /// Load the stored event or fail with `NotFound`.
    pub async fn load_event(&self, id: i64) -> Result<Event> {
        self.event_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Event", id))
    }
}

/// Create a new event
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "events",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event(
    State(state): State<EventsState>,
    auth: Authenticated,
    WithRejection(Json(req), _): WithRejection<Json<EventRequest>, PlatformError>,
) -> std::result::Result<(StatusCode, Json<EventResponse>), PlatformError> {
    let details = req.into_details()?;

    let event = state
        .event_repo
        .insert(&NewEvent::new(auth.0.user_id, details))
        .await?;

    info!(event_id = event.id, owner_id = event.owner_id, "Created event");
    Ok((StatusCode::CREATED, Json(event.into())))
}

/// Get event by ID
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "events",
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    State(state): State<EventsState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, PlatformError>,
) -> std::result::Result<Json<EventResponse>, PlatformError> {
    let event = state.load_event(id).await?;
    Ok(Json(event.into()))
}

/// List all events
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "events",
    responses(
        (status = 200, description = "List of events", body = Vec<EventResponse>)
    )
)]
pub async fn list_events(
    State(state): State<EventsState>,
) -> std::result::Result<Json<Vec<EventResponse>>, PlatformError> {
    let events = state.event_repo.find_all().await?;
    debug!(count = events.len(), "Listed events");

    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// Update event
///
/// Replaces the descriptive fields. The owner never changes.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    tag = "events",
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_event(
    State(state): State<EventsState>,
    auth: Authenticated,
    WithRejection(Path(id), _): WithRejection<Path<i64>, PlatformError>,
    WithRejection(Json(req), _): WithRejection<Json<EventRequest>, PlatformError>,
) -> std::result::Result<Json<EventResponse>, PlatformError> {
    let mut event = state.load_event(id).await?;

    if let Err(e) = checks::can_update_event(&auth.0, &event) {
        warn!(event_id = id, user_id = auth.0.user_id, "Update denied");
        return Err(e);
    }

    event.apply(req.into_details()?);

    if !state.event_repo.update(&event).await? {
        return Err(PlatformError::not_found("Event", id));
    }

    info!(event_id = id, "Updated event");
    let stored = state.load_event(id).await?;
    Ok(Json(stored.into()))
}

/// Delete event
///
/// Removes the event and its attendee rows.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "events",
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_event(
    State(state): State<EventsState>,
    auth: Authenticated,
    WithRejection(Path(id), _): WithRejection<Path<i64>, PlatformError>,
) -> std::result::Result<StatusCode, PlatformError> {
    let event = state.load_event(id).await?;

    if let Err(e) = checks::can_delete_event(&auth.0, &event) {
        warn!(event_id = id, user_id = auth.0.user_id, "Delete denied");
        return Err(e);
    }

    if !state.event_repo.delete(id).await? {
        return Err(PlatformError::not_found("Event", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Create events router
pub fn events_router(state: EventsState) -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", get(get_event).put(update_event).delete(delete_event))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, description: &str, location: &str) -> EventRequest {
        EventRequest {
            name: name.to_string(),
            description: description.to_string(),
            date: Utc::now(),
            location: location.to_string(),
        }
    }

    #[test]
    fn test_event_request_ignores_owner_field() {
        let json = r#"{
            "name": "Rust Meetup",
            "description": "Monthly get-together",
            "date": "2030-05-01T18:00:00Z",
            "location": "Berlin",
            "ownerId": 999
        }"#;
        let req: EventRequest = serde_json::from_str(json).unwrap();
        let details = req.into_details().unwrap();
        assert_eq!(details.name, "Rust Meetup");
    }

    #[test]
    fn test_event_request_validation() {
        assert!(request("Meetup", "Long enough text", "Berlin").into_details().is_ok());
        assert!(request("Mu", "Long enough text", "Berlin").into_details().is_err());
        assert!(request("Meetup", "short", "Berlin").into_details().is_err());
        assert!(request("Meetup", "Long enough text", "B").into_details().is_err());
    }

    #[test]
    fn test_event_request_requires_date() {
        let json = r#"{"name":"Meetup","description":"Long enough text","location":"Berlin"}"#;
        assert!(serde_json::from_str::<EventRequest>(json).is_err());
    }

    #[test]
    fn test_event_response_serialization() {
        let now = Utc::now();
        let event = Event {
            id: 3,
            owner_id: 1,
            details: request("Meetup", "Long enough text", "Berlin").into_details().unwrap(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&EventResponse::from(event)).unwrap();
        assert!(json.contains("\"ownerId\":1"));
        assert!(json.contains("updatedAt"));
    }
}
