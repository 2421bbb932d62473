//! Attendees API
//!
//! Roster management for events. Only the event owner adds or removes
//! attendees; rosters are publicly readable.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::api::auth::UserResponse;
use crate::api::events::{EventResponse, EventsState};
use crate::api::middleware::Authenticated;
use crate::domain::Attendee;
use crate::error::PlatformError;
use crate::service::checks;

/// Attendee response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeResponse {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub created_at: String,
}

impl From<Attendee> for AttendeeResponse {
    fn from(a: Attendee) -> Self {
        Self {
            id: a.id,
            event_id: a.event_id,
            user_id: a.user_id,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// Add a user to an event's roster
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/attendees/{user_id}",
    tag = "attendees",
    params(
        ("id" = i64, Path, description = "Event ID"),
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 201, description = "Attendee added", body = AttendeeResponse),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Event or user not found"),
        (status = 409, description = "User already attends this event")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_attendee(
    State(state): State<EventsState>,
    auth: Authenticated,
    WithRejection(Path((event_id, user_id)), _): WithRejection<Path<(i64, i64)>, PlatformError>,
) -> Result<(StatusCode, Json<AttendeeResponse>), PlatformError> {
    let event = state.load_event(event_id).await?;

    if let Err(e) = checks::can_add_attendee(&auth.0, &event) {
        warn!(event_id, user_id = auth.0.user_id, "Add attendee denied");
        return Err(e);
    }

    state
        .user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", user_id))?;

    if state
        .attendee_repo
        .find_by_event_and_user(event_id, user_id)
        .await?
        .is_some()
    {
        return Err(PlatformError::duplicate(
            "Attendee",
            "eventId,userId",
            format!("{},{}", event_id, user_id),
        ));
    }

    let attendee = state.attendee_repo.insert(event_id, user_id).await?;

    Ok((StatusCode::CREATED, Json(attendee.into())))
}

/// Remove a user from an event's roster
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}/attendees/{user_id}",
    tag = "attendees",
    params(
        ("id" = i64, Path, description = "Event ID"),
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "Attendee removed"),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Event or attendee not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_attendee(
    State(state): State<EventsState>,
    auth: Authenticated,
    WithRejection(Path((event_id, user_id)), _): WithRejection<Path<(i64, i64)>, PlatformError>,
) -> Result<StatusCode, PlatformError> {
    let event = state.load_event(event_id).await?;

    if let Err(e) = checks::can_remove_attendee(&auth.0, &event) {
        warn!(event_id, user_id = auth.0.user_id, "Remove attendee denied");
        return Err(e);
    }

    if !state.attendee_repo.delete(event_id, user_id).await? {
        return Err(PlatformError::not_found(
            "Attendee",
            format!("{},{}", event_id, user_id),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List users attending an event
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/attendees",
    tag = "attendees",
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Users attending the event", body = Vec<UserResponse>),
        (status = 404, description = "Event not found")
    )
)]
pub async fn list_event_attendees(
    State(state): State<EventsState>,
    WithRejection(Path(event_id), _): WithRejection<Path<i64>, PlatformError>,
) -> Result<Json<Vec<UserResponse>>, PlatformError> {
    state.load_event(event_id).await?;

    let users = state.attendee_repo.find_users_by_event(event_id).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// List events a user attends
#[utoipa::path(
    get,
    path = "/api/v1/attendees/{id}/events",
    tag = "attendees",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Events the user attends", body = Vec<EventResponse>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_attendee_events(
    State(state): State<EventsState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, PlatformError>,
) -> Result<Json<Vec<EventResponse>>, PlatformError> {
    state
        .user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", user_id))?;

    let events = state.attendee_repo.find_events_by_user(user_id).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// Roster routes, nested under `/events`
pub fn event_attendees_router(state: EventsState) -> Router {
    Router::new()
        .route("/:id/attendees", get(list_event_attendees))
        .route("/:id/attendees/:user_id", post(add_attendee).delete(remove_attendee))
        .with_state(state)
}

/// Reverse lookup routes, nested under `/attendees`
pub fn attendees_router(state: EventsState) -> Router {
    Router::new()
        .route("/:id/events", get(list_attendee_events))
        .with_state(state)
}
