//! OpenAPI Documentation
//!
//! Central OpenAPI document for all platform APIs.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Platform API OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EventHub Platform API",
        version = "1.0.0",
        description = "REST APIs for users, events and attendee rosters"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Registration and authentication"),
        (name = "events", description = "Event management"),
        (name = "attendees", description = "Event rosters"),
        (name = "monitoring", description = "Health and monitoring")
    ),
    paths(
        // Auth API
        super::auth::register,
        super::auth::login,
        super::auth::get_current_user,
        // Events API
        super::events::create_event,
        super::events::get_event,
        super::events::list_events,
        super::events::update_event,
        super::events::delete_event,
        // Attendees API
        super::attendees::add_attendee,
        super::attendees::remove_attendee,
        super::attendees::list_event_attendees,
        super::attendees::list_attendee_events,
        // Monitoring API
        super::monitoring::health,
    ),
    components(
        schemas(
            super::auth::RegisterRequest,
            super::auth::LoginRequest,
            super::auth::LoginResponse,
            super::auth::UserResponse,
            super::events::EventRequest,
            super::events::EventResponse,
            super::attendees::AttendeeResponse,
            super::monitoring::HealthResponse,
            super::common::ApiError,
        )
    ),
    modifiers(&BearerAuthAddon)
)]
pub struct PlatformApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuthAddon;

impl Modify for BearerAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_routes() {
        let doc = PlatformApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("/api/v1/auth/register"));
        assert!(json.contains("/api/v1/events/{id}/attendees/{user_id}"));
        assert!(json.contains("bearer_auth"));
    }
}
