//! API Layer
//!
//! REST API endpoints for the platform, mounted under `/api/v1`.

pub mod common;
pub mod middleware;

pub mod auth;
pub mod events;
pub mod attendees;
pub mod monitoring;
pub mod openapi;

pub use common::ApiError;
pub use middleware::{AppState, Authenticated};

pub use auth::{AuthState, auth_router};
pub use events::{EventsState, events_router};
pub use attendees::{attendees_router, event_attendees_router};
pub use monitoring::monitoring_router;
pub use openapi::PlatformApiDoc;

use axum::{Extension, Router};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::repository::{
    AttendeeRepository, EventRepository, SqliteAttendeeRepository, SqliteEventRepository,
    SqliteUserRepository, UserRepository,
};
use crate::service::{Argon2Config, AuthConfig, AuthService, PasswordService};

/// Services and stores shared by every handler
#[derive(Clone)]
pub struct PlatformServices {
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
    pub user_repo: Arc<dyn UserRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub attendee_repo: Arc<dyn AttendeeRepository>,
}

impl PlatformServices {
    /// Wire the SQLite stores, each bounded by `store_timeout` per call.
    pub fn sqlite(
        pool: SqlitePool,
        auth_config: AuthConfig,
        argon2: Argon2Config,
        store_timeout: Duration,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(auth_config)),
            password_service: Arc::new(PasswordService::new(argon2)),
            user_repo: Arc::new(SqliteUserRepository::new(pool.clone()).with_timeout(store_timeout)),
            event_repo: Arc::new(SqliteEventRepository::new(pool.clone()).with_timeout(store_timeout)),
            attendee_repo: Arc::new(SqliteAttendeeRepository::new(pool).with_timeout(store_timeout)),
        }
    }
}

/// Build the full application router: `/api/v1/*`, `/health` and Swagger UI.
pub fn platform_router(services: PlatformServices) -> Router {
    let app_state = AppState {
        auth_service: services.auth_service.clone(),
        user_repo: services.user_repo.clone(),
    };

    let auth_state = AuthState {
        auth_service: services.auth_service.clone(),
        password_service: services.password_service.clone(),
        user_repo: services.user_repo.clone(),
    };

    let events_state = EventsState {
        event_repo: services.event_repo,
        attendee_repo: services.attendee_repo,
        user_repo: services.user_repo,
    };

    Router::new()
        .nest("/api/v1/auth", auth_router(auth_state))
        .nest(
            "/api/v1/events",
            events_router(events_state.clone()).merge(event_attendees_router(events_state.clone())),
        )
        .nest("/api/v1/attendees", attendees_router(events_state))
        .merge(monitoring_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", PlatformApiDoc::openapi()))
        .layer(Extension(app_state))
}
