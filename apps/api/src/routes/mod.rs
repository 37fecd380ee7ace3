pub mod events;
pub mod health;
pub mod queue;

use axum::Router;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest("/api/v1", events::router().merge(queue::router()))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Events
        events::list_events,
        events::get_event,
        events::create_event,
        events::update_event,
        events::delete_event,
        // Queue
        queue::get_queue_by_event,
        queue::update_queue_entry_status,
        queue::reorder_queue_entry,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Models
            crate::models::event::Event,
            crate::models::queue_entry::QueueEntry,
            crate::models::queue_entry::QueueEntryView,
            crate::models::ticket::Ticket,
            crate::models::user::UserSummary,
            // Route request/response types
            health::HealthResponse,
            events::CreateEventRequest,
            events::UpdateEventRequest,
            queue::UpdateStatusRequest,
            queue::ReorderRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Events", description = "Event management"),
        (name = "Queue", description = "Live queue management"),
    )
)]
pub struct ApiDoc;
