//! Event CRUD endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::OptionalExtension;
use diesel_async::AsyncConnection;
use scoped_futures::ScopedFutureExt;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::db::schema::{events, queue_entries, tickets};
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::gateway::events::EventName;
use crate::models::event::{Event, NewEvent, UpdateEvent};
use crate::models::user::ROLE_ADMIN;
use crate::queue::access;
use crate::AppState;

/// Roles allowed to create events.
const CREATOR_ROLES: [&str; 3] = [ROLE_ADMIN, "manager", "artist"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
}

// ---------------------------------------------------------------------------
// GET /api/v1/events
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    responses(
        (status = 200, description = "All events, soonest first", body = [Event]),
    ),
)]
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let mut conn = state.db.get().await?;

    let list: Vec<Event> = diesel_async::RunQueryDsl::load(
        events::table
            .order(events::event_date.asc())
            .select(Event::as_select()),
        &mut conn,
    )
    .await?;

    Ok(Json(list))
}

// ---------------------------------------------------------------------------
// GET /api/v1/events/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    params(
        ("id" = String, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Event detail", body = Event),
        (status = 404, description = "Event not found", body = ApiErrorBody),
    ),
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let mut conn = state.db.get().await?;

    let event: Event = diesel_async::RunQueryDsl::get_result(
        events::table.find(&id).select(Event::as_select()),
        &mut conn,
    )
    .await
    .optional()?
    .ok_or_else(|| ApiError::not_found("Event not found"))?;

    Ok(Json(event))
}

// ---------------------------------------------------------------------------
// POST /api/v1/events
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub artist_id: String,
    pub location: Option<String>,
    pub is_virtual: Option<bool>,
    pub event_date: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i32,
    pub status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    security(("bearer" = [])),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Validation failed", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
    ),
)]
pub async fn create_event(
    caller: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    if !CREATOR_ROLES.contains(&caller.role.as_str()) {
        return Err(ApiError::forbidden(
            "You do not have permission to create events",
        ));
    }

    // Validate.
    let title = body.title.trim().to_string();
    let description = body.description.trim().to_string();
    let mut errors = Vec::new();
    if title.is_empty() {
        errors.push(FieldError {
            field: "title".to_string(),
            message: "Event title is required".to_string(),
        });
    }
    if description.is_empty() {
        errors.push(FieldError {
            field: "description".to_string(),
            message: "Event description is required".to_string(),
        });
    }
    if body.capacity <= 0 {
        errors.push(FieldError {
            field: "capacity".to_string(),
            message: "Capacity must be a positive number".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let now = Utc::now();
    let event_id = backstage_common::id::prefixed_ulid(backstage_common::id::prefix::EVENT);

    let mut conn = state.db.get().await?;

    let event: Event = diesel_async::RunQueryDsl::get_result(
        diesel::insert_into(events::table)
            .values(NewEvent {
                id: &event_id,
                title: &title,
                description: &description,
                artist_id: &body.artist_id,
                organizer_id: &caller.user_id,
                location: body.location.as_deref(),
                is_virtual: body.is_virtual.unwrap_or(false),
                event_date: body.event_date,
                start_time: &body.start_time,
                end_time: &body.end_time,
                capacity: body.capacity,
                status: body.status.as_deref().unwrap_or("draft"),
                created_at: now,
                updated_at: now,
            })
            .returning(Event::as_returning()),
        &mut conn,
    )
    .await?;

    state
        .hub
        .broadcast_all(EventName::EVENT_CREATE, serde_json::to_value(&event).unwrap());

    Ok((StatusCode::CREATED, Json(event)))
}

// ---------------------------------------------------------------------------
// PATCH /api/v1/events/:id
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub is_virtual: Option<bool>,
    pub event_date: Option<DateTime<Utc>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}",
    tag = "Events",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Event ID"),
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Event not found", body = ApiErrorBody),
    ),
)]
pub async fn update_event(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let mut conn = state.db.get().await?;

    let event: Event = diesel_async::RunQueryDsl::get_result(
        events::table.find(&id).select(Event::as_select()),
        &mut conn,
    )
    .await
    .optional()?
    .ok_or_else(|| ApiError::not_found("Event not found"))?;

    // Same gate as the queue: admin, organizer, or the event's artist.
    if !access::can_manage(&caller, &event) {
        return Err(ApiError::forbidden("Not authorized to update this event"));
    }

    let changeset = UpdateEvent {
        title: body.title,
        description: body.description,
        location: body.location,
        is_virtual: body.is_virtual,
        event_date: body.event_date,
        start_time: body.start_time,
        end_time: body.end_time,
        capacity: body.capacity,
        status: body.status,
        updated_at: Some(Utc::now()),
    };

    let updated: Event = diesel_async::RunQueryDsl::get_result(
        diesel::update(events::table.find(&id))
            .set(&changeset)
            .returning(Event::as_returning()),
        &mut conn,
    )
    .await?;

    state.hub.publish(
        &updated.id,
        EventName::EVENT_UPDATE,
        serde_json::to_value(&updated).unwrap(),
    );

    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// DELETE /api/v1/events/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Event removed"),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Event not found", body = ApiErrorBody),
    ),
)]
pub async fn delete_event(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.db.get().await?;

    let event: Event = diesel_async::RunQueryDsl::get_result(
        events::table.find(&id).select(Event::as_select()),
        &mut conn,
    )
    .await
    .optional()?
    .ok_or_else(|| ApiError::not_found("Event not found"))?;

    // Deleting is narrower than managing: the artist cannot remove an
    // event they don't organize.
    if caller.role != ROLE_ADMIN && caller.user_id != event.organizer_id {
        return Err(ApiError::forbidden("Not authorized to delete this event"));
    }

    // Queue entries and tickets go with the event, atomically.
    conn.transaction::<_, ApiError, _>(|conn| {
        async move {
            diesel_async::RunQueryDsl::execute(
                diesel::delete(queue_entries::table.filter(queue_entries::event_id.eq(&id))),
                conn,
            )
            .await?;
            diesel_async::RunQueryDsl::execute(
                diesel::delete(tickets::table.filter(tickets::event_id.eq(&id))),
                conn,
            )
            .await?;
            diesel_async::RunQueryDsl::execute(
                diesel::delete(events::table.find(&id)),
                conn,
            )
            .await?;
            Ok(())
        }
        .scope_boxed()
    })
    .await?;

    state.hub.broadcast_all(
        EventName::EVENT_DELETE,
        serde_json::json!({ "id": event.id }),
    );

    Ok(Json(serde_json::json!({ "message": "Event removed" })))
}
