//! Live queue endpoints. All of them require a staff caller; the actual
//! authorization decision lives in the queue service.

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::queue_entry::QueueEntryView;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue/event/{event_id}", get(get_queue_by_event))
        .route("/queue/{id}/status", patch(update_queue_entry_status))
        .route("/queue/{id}/position", patch(reorder_queue_entry))
}

// ---------------------------------------------------------------------------
// GET /api/v1/queue/event/:event_id
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/queue/event/{event_id}",
    tag = "Queue",
    security(("bearer" = [])),
    params(
        ("event_id" = String, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Queue entries ordered by position", body = [QueueEntryView]),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Event not found", body = ApiErrorBody),
    ),
)]
pub async fn get_queue_by_event(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<QueueEntryView>>, ApiError> {
    let queue = state.queue.get_queue(&event_id, &caller).await?;
    Ok(Json(queue))
}

// ---------------------------------------------------------------------------
// PATCH /api/v1/queue/:id/status
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[utoipa::path(
    patch,
    path = "/api/v1/queue/{id}/status",
    tag = "Queue",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Queue entry ID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated queue entry", body = QueueEntryView),
        (status = 400, description = "Invalid status", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Queue entry not found", body = ApiErrorBody),
    ),
)]
pub async fn update_queue_entry_status(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<QueueEntryView>, ApiError> {
    let entry = state.queue.update_status(&id, &body.status, &caller).await?;
    Ok(Json(entry))
}

// ---------------------------------------------------------------------------
// PATCH /api/v1/queue/:id/position
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderRequest {
    pub position: i32,
}

#[utoipa::path(
    patch,
    path = "/api/v1/queue/{id}/position",
    tag = "Queue",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Queue entry ID"),
    ),
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Full reordered queue", body = [QueueEntryView]),
        (status = 400, description = "Position out of range", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Queue entry not found", body = ApiErrorBody),
    ),
)]
pub async fn reorder_queue_entry(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<Vec<QueueEntryView>>, ApiError> {
    let queue = state.queue.reorder(&id, body.position, &caller).await?;
    Ok(Json(queue))
}
