use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::queue_entries;
use crate::models::user::UserSummary;

/// One ticket holder's place in an event's live queue.
///
/// Positions of the entries belonging to one event always form a
/// permutation of `{0, .., n-1}` between operations.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = queue_entries)]
pub struct QueueEntry {
    pub id: String,
    pub event_id: String,
    pub ticket_id: String,
    pub position: i32,
    pub status: String,
    pub check_in_time: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// A queue entry together with the ticket holder's profile, the shape
/// returned to clients and broadcast over the gateway.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueueEntryView {
    #[serde(flatten)]
    pub entry: QueueEntry,
    pub user: UserSummary,
}
