use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::tickets;

/// A ticket grants its holder a place in an event's queue. Issuance and
/// payment live in a separate service; this API only reads tickets to
/// resolve the holder's profile.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = tickets)]
pub struct Ticket {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}
