use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::users;

/// The administrative role. Admins pass every queue access check.
pub const ROLE_ADMIN: &str = "admin";

/// Denormalized read-only projection of a ticket holder, resolved via the
/// ticket at read time. Never stored on the queue entry itself.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = users)]
pub struct UserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image_url: Option<String>,
}
