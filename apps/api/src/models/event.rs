use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::events;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = events)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub artist_id: String,
    pub organizer_id: String,
    pub location: Option<String>,
    pub is_virtual: bool,
    pub event_date: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub artist_id: &'a str,
    pub organizer_id: &'a str,
    pub location: Option<&'a str>,
    pub is_virtual: bool,
    pub event_date: DateTime<Utc>,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub capacity: i32,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = events)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub is_virtual: Option<bool>,
    pub event_date: Option<DateTime<Utc>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
