//! Persistence seam for the queue core.
//!
//! Backed by Postgres in production and an in-memory map in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::OptionalExtension;
use diesel_async::AsyncConnection;
use scoped_futures::ScopedFutureExt;

use crate::db::pool::DbPool;
use crate::db::schema::{events, queue_entries, tickets, users};
use crate::error::ApiError;
use crate::models::event::Event;
use crate::models::queue_entry::{QueueEntry, QueueEntryView};
use crate::models::ticket::Ticket;
use crate::models::user::UserSummary;
use crate::queue::reorder::PositionUpdate;

#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn find_event(&self, event_id: &str) -> Result<Option<Event>, ApiError>;

    /// Load an entry together with its owning event.
    async fn find_entry(&self, entry_id: &str) -> Result<Option<(QueueEntry, Event)>, ApiError>;

    /// All entries for an event, ascending by position, each with the
    /// ticket holder's profile resolved.
    async fn list_for_event(&self, event_id: &str) -> Result<Vec<QueueEntryView>, ApiError>;

    /// Persist an entry's status and derived timestamps, returning the
    /// stored entry with its user projection.
    async fn update_entry_status(&self, entry: &QueueEntry) -> Result<QueueEntryView, ApiError>;

    /// Persist a batch of position writes. All-or-nothing: a failure
    /// mid-batch must leave every position as it was.
    async fn apply_position_updates(&self, updates: &[PositionUpdate]) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// Postgres implementation
// ---------------------------------------------------------------------------

pub struct PgQueueStore {
    pool: DbPool,
}

impl PgQueueStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueStore for PgQueueStore {
    async fn find_event(&self, event_id: &str) -> Result<Option<Event>, ApiError> {
        let mut conn = self.pool.get().await?;

        let event = diesel_async::RunQueryDsl::get_result(
            events::table.find(event_id).select(Event::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(event)
    }

    async fn find_entry(&self, entry_id: &str) -> Result<Option<(QueueEntry, Event)>, ApiError> {
        let mut conn = self.pool.get().await?;

        let row = diesel_async::RunQueryDsl::get_result(
            queue_entries::table
                .inner_join(events::table)
                .filter(queue_entries::id.eq(entry_id))
                .select((QueueEntry::as_select(), Event::as_select())),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(row)
    }

    async fn list_for_event(&self, event_id: &str) -> Result<Vec<QueueEntryView>, ApiError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<(QueueEntry, UserSummary)> = diesel_async::RunQueryDsl::load(
            queue_entries::table
                .inner_join(tickets::table.inner_join(users::table))
                .filter(queue_entries::event_id.eq(event_id))
                .order(queue_entries::position.asc())
                .select((QueueEntry::as_select(), UserSummary::as_select())),
            &mut conn,
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|(entry, user)| QueueEntryView { entry, user })
            .collect())
    }

    async fn update_entry_status(&self, entry: &QueueEntry) -> Result<QueueEntryView, ApiError> {
        let mut conn = self.pool.get().await?;

        diesel_async::RunQueryDsl::execute(
            diesel::update(queue_entries::table.find(&entry.id)).set((
                queue_entries::status.eq(&entry.status),
                queue_entries::start_time.eq(entry.start_time),
                queue_entries::end_time.eq(entry.end_time),
            )),
            &mut conn,
        )
        .await?;

        let (entry, user): (QueueEntry, UserSummary) = diesel_async::RunQueryDsl::get_result(
            queue_entries::table
                .inner_join(tickets::table.inner_join(users::table))
                .filter(queue_entries::id.eq(&entry.id))
                .select((QueueEntry::as_select(), UserSummary::as_select())),
            &mut conn,
        )
        .await?;

        Ok(QueueEntryView { entry, user })
    }

    async fn apply_position_updates(&self, updates: &[PositionUpdate]) -> Result<(), ApiError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, ApiError, _>(|conn| {
            async move {
                for update in updates {
                    diesel_async::RunQueryDsl::execute(
                        diesel::update(queue_entries::table.find(&update.id))
                            .set(queue_entries::position.eq(update.position)),
                        conn,
                    )
                    .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation (for tests)
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    events: HashMap<String, Event>,
    tickets: HashMap<String, Ticket>,
    users: HashMap<String, UserSummary>,
    entries: HashMap<String, QueueEntry>,
}

#[derive(Default)]
pub struct MemoryQueueStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_event(&self, event: Event) {
        self.inner.lock().unwrap().events.insert(event.id.clone(), event);
    }

    pub fn insert_user(&self, user: UserSummary) {
        self.inner.lock().unwrap().users.insert(user.id.clone(), user);
    }

    pub fn insert_ticket(&self, ticket: Ticket) {
        self.inner.lock().unwrap().tickets.insert(ticket.id.clone(), ticket);
    }

    pub fn insert_entry(&self, entry: QueueEntry) {
        self.inner.lock().unwrap().entries.insert(entry.id.clone(), entry);
    }

    fn view(inner: &MemoryInner, entry: &QueueEntry) -> Result<QueueEntryView, ApiError> {
        let user = inner
            .tickets
            .get(&entry.ticket_id)
            .and_then(|t| inner.users.get(&t.user_id))
            .cloned()
            .ok_or_else(|| ApiError::internal("Ticket holder missing"))?;
        Ok(QueueEntryView {
            entry: entry.clone(),
            user,
        })
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn find_event(&self, event_id: &str) -> Result<Option<Event>, ApiError> {
        Ok(self.inner.lock().unwrap().events.get(event_id).cloned())
    }

    async fn find_entry(&self, entry_id: &str) -> Result<Option<(QueueEntry, Event)>, ApiError> {
        let inner = self.inner.lock().unwrap();
        let Some(entry) = inner.entries.get(entry_id) else {
            return Ok(None);
        };
        let event = inner
            .events
            .get(&entry.event_id)
            .cloned()
            .ok_or_else(|| ApiError::internal("Entry references missing event"))?;
        Ok(Some((entry.clone(), event)))
    }

    async fn list_for_event(&self, event_id: &str) -> Result<Vec<QueueEntryView>, ApiError> {
        let inner = self.inner.lock().unwrap();
        let mut views: Vec<QueueEntryView> = inner
            .entries
            .values()
            .filter(|e| e.event_id == event_id)
            .map(|e| Self::view(&inner, e))
            .collect::<Result<_, _>>()?;
        views.sort_by_key(|v| v.entry.position);
        Ok(views)
    }

    async fn update_entry_status(&self, entry: &QueueEntry) -> Result<QueueEntryView, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| ApiError::not_found("Queue entry not found"))?;
        stored.status = entry.status.clone();
        stored.start_time = entry.start_time;
        stored.end_time = entry.end_time;
        let stored = stored.clone();
        Self::view(&inner, &stored)
    }

    async fn apply_position_updates(&self, updates: &[PositionUpdate]) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        // Validate the whole batch before touching anything, so a bad id
        // cannot leave a partial write behind.
        for update in updates {
            if !inner.entries.contains_key(&update.id) {
                return Err(ApiError::not_found("Queue entry not found"));
            }
        }
        for update in updates {
            inner.entries.get_mut(&update.id).unwrap().position = update.position;
        }
        Ok(())
    }
}
