//! Queue orchestration: authorize, load, apply the engine or the status
//! machine, persist, then publish to the event's subscriber group.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;
use crate::gateway::events::EventName;
use crate::gateway::hub::EventHub;
use crate::models::queue_entry::{QueueEntry, QueueEntryView};
use crate::queue::access;
use crate::queue::reorder;
use crate::queue::status::{self, QueueStatus};
use crate::queue::store::QueueStore;

pub struct QueueService {
    store: Arc<dyn QueueStore>,
    hub: Arc<EventHub>,
    /// One mutex per event id. Read-modify-write cycles on one event's
    /// queue are serialized; different events proceed in parallel.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl QueueService {
    pub fn new(store: Arc<dyn QueueStore>, hub: Arc<EventHub>) -> Self {
        Self {
            store,
            hub,
            locks: DashMap::new(),
        }
    }

    fn event_lock(&self, event_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(event_id.to_string())
            .or_default()
            .clone()
    }

    /// Full ordered queue for an event, with user projections.
    pub async fn get_queue(
        &self,
        event_id: &str,
        caller: &AuthUser,
    ) -> Result<Vec<QueueEntryView>, ApiError> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Event not found"))?;

        if !access::can_manage(caller, &event) {
            return Err(ApiError::forbidden("Not authorized to view this queue"));
        }

        self.store.list_for_event(event_id).await
    }

    /// Apply a status transition to one entry and notify the event's group.
    pub async fn update_status(
        &self,
        entry_id: &str,
        status: &str,
        caller: &AuthUser,
    ) -> Result<QueueEntryView, ApiError> {
        let new_status = QueueStatus::parse(status)?;

        let (_, event) = self
            .store
            .find_entry(entry_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Queue entry not found"))?;

        if !access::can_manage(caller, &event) {
            return Err(ApiError::forbidden("Not authorized to update this queue"));
        }

        let lock = self.event_lock(&event.id);
        let _guard = lock.lock().await;

        // Re-read under the lock: a concurrent update to the same entry
        // must not have its timestamps overwritten from a stale copy.
        let (mut entry, _) = self
            .store
            .find_entry(entry_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Queue entry not found"))?;

        status::apply(&mut entry, new_status, Utc::now());
        let view = self.store.update_entry_status(&entry).await?;

        // Publish only after the write committed.
        self.hub.publish(
            &event.id,
            EventName::QUEUE_UPDATE,
            serde_json::to_value(&view).unwrap(),
        );

        Ok(view)
    }

    /// Move an entry to a new position (swap semantics) and push the full
    /// reordered snapshot to the event's group.
    pub async fn reorder(
        &self,
        entry_id: &str,
        target_position: i32,
        caller: &AuthUser,
    ) -> Result<Vec<QueueEntryView>, ApiError> {
        let (_, event) = self
            .store
            .find_entry(entry_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Queue entry not found"))?;

        if !access::can_manage(caller, &event) {
            return Err(ApiError::forbidden("Not authorized to reorder this queue"));
        }

        let lock = self.event_lock(&event.id);
        let _guard = lock.lock().await;

        let entries: Vec<QueueEntry> = self
            .store
            .list_for_event(&event.id)
            .await?
            .into_iter()
            .map(|v| v.entry)
            .collect();

        let updates = reorder::plan(&entries, entry_id, target_position)?;
        if !updates.is_empty() {
            self.store.apply_position_updates(&updates).await?;
        }

        let snapshot = self.store.list_for_event(&event.id).await?;

        self.hub.publish(
            &event.id,
            EventName::QUEUE_REORDER,
            serde_json::to_value(&snapshot).unwrap(),
        );

        Ok(snapshot)
    }
}
