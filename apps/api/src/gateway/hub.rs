//! Broadcast hub: per-event subscriber groups and fan-out.
//!
//! Connections register once for a delivery channel, then join and leave
//! event groups as the client sends JOIN_EVENT / LEAVE_EVENT. A publish
//! for event X reaches exactly the connections currently in X's group.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::mpsc;

use super::events::GatewayMessage;

/// The shared broadcast hub. Store in AppState behind an `Arc`.
#[derive(Default)]
pub struct EventHub {
    /// Delivery channel per connection.
    connections: DashMap<String, mpsc::UnboundedSender<Arc<GatewayMessage>>>,
    /// Event id → ids of the connections subscribed to it.
    groups: DashMap<String, HashSet<String>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and hand back its delivery channel.
    pub fn register(&self, conn_id: &str) -> mpsc::UnboundedReceiver<Arc<GatewayMessage>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(conn_id.to_string(), tx);
        rx
    }

    /// Add a connection to an event's group. Idempotent.
    pub fn subscribe(&self, conn_id: &str, event_id: &str) {
        self.groups
            .entry(event_id.to_string())
            .or_default()
            .insert(conn_id.to_string());
    }

    /// Remove a connection from an event's group. No-op if absent.
    pub fn unsubscribe(&self, conn_id: &str, event_id: &str) {
        if let Some(mut group) = self.groups.get_mut(event_id) {
            group.remove(conn_id);
        }
        self.groups.remove_if(event_id, |_, group| group.is_empty());
    }

    /// Drop a connection's channel and remove it from every group.
    pub fn disconnect(&self, conn_id: &str) {
        self.connections.remove(conn_id);
        self.groups.retain(|_, group| {
            group.remove(conn_id);
            !group.is_empty()
        });
    }

    /// Deliver a dispatch to every connection subscribed to `event_id`.
    /// Connections subscribed to other events never see it.
    pub fn publish(&self, event_id: &str, event_name: &str, data: Value) {
        let Some(group) = self.groups.get(event_id) else {
            return;
        };
        let targets: Vec<String> = group.iter().cloned().collect();
        drop(group);

        let msg = Arc::new(GatewayMessage::dispatch(event_name, data));
        for conn_id in targets {
            if let Some(tx) = self.connections.get(&conn_id) {
                // A closed receiver means the connection is tearing down.
                let _ = tx.send(msg.clone());
            }
        }
    }

    /// Deliver a dispatch to every registered connection, subscribed or not.
    /// Used for event-lifecycle announcements.
    pub fn broadcast_all(&self, event_name: &str, data: Value) {
        let msg = Arc::new(GatewayMessage::dispatch(event_name, data));
        for entry in self.connections.iter() {
            let _ = entry.value().send(msg.clone());
        }
    }
}
