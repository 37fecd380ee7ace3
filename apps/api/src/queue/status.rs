//! Queue entry status machine.
//!
//! The machine stamps timestamps keyed on the target status; it does not
//! forbid re-entering a state. In particular a transition into
//! `in_progress` always re-stamps `start_time`, even from a terminal
//! state. Staff use this to undo a mis-tap, so the permissive behavior is
//! kept deliberately.

use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::models::queue_entry::QueueEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Waiting,
    InProgress,
    Completed,
    NoShow,
}

impl QueueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QueueStatus::Waiting => "waiting",
            QueueStatus::InProgress => "in_progress",
            QueueStatus::Completed => "completed",
            QueueStatus::NoShow => "no_show",
        }
    }

    /// Parse a client-supplied status value.
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "waiting" => Ok(QueueStatus::Waiting),
            "in_progress" => Ok(QueueStatus::InProgress),
            "completed" => Ok(QueueStatus::Completed),
            "no_show" => Ok(QueueStatus::NoShow),
            other => Err(ApiError::invalid_status(format!(
                "Unknown queue status: {other}"
            ))),
        }
    }
}

/// Apply a status transition to an entry, stamping the derived timestamps.
///
/// - `in_progress` sets `start_time` to `now`
/// - `completed` and `no_show` set `end_time` to `now`
/// - `waiting` has no timestamp side effect
pub fn apply(entry: &mut QueueEntry, status: QueueStatus, now: DateTime<Utc>) {
    match status {
        QueueStatus::InProgress => entry.start_time = Some(now),
        QueueStatus::Completed | QueueStatus::NoShow => entry.end_time = Some(now),
        QueueStatus::Waiting => {}
    }
    entry.status = status.as_str().to_string();
}
