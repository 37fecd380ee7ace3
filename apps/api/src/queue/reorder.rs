//! Position reordering engine.
//!
//! Moving an entry to an occupied position swaps the two entries; it does
//! not shift everything in between. The engine is a pure function over the
//! event's ordered entry set and returns only the rows whose position
//! actually changes, so the caller can persist them in one transaction.

use crate::error::{ApiError, FieldError};
use crate::models::queue_entry::QueueEntry;

/// A single position write produced by [`plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
    pub id: String,
    pub position: i32,
}

/// Compute the position writes that move `target_id` to `target_position`.
///
/// `entries` is the full entry set for one event. Positions outside
/// `[0, n-1]` are rejected up front; accepting them would leave the
/// event's positions with a duplicate or a gap.
pub fn plan(
    entries: &[QueueEntry],
    target_id: &str,
    target_position: i32,
) -> Result<Vec<PositionUpdate>, ApiError> {
    let target = entries
        .iter()
        .find(|e| e.id == target_id)
        .ok_or_else(|| ApiError::not_found("Queue entry not found"))?;

    if target_position < 0 || target_position as usize >= entries.len() {
        return Err(ApiError::validation(vec![FieldError {
            field: "position".to_string(),
            message: format!(
                "position must be between 0 and {}",
                entries.len().saturating_sub(1)
            ),
        }]));
    }

    if target.position == target_position {
        return Ok(Vec::new());
    }

    let mut updates = Vec::with_capacity(2);

    // The displaced entry, if any, takes the target's old slot.
    if let Some(occupant) = entries
        .iter()
        .find(|e| e.position == target_position && e.id != target_id)
    {
        updates.push(PositionUpdate {
            id: occupant.id.clone(),
            position: target.position,
        });
    }

    updates.push(PositionUpdate {
        id: target.id.clone(),
        position: target_position,
    });

    Ok(updates)
}
