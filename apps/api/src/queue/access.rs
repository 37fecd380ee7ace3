//! Queue access gate.

use crate::auth::middleware::AuthUser;
use crate::models::event::Event;
use crate::models::user::ROLE_ADMIN;

/// Whether a caller may view or mutate an event's queue.
///
/// Exactly three identities qualify: administrators, the event's
/// organizer, and the event's artist. No other role or relationship
/// grants access.
pub fn can_manage(caller: &AuthUser, event: &Event) -> bool {
    caller.role == ROLE_ADMIN
        || caller.user_id == event.organizer_id
        || caller.user_id == event.artist_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(organizer_id: &str, artist_id: &str) -> Event {
        let now = Utc::now();
        Event {
            id: "evt_1".to_string(),
            title: "Meet & Greet".to_string(),
            description: "desc".to_string(),
            artist_id: artist_id.to_string(),
            organizer_id: organizer_id.to_string(),
            location: None,
            is_virtual: false,
            event_date: now,
            start_time: "18:00".to_string(),
            end_time: "21:00".to_string(),
            capacity: 100,
            status: "published".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn caller(id: &str, role: &str) -> AuthUser {
        AuthUser {
            user_id: id.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn admin_can_manage_any_event() {
        let ev = event("usr_org", "usr_art");
        assert!(can_manage(&caller("usr_other", "admin"), &ev));
    }

    #[test]
    fn organizer_can_manage_own_event() {
        let ev = event("usr_org", "usr_art");
        assert!(can_manage(&caller("usr_org", "manager"), &ev));
    }

    #[test]
    fn artist_can_manage_own_event() {
        let ev = event("usr_org", "usr_art");
        assert!(can_manage(&caller("usr_art", "artist"), &ev));
    }

    #[test]
    fn unrelated_caller_is_rejected_regardless_of_role() {
        let ev = event("usr_org", "usr_art");
        assert!(!can_manage(&caller("usr_other", "manager"), &ev));
        assert!(!can_manage(&caller("usr_other", "artist"), &ev));
        assert!(!can_manage(&caller("usr_other", "fan"), &ev));
    }
}
