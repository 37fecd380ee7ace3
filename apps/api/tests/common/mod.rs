#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;

use backstage_api::auth::middleware::AuthUser;
use backstage_api::auth::tokens;
use backstage_api::config::Config;
use backstage_api::gateway::hub::EventHub;
use backstage_api::models::event::Event;
use backstage_api::models::queue_entry::QueueEntry;
use backstage_api::models::ticket::Ticket;
use backstage_api::models::user::UserSummary;
use backstage_api::queue::service::QueueService;
use backstage_api::queue::store::{MemoryQueueStore, QueueStore};
use backstage_api::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-production";

/// Everything a test needs: the app state wired to an in-memory store,
/// plus direct handles for seeding and hub assertions.
pub struct TestHarness {
    pub state: AppState,
    pub store: Arc<MemoryQueueStore>,
    pub hub: Arc<EventHub>,
}

/// Build an AppState backed by the in-memory queue store. The database
/// pool is constructed lazily and never touched by the queue paths, so
/// these tests run without Postgres.
pub fn test_state() -> TestHarness {
    let config = Config {
        database_url: "postgres://localhost/backstage_test".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        port: 0,
    };

    let db = backstage_api::db::pool::connect(&config.database_url);
    let hub = Arc::new(EventHub::new());
    let store = Arc::new(MemoryQueueStore::new());
    let queue = Arc::new(QueueService::new(
        store.clone() as Arc<dyn QueueStore>,
        hub.clone(),
    ));

    let state = AppState {
        db,
        config: Arc::new(config),
        hub: hub.clone(),
        queue,
    };

    TestHarness { state, store, hub }
}

pub fn caller(id: &str, role: &str) -> AuthUser {
    AuthUser {
        user_id: id.to_string(),
        role: role.to_string(),
    }
}

/// Mint a bearer token the middleware will accept.
pub fn bearer_token(user_id: &str, role: &str) -> String {
    tokens::sign(user_id, role, TEST_JWT_SECRET).expect("mint test token")
}

pub fn make_event(id: &str, organizer_id: &str, artist_id: &str) -> Event {
    let now = Utc::now();
    Event {
        id: id.to_string(),
        title: "Acoustic Meet & Greet".to_string(),
        description: "Backstage session after the show".to_string(),
        artist_id: artist_id.to_string(),
        organizer_id: organizer_id.to_string(),
        location: Some("Green Room".to_string()),
        is_virtual: false,
        event_date: now,
        start_time: "18:00".to_string(),
        end_time: "21:00".to_string(),
        capacity: 50,
        status: "published".to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Seed one event with `n` waiting entries at positions `0..n`.
/// Entry ids are `q_<event_id>_<i>`, ticket holders `usr_holder_<i>`.
pub fn seed_queue(
    store: &MemoryQueueStore,
    event_id: &str,
    organizer_id: &str,
    artist_id: &str,
    n: usize,
) -> Vec<String> {
    store.insert_event(make_event(event_id, organizer_id, artist_id));

    let mut entry_ids = Vec::with_capacity(n);
    for i in 0..n {
        let user_id = format!("usr_holder_{i}");
        let ticket_id = format!("tkt_{event_id}_{i}");
        let entry_id = format!("q_{event_id}_{i}");

        store.insert_user(UserSummary {
            id: user_id.clone(),
            first_name: format!("Holder{i}"),
            last_name: "Fan".to_string(),
            profile_image_url: None,
        });
        store.insert_ticket(Ticket {
            id: ticket_id.clone(),
            event_id: event_id.to_string(),
            user_id,
            created_at: Utc::now(),
        });
        store.insert_entry(QueueEntry {
            id: entry_id.clone(),
            event_id: event_id.to_string(),
            ticket_id,
            position: i as i32,
            status: "waiting".to_string(),
            check_in_time: Utc::now(),
            start_time: None,
            end_time: None,
        });
        entry_ids.push(entry_id);
    }
    entry_ids
}
