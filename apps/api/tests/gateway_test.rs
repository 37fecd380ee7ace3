mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::time;
use tokio_tungstenite::tungstenite;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Start an actual TCP server for WebSocket testing. Returns (addr, harness).
/// The server runs in the background.
async fn start_ws_server() -> (SocketAddr, common::TestHarness) {
    let h = common::test_state();
    let app = backstage_api::routes::router().with_state(h.state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, h)
}

async fn connect(addr: SocketAddr) -> WsStream {
    let url = format!("ws://{addr}/gateway");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws_stream
}

async fn send_json(ws: &mut WsStream, value: serde_json::Value) {
    ws.send(tungstenite::Message::Text(value.to_string().into()))
        .await
        .expect("ws send");
}

async fn read_json(ws: &mut WsStream) -> serde_json::Value {
    let msg = time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timeout waiting for ws message")
        .expect("stream ended")
        .expect("ws read error");
    let text = msg.into_text().expect("not text");
    serde_json::from_str(&text).expect("parse ws message")
}

/// Join an event group and wait for a heartbeat ack, which proves the
/// JOIN_EVENT before it was processed.
async fn join_event(ws: &mut WsStream, event_id: &str) {
    send_json(ws, serde_json::json!({ "op": 4, "d": { "event_id": event_id } })).await;
    send_json(ws, serde_json::json!({ "op": 1, "d": { "seq": 1 } })).await;
    let ack = read_json(ws).await;
    assert_eq!(ack["op"], 6);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn heartbeat_returns_ack() {
    let (addr, _h) = start_ws_server().await;
    let mut ws = connect(addr).await;

    send_json(&mut ws, serde_json::json!({ "op": 1, "d": { "seq": 42 } })).await;

    let ack = read_json(&mut ws).await;
    assert_eq!(ack["op"], 6);
    assert_eq!(ack["d"]["ack"], 42);
}

#[tokio::test]
async fn joined_connection_receives_queue_dispatches() {
    let (addr, h) = start_ws_server().await;
    let mut ws = connect(addr).await;
    join_event(&mut ws, "evt_1").await;

    h.hub.publish(
        "evt_1",
        "QUEUE_UPDATE",
        serde_json::json!({ "id": "q_1", "status": "in_progress" }),
    );

    let dispatch = read_json(&mut ws).await;
    assert_eq!(dispatch["op"], 0);
    assert_eq!(dispatch["t"], "QUEUE_UPDATE");
    assert_eq!(dispatch["d"]["id"], "q_1");
}

#[tokio::test]
async fn dispatches_are_scoped_to_the_joined_event() {
    let (addr, h) = start_ws_server().await;
    let mut ws = connect(addr).await;
    join_event(&mut ws, "evt_1").await;

    // Traffic for another event, then for ours: the first frame we read
    // must be ours.
    h.hub.publish("evt_2", "QUEUE_REORDER", serde_json::json!([]));
    h.hub.publish("evt_1", "QUEUE_UPDATE", serde_json::json!({ "id": "q_9" }));

    let dispatch = read_json(&mut ws).await;
    assert_eq!(dispatch["t"], "QUEUE_UPDATE");
    assert_eq!(dispatch["d"]["id"], "q_9");
}

#[tokio::test]
async fn leaving_an_event_stops_delivery() {
    let (addr, h) = start_ws_server().await;
    let mut ws = connect(addr).await;
    join_event(&mut ws, "evt_1").await;

    send_json(&mut ws, serde_json::json!({ "op": 5, "d": { "event_id": "evt_1" } })).await;
    // Heartbeat ack as a sequencing barrier for the LEAVE_EVENT.
    send_json(&mut ws, serde_json::json!({ "op": 1, "d": { "seq": 2 } })).await;
    let ack = read_json(&mut ws).await;
    assert_eq!(ack["op"], 6);

    h.hub.publish("evt_1", "QUEUE_UPDATE", serde_json::json!({ "id": "q_1" }));

    let nothing = time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(nothing.is_err(), "no dispatch after LEAVE_EVENT");
}

#[tokio::test]
async fn event_lifecycle_broadcasts_reach_unjoined_connections() {
    let (addr, h) = start_ws_server().await;
    let mut ws = connect(addr).await;

    // Heartbeat round trip to be sure the connection is registered.
    send_json(&mut ws, serde_json::json!({ "op": 1, "d": { "seq": 1 } })).await;
    let ack = read_json(&mut ws).await;
    assert_eq!(ack["op"], 6);

    h.hub
        .broadcast_all("EVENT_CREATE", serde_json::json!({ "id": "evt_new" }));

    let dispatch = read_json(&mut ws).await;
    assert_eq!(dispatch["t"], "EVENT_CREATE");
    assert_eq!(dispatch["d"]["id"], "evt_new");
}

#[tokio::test]
async fn unknown_opcode_closes_the_connection() {
    let (addr, _h) = start_ws_server().await;
    let mut ws = connect(addr).await;

    send_json(&mut ws, serde_json::json!({ "op": 99, "d": {} })).await;

    let msg = time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timeout")
        .expect("stream ended")
        .expect("read error");

    match msg {
        tungstenite::Message::Close(Some(frame)) => {
            assert_eq!(
                frame.code,
                tungstenite::protocol::frame::coding::CloseCode::from(4001)
            );
        }
        tungstenite::Message::Close(None) => {
            // Also acceptable.
        }
        other => panic!("Expected Close frame, got: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_json_closes_the_connection() {
    let (addr, _h) = start_ws_server().await;
    let mut ws = connect(addr).await;

    ws.send(tungstenite::Message::Text("{not json".to_string().into()))
        .await
        .expect("ws send");

    let msg = time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timeout")
        .expect("stream ended")
        .expect("read error");

    match msg {
        tungstenite::Message::Close(Some(frame)) => {
            assert_eq!(
                frame.code,
                tungstenite::protocol::frame::coding::CloseCode::from(4000)
            );
        }
        tungstenite::Message::Close(None) => {}
        other => panic!("Expected Close frame, got: {other:?}"),
    }
}
