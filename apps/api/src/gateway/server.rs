//! WebSocket upgrade handler and per-connection event loop.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::time;

use crate::AppState;

use super::events::{
    ClientMessage, GatewayMessage, HeartbeatPayload, SubscribePayload, OP_HEARTBEAT, OP_JOIN_EVENT,
    OP_LEAVE_EVENT,
};

/// Close codes (4000-range for application-level).
const CLOSE_UNKNOWN_ERROR: u16 = 4000;
const CLOSE_UNKNOWN_OPCODE: u16 = 4001;
const CLOSE_SESSION_TIMEOUT: u16 = 4009;

/// Heartbeat interval expected from clients (ms).
pub const HEARTBEAT_INTERVAL_MS: u64 = 41250;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Main connection loop: track group membership, forward hub dispatches,
/// enforce the heartbeat deadline. Whatever way the loop exits, the
/// connection is removed from every group it joined.
async fn handle_connection(socket: WebSocket, state: AppState) {
    let conn_id = backstage_common::id::prefixed_ulid(backstage_common::id::prefix::GATEWAY);
    let mut hub_rx = state.hub.register(&conn_id);

    tracing::info!(%conn_id, "gateway connection established");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Heartbeat deadline: client must heartbeat within 1.5× the interval.
    let heartbeat_deadline = Duration::from_millis(HEARTBEAT_INTERVAL_MS * 3 / 2);
    let mut heartbeat_timer = time::interval(heartbeat_deadline);
    heartbeat_timer.tick().await; // First tick fires immediately; skip it.
    let mut got_heartbeat = true;

    loop {
        tokio::select! {
            // Client sends us a message.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let client_msg: ClientMessage = match serde_json::from_str(&text) {
                            Ok(m) => m,
                            Err(_) => {
                                let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_ERROR, "Invalid JSON").await;
                                break;
                            }
                        };

                        match client_msg.op {
                            OP_HEARTBEAT => {
                                got_heartbeat = true;
                                let payload: HeartbeatPayload =
                                    serde_json::from_value(client_msg.d).unwrap_or(HeartbeatPayload { seq: 0 });
                                let ack = GatewayMessage::heartbeat_ack(payload.seq);
                                let json = serde_json::to_string(&ack).unwrap();
                                if ws_tx.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            OP_JOIN_EVENT => {
                                let Ok(payload) = serde_json::from_value::<SubscribePayload>(client_msg.d) else {
                                    let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_ERROR, "Invalid JOIN_EVENT payload").await;
                                    break;
                                };
                                state.hub.subscribe(&conn_id, &payload.event_id);
                                tracing::info!(%conn_id, event_id = %payload.event_id, "joined event group");
                            }
                            OP_LEAVE_EVENT => {
                                let Ok(payload) = serde_json::from_value::<SubscribePayload>(client_msg.d) else {
                                    let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_ERROR, "Invalid LEAVE_EVENT payload").await;
                                    break;
                                };
                                state.hub.unsubscribe(&conn_id, &payload.event_id);
                                tracing::info!(%conn_id, event_id = %payload.event_id, "left event group");
                            }
                            _ => {
                                let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_OPCODE, "Unknown opcode").await;
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, %conn_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Dispatch from the broadcast hub.
            dispatch = hub_rx.recv() => {
                match dispatch {
                    Some(msg) => {
                        let json = serde_json::to_string(&*msg).unwrap();
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    // Hub dropped our sender — connection was torn down elsewhere.
                    None => break,
                }
            }

            // Heartbeat timeout check.
            _ = heartbeat_timer.tick() => {
                if !got_heartbeat {
                    tracing::debug!(%conn_id, "heartbeat timeout — closing connection");
                    let _ = send_close(&mut ws_tx, CLOSE_SESSION_TIMEOUT, "Heartbeat timeout").await;
                    break;
                }
                got_heartbeat = false;
            }
        }
    }

    state.hub.disconnect(&conn_id);
    tracing::info!(%conn_id, "gateway connection closed");
}

/// Send a WebSocket close frame with a code and reason.
async fn send_close(
    ws_tx: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    code: u16,
    reason: &str,
) -> Result<(), axum::Error> {
    let close_msg = Message::Close(Some(axum::extract::ws::CloseFrame {
        code,
        reason: reason.to_string().into(),
    }));
    ws_tx.send(close_msg).await
}
