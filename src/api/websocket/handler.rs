//! WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use super::events::{connected_message, error_message, pong_message, ClientMessage};
use super::state::AppState;
use crate::hub::{BroadcastHub, Transport};
use crate::types::DASHBOARD_CHANNEL;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = state.transport.generate_session_id();
    let mut outbox = state.transport.attach(&session_id);
    state.hub.connect(&session_id);
    state.transport.emit(&session_id, connected_message(&session_id));

    let (mut sender, mut receiver) = socket.split();

    // Writer: drain this session's queue into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Dropping unserializable frame");
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break; // Client disconnected
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut send_task => break,

            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    dispatch(&state.hub, state.transport.as_ref(), &session_id, &text);
                }
                Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => {} // Binary and control frames
                Some(Err(e)) => {
                    debug!(session_id = %session_id, error = %e, "WebSocket error");
                    break;
                }
                None => break,
            },
        }
    }

    state.hub.disconnect(&session_id);
    state.transport.detach(&session_id);
    send_task.abort();
}

/// Apply one client text frame to the hub
pub fn dispatch(hub: &BroadcastHub, transport: &dyn Transport, session_id: &str, text: &str) {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!(session_id, error = %e, "Unparseable client frame");
            transport.emit(session_id, error_message("invalid_message", e.to_string()));
            return;
        }
    };

    match msg {
        ClientMessage::JoinDashboard => {
            hub.join(session_id, DASHBOARD_CHANNEL);
        }
        ClientMessage::Join { channel } => {
            hub.join(session_id, &channel);
        }
        ClientMessage::Leave { channel } => {
            hub.leave(session_id, &channel);
        }
        ClientMessage::RequestUpdate { filter } => {
            hub.request_update(session_id, &filter);
        }
        ClientMessage::Ping => {
            transport.emit(session_id, pong_message());
        }
    }
}
