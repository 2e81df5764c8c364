//! WebSocket frame types

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::hub::OutboundMessage;
use crate::types::UpdateFilter;

/// Sent once right after the upgrade
pub const CONNECTED_EVENT: &str = "connected";

/// Reply to a client ping
pub const PONG_EVENT: &str = "pong";

/// Reported for frames the server could not understand
pub const ERROR_EVENT: &str = "error";

/// Frames a client may send
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Shortcut for joining the dashboard channel
    JoinDashboard,

    /// Join a named channel
    Join { channel: String },

    /// Leave a named channel
    Leave { channel: String },

    /// Ask for one update addressed to this session only
    RequestUpdate {
        #[serde(default)]
        filter: UpdateFilter,
    },

    /// Application-level heartbeat
    Ping,
}

/// Welcome frame carrying the assigned session id
pub fn connected_message(session_id: &str) -> OutboundMessage {
    OutboundMessage::new(CONNECTED_EVENT, json!({ "sessionId": session_id }))
}

pub fn pong_message() -> OutboundMessage {
    OutboundMessage::new(PONG_EVENT, json!({ "timestamp": crate::utils::now_iso8601() }))
}

pub fn error_message(code: &str, message: impl Into<String>) -> OutboundMessage {
    OutboundMessage::new(ERROR_EVENT, json!({ "code": code, "message": message.into() }))
}
