//! Outbound side of the connection transport

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name of the point-to-point reply to an update request
pub const UPDATE_EVENT: &str = "update";

/// Event name of the heartbeat broadcast
pub const PERIODIC_UPDATE_EVENT: &str = "periodic-update";

/// Event name announcing a finished ingestion cycle
pub const INGESTION_CYCLE_EVENT: &str = "ingestion-cycle";

/// One message addressed to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub event: String,
    pub data: Value,
}

impl OutboundMessage {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Delivers messages to individual sessions.
///
/// Delivery is best-effort and at-most-once: `emit` must not block and
/// returns false when the session can no longer be reached.
pub trait Transport: Send + Sync {
    fn emit(&self, session_id: &str, message: OutboundMessage) -> bool;
}
