//! Per-session outbound queues backing the hub's transport

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;

use crate::hub::{OutboundMessage, Transport};
use crate::types::SessionId;

/// Messages buffered per session before new ones are dropped
pub const DEFAULT_OUTBOX_CAPACITY: usize = 1024;

/// Transport that hands messages to each socket's writer task.
///
/// Each session gets a bounded queue. When a socket falls behind and its
/// queue is full, further messages for it are dropped.
pub struct WsTransport {
    outboxes: RwLock<HashMap<SessionId, mpsc::Sender<OutboundMessage>>>,
    capacity: usize,
    id_counter: AtomicU64,
}

impl WsTransport {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_OUTBOX_CAPACITY)
    }

    /// Transport buffering at most `capacity` messages per session
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outboxes: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            id_counter: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Generate a new, process-unique session ID
    pub fn generate_session_id(&self) -> SessionId {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seq = self.id_counter.fetch_add(1, Ordering::Relaxed);
        format!("sess_{:x}_{:x}", nanos, seq)
    }

    /// Open the outbound queue for a session
    pub fn attach(&self, session_id: &str) -> mpsc::Receiver<OutboundMessage> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.outboxes.write().insert(session_id.to_string(), tx);
        rx
    }

    /// Close the outbound queue for a session
    pub fn detach(&self, session_id: &str) {
        self.outboxes.write().remove(session_id);
    }

    pub fn attached_count(&self) -> usize {
        self.outboxes.read().len()
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WsTransport {
    fn emit(&self, session_id: &str, message: OutboundMessage) -> bool {
        let outboxes = self.outboxes.read();
        let Some(tx) = outboxes.get(session_id) else {
            return false;
        };
        match tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(msg)) => {
                debug!(session_id, event = %msg.event, "Outbox full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}
