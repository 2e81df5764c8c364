//! Broadcast hub for dashboard sessions
//!
//! Tracks connected sessions and their channel memberships and pushes
//! metric updates to them.
//!
//! ## Delivery paths
//! - Heartbeat: one shared payload per tick to every member of `"dashboard"`
//! - On demand: one fresh payload to the requesting session only
//! - Fan-out helpers for arbitrary events to everyone or to one channel
//!
//! All delivery is best-effort. Nothing is sent before a transport is wired
//! with [`BroadcastHub::initialize`].

pub mod metrics;
pub mod registry;
pub mod transport;

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::ingestion::CycleSink;
use crate::types::{
    HubStats, IngestionCycle, SessionId, UpdateFilter, UpdatePayload, DASHBOARD_CHANNEL,
    PERIODIC_UPDATE_TYPE,
};

pub use metrics::{FixedMetrics, MetricSource, RandomMetrics};
pub use registry::{Membership, SessionRegistry};
pub use transport::{
    OutboundMessage, Transport, INGESTION_CYCLE_EVENT, PERIODIC_UPDATE_EVENT, UPDATE_EVENT,
};

/// Session registry plus delivery paths
pub struct BroadcastHub {
    registry: Mutex<SessionRegistry>,
    transport: RwLock<Option<Arc<dyn Transport>>>,
    metrics: Box<dyn MetricSource>,
    heartbeat_interval: Duration,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl BroadcastHub {
    /// Hub with simulated metrics
    pub fn new(heartbeat_interval: Duration) -> Self {
        Self::with_metrics(heartbeat_interval, Box::new(RandomMetrics))
    }

    pub fn with_metrics(heartbeat_interval: Duration, metrics: Box<dyn MetricSource>) -> Self {
        Self {
            registry: Mutex::new(SessionRegistry::new()),
            transport: RwLock::new(None),
            metrics,
            heartbeat_interval,
            heartbeat: Mutex::new(None),
        }
    }

    /// Wire the transport and start the heartbeat
    pub fn initialize(self: &Arc<Self>, transport: Arc<dyn Transport>) {
        *self.transport.write() = Some(transport);
        info!(
            heartbeat_ms = self.heartbeat_interval.as_millis() as u64,
            "Broadcast hub initialized"
        );
        self.start_periodic_updates();
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.read().is_some()
    }

    fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport.read().clone()
    }

    // ========================================================================
    // Connection lifecycle
    // ========================================================================

    /// Register a newly connected session
    pub fn connect(&self, session_id: &str) {
        if self.registry.lock().connect(session_id) {
            info!(session_id, "Client connected");
        } else {
            warn!(session_id, "Duplicate connect for existing session");
        }
    }

    /// Forget a session and all of its memberships. Repeated calls are no-ops.
    pub fn disconnect(&self, session_id: &str) {
        match self.registry.lock().disconnect(session_id) {
            Some(channels) => info!(session_id, channels = channels.len(), "Client disconnected"),
            None => debug!(session_id, "Disconnect for unknown session ignored"),
        }
    }

    /// Add a session to a channel
    pub fn join(&self, session_id: &str, channel: &str) -> Membership {
        let result = self.registry.lock().join(session_id, channel);
        match result {
            Membership::Changed => info!(session_id, channel, "Client joined channel"),
            Membership::Unchanged => debug!(session_id, channel, "Client already in channel"),
            Membership::UnknownSession => {
                debug!(session_id, channel, "Join from unknown session ignored")
            }
        }
        result
    }

    /// Remove a session from a channel
    pub fn leave(&self, session_id: &str, channel: &str) -> Membership {
        let result = self.registry.lock().leave(session_id, channel);
        if result == Membership::Changed {
            info!(session_id, channel, "Client left channel");
        }
        result
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    /// Answer an update request with a fresh payload sent to the requester only.
    ///
    /// Returns the delivered payload, or `None` if nothing was sent.
    pub fn request_update(&self, session_id: &str, filter: &UpdateFilter) -> Option<UpdatePayload> {
        if !self.registry.lock().contains(session_id) {
            debug!(session_id, "Update request from unknown session ignored");
            return None;
        }
        let transport = self.transport()?;

        let payload = UpdatePayload::new(filter.resolved_type(), self.metrics.snapshot());
        let data = to_json(&payload)?;
        if transport.emit(session_id, OutboundMessage::new(UPDATE_EVENT, data)) {
            Some(payload)
        } else {
            debug!(session_id, "Update could not be delivered");
            None
        }
    }

    /// Build one heartbeat payload and send it to every `"dashboard"` member
    pub fn heartbeat_tick(&self) -> Option<UpdatePayload> {
        if !self.is_initialized() {
            return None;
        }
        let payload = UpdatePayload::new(PERIODIC_UPDATE_TYPE, self.metrics.heartbeat_snapshot());
        let data = to_json(&payload)?;
        let delivered = self.broadcast_to_room(DASHBOARD_CHANNEL, PERIODIC_UPDATE_EVENT, data);
        debug!(delivered, "Heartbeat sent");
        Some(payload)
    }

    /// Send an event to every connected session. Returns the delivery count.
    pub fn broadcast_to_all(&self, event: &str, data: Value) -> usize {
        let Some(transport) = self.transport() else {
            return 0;
        };
        let recipients = self.registry.lock().session_ids();
        deliver(transport.as_ref(), &recipients, event, &data)
    }

    /// Send an event to every member of `channel`. Returns the delivery count.
    pub fn broadcast_to_room(&self, channel: &str, event: &str, data: Value) -> usize {
        let Some(transport) = self.transport() else {
            return 0;
        };
        let recipients = self.registry.lock().members(channel);
        deliver(transport.as_ref(), &recipients, event, &data)
    }

    // ========================================================================
    // Heartbeat timer
    // ========================================================================

    /// Arm the heartbeat. The first tick fires one full period from now.
    ///
    /// Returns false if the heartbeat is already running.
    pub fn start_periodic_updates(self: &Arc<Self>) -> bool {
        let mut heartbeat = self.heartbeat.lock();
        if heartbeat.is_some() {
            warn!("Periodic updates already running");
            return false;
        }
        *heartbeat = Some(tokio::spawn(Self::run_heartbeat(
            Arc::downgrade(self),
            self.heartbeat_interval,
        )));
        true
    }

    pub fn stop_periodic_updates(&self) {
        if let Some(handle) = self.heartbeat.lock().take() {
            handle.abort();
            info!("Periodic updates stopped");
        }
    }

    async fn run_heartbeat(hub: Weak<Self>, period: Duration) {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match hub.upgrade() {
                Some(hub) => {
                    hub.heartbeat_tick();
                }
                None => break,
            }
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn stats(&self) -> HubStats {
        self.registry.lock().stats()
    }

    pub fn session_count(&self) -> usize {
        self.registry.lock().session_count()
    }

    pub fn is_connected(&self, session_id: &str) -> bool {
        self.registry.lock().contains(session_id)
    }

    pub fn members(&self, channel: &str) -> Vec<SessionId> {
        self.registry.lock().members(channel)
    }

    pub fn channels_of(&self, session_id: &str) -> Vec<String> {
        self.registry.lock().channels_of(session_id)
    }

    /// Both membership directions agree
    pub fn is_consistent(&self) -> bool {
        self.registry.lock().is_consistent()
    }
}

impl CycleSink for BroadcastHub {
    fn cycle_finished(&self, cycle: &IngestionCycle) {
        if let Some(data) = to_json(cycle) {
            self.broadcast_to_room(DASHBOARD_CHANNEL, INGESTION_CYCLE_EVENT, data);
        }
    }
}

impl Drop for BroadcastHub {
    fn drop(&mut self) {
        if let Some(handle) = self.heartbeat.get_mut().take() {
            handle.abort();
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(json) => Some(json),
        Err(e) => {
            error!(error = %e, "Failed to serialize outbound payload");
            None
        }
    }
}

fn deliver(transport: &dyn Transport, recipients: &[SessionId], event: &str, data: &Value) -> usize {
    recipients
        .iter()
        .filter(|id| transport.emit(id, OutboundMessage::new(event, data.clone())))
        .count()
}
