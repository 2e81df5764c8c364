//! Shared application state for HTTP and WebSocket handlers

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::transport::WsTransport;
use crate::config::PipelineConfig;
use crate::hub::BroadcastHub;
use crate::ingestion::IngestionScheduler;

pub struct AppState {
    pub config: PipelineConfig,
    pub hub: Arc<BroadcastHub>,
    pub scheduler: Arc<IngestionScheduler>,
    /// Outbound queues of the live sockets; wired into `hub`
    pub transport: Arc<WsTransport>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: PipelineConfig,
        hub: Arc<BroadcastHub>,
        scheduler: Arc<IngestionScheduler>,
        transport: Arc<WsTransport>,
    ) -> Self {
        Self {
            config,
            hub,
            scheduler,
            transport,
            started_at: Utc::now(),
        }
    }
}
