//! Telemetry Broadcast Pipeline
//!
//! Real-time telemetry for a climate and infrastructure dashboard: a
//! recurring ingestion scheduler plus a channel-based broadcast hub that
//! pushes metric updates to connected WebSocket sessions.
//!
//! # Features
//!
//! - **Sequential ingestion**: sub-tasks run one after another, a failure
//!   ends only the current cycle
//! - **Single timer**: duplicate starts are ignored, overlapping ticks skipped
//! - **Channels**: sessions join named channels; heartbeats go to `dashboard`
//! - **Best-effort delivery**: fire-and-forget, at most once
//!
//! # Modules
//!
//! - `types`: Payloads, cycle records, status snapshots and errors
//! - `config`: Environment-driven configuration
//! - `ingestion`: Ingestion scheduler and sub-tasks
//! - `hub`: Session registry, heartbeat and delivery paths
//! - `api`: WebSocket transport and HTTP endpoints
//! - `utils`: Timestamp helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use telemetry_pipeline::{BroadcastHub, IngestionScheduler, WsTransport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let hub = Arc::new(BroadcastHub::new(Duration::from_secs(30)));
//!     hub.initialize(Arc::new(WsTransport::new()));
//!
//!     let scheduler = Arc::new(
//!         IngestionScheduler::new(Duration::from_secs(300)).with_sink(hub.clone()),
//!     );
//!     scheduler.initialize();
//! }
//! ```

pub mod api;
pub mod config;
pub mod hub;
pub mod ingestion;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use api::websocket::{AppState, WsTransport};
pub use config::PipelineConfig;
pub use hub::{BroadcastHub, MetricSource, OutboundMessage, Transport};
pub use ingestion::{CycleSink, IngestTask, IngestionScheduler};
pub use types::{
    HubStats, IngestError, IngestionCycle, IngestionStatus, Metrics, PipelineResult,
    SubTaskOutcome, UpdateFilter, UpdatePayload, DASHBOARD_CHANNEL,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
