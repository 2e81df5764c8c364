//! Data types for the telemetry pipeline
//!
//! This module contains the value objects shared by the scheduler, the hub
//! and the HTTP layer.

mod cycle;
mod error;
mod payload;
mod status;

pub use cycle::{IngestionCycle, SubTaskOutcome, SubTaskResult};
pub use error::{ConfigError, IngestError};
pub use payload::{Metrics, UpdateFilter, UpdatePayload, DEFAULT_UPDATE_TYPE, PERIODIC_UPDATE_TYPE};
pub use status::{HubStats, IngestionStatus};

/// Result type for process-level operations
pub type PipelineResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Opaque session identifier assigned by the transport
pub type SessionId = String;

/// Name of a broadcast channel
pub type ChannelName = String;

/// Channel every dashboard viewer joins for heartbeats
pub const DASHBOARD_CHANNEL: &str = "dashboard";
