//! Error types for ingestion and configuration

use thiserror::Error;

/// Failure of a single ingestion sub-task.
///
/// A failed sub-task aborts the cycle it belongs to. It is logged and never
/// surfaced to callers of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The upstream source could not be reached
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The source answered with data that could not be used
    #[error("invalid data from {source_name}: {reason}")]
    InvalidData { source_name: String, reason: String },

    /// The sub-task did not settle within its time budget
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// Invalid process configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    ZeroInterval { var: &'static str },
}
