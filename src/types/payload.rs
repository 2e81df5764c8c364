//! Update payloads pushed to dashboard sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type tag used when a request does not name one
pub const DEFAULT_UPDATE_TYPE: &str = "general";

/// Type tag of heartbeat payloads
pub const PERIODIC_UPDATE_TYPE: &str = "periodic";

/// Snapshot of dashboard metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Overall health score, 0..=100
    pub system_health: u8,
    pub active_incidents: u32,
    /// Energy demand as a percentage of capacity, 0..=100
    pub energy_demand: u8,
    /// Only present on heartbeat payloads
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weather_alerts: Option<u32>,
}

/// One update delivered to a session or a channel.
///
/// Built fresh for every delivery and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub update_type: String,
    #[serde(rename = "data")]
    pub metrics: Metrics,
}

impl UpdatePayload {
    /// Create a payload stamped with the current time
    pub fn new(update_type: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            timestamp: Utc::now(),
            update_type: update_type.into(),
            metrics,
        }
    }
}

/// Filter attached to an on-demand update request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub update_type: Option<String>,
}

impl UpdateFilter {
    /// Filter asking for a specific update type
    pub fn of_type(update_type: impl Into<String>) -> Self {
        Self {
            update_type: Some(update_type.into()),
        }
    }

    /// Requested type, or `"general"` when none was given
    pub fn resolved_type(&self) -> &str {
        self.update_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_UPDATE_TYPE)
    }
}
