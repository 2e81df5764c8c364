//! Status snapshots for the operational endpoints

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheduler status as reported by `GET /api/ingestion/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionStatus {
    pub is_running: bool,
    /// Finish time of the last cycle that ran every sub-task
    pub last_ingestion: Option<DateTime<Utc>>,
    /// Next timer firing, `None` while stopped
    pub next_ingestion: Option<DateTime<Utc>>,
}

/// Hub occupancy as reported by `GET /api/hub/stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStats {
    pub sessions: usize,
    /// Member count per channel
    pub channels: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_status_serializes_nulls() {
        let status = IngestionStatus {
            is_running: false,
            last_ingestion: None,
            next_ingestion: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["isRunning"], false);
        assert!(json["lastIngestion"].is_null());
        assert!(json["nextIngestion"].is_null());
    }
}
