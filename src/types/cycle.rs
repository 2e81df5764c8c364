//! Ingestion cycle records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one sub-task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SubTaskOutcome {
    Success,
    Failed(String),
}

impl SubTaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubTaskOutcome::Success)
    }
}

/// Result of one sub-task within a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTaskResult {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: SubTaskOutcome,
}

/// One run of the ingestion sub-tasks, in declaration order.
///
/// A cycle that hit a failure holds the failed result last; the sub-tasks
/// after it never ran and have no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionCycle {
    /// Sequence number, starting at 1 for the first cycle of the process
    pub cycle_id: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<SubTaskResult>,
}

impl IngestionCycle {
    /// True when every declared sub-task ran and succeeded
    pub fn is_complete(&self, declared_tasks: usize) -> bool {
        self.results.len() == declared_tasks && self.results.iter().all(|r| r.outcome.is_success())
    }

    /// The failing sub-task, if the cycle was aborted
    pub fn failure(&self) -> Option<&SubTaskResult> {
        self.results.iter().find(|r| !r.outcome.is_success())
    }

    /// Names of the sub-tasks that ran, in order
    pub fn task_names(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: SubTaskOutcome) -> SubTaskResult {
        let now = Utc::now();
        SubTaskResult {
            name: name.to_string(),
            started_at: now,
            finished_at: now,
            outcome,
        }
    }

    #[test]
    fn test_aborted_cycle_is_incomplete() {
        let now = Utc::now();
        let cycle = IngestionCycle {
            cycle_id: 1,
            started_at: now,
            finished_at: now,
            results: vec![
                result("weather", SubTaskOutcome::Success),
                result("infrastructure", SubTaskOutcome::Failed("boom".to_string())),
            ],
        };

        assert!(!cycle.is_complete(4));
        assert_eq!(cycle.failure().unwrap().name, "infrastructure");
        assert_eq!(cycle.task_names(), vec!["weather", "infrastructure"]);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(SubTaskOutcome::Failed("down".to_string())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "down");

        let json = serde_json::to_value(SubTaskOutcome::Success).unwrap();
        assert_eq!(json["status"], "success");
    }
}
