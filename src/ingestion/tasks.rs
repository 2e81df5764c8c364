//! Ingestion sub-tasks

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::types::IngestError;

/// One named unit of ingestion work within a cycle
#[async_trait]
pub trait IngestTask: Send + Sync {
    /// Name used in cycle records and logs
    fn name(&self) -> &str;

    /// Run the sub-task to completion
    async fn ingest(&self) -> Result<(), IngestError>;
}

/// Sub-task that simulates fetching a dataset by sleeping for a fixed time
#[derive(Debug, Clone)]
pub struct SimulatedIngest {
    name: String,
    latency: Duration,
}

impl SimulatedIngest {
    pub fn new(name: impl Into<String>, latency: Duration) -> Self {
        Self {
            name: name.into(),
            latency,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl IngestTask for SimulatedIngest {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ingest(&self) -> Result<(), IngestError> {
        info!(task = %self.name, "Ingesting {} data...", self.name);
        tokio::time::sleep(self.latency).await;
        info!(task = %self.name, "{} data ingested successfully", self.name);
        Ok(())
    }
}

/// The four dashboard datasets, in the order a cycle refreshes them.
///
/// Latencies encode the relative cost of each source.
pub fn default_tasks() -> Vec<Box<dyn IngestTask>> {
    vec![
        Box::new(SimulatedIngest::new("weather", Duration::from_millis(1_000))),
        Box::new(SimulatedIngest::new("infrastructure", Duration::from_millis(1_500))),
        Box::new(SimulatedIngest::new("climate", Duration::from_millis(2_000))),
        Box::new(SimulatedIngest::new("operations", Duration::from_millis(1_000))),
    ]
}
