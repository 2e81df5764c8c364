//! Ingestion scheduler
//!
//! Runs the ingestion sub-tasks on a fixed period.
//!
//! ## Behavior
//! - One cycle runs immediately on `start()`, then one per period
//! - Sub-tasks run strictly one after another; the first failure ends the cycle
//! - A failed cycle is logged only, the next tick runs a fresh cycle
//! - A tick that fires while a cycle is still in flight is skipped

pub mod tasks;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::types::{IngestionCycle, IngestionStatus, SubTaskOutcome, SubTaskResult};
use crate::utils::next_firing;

pub use tasks::{default_tasks, IngestTask, SimulatedIngest};

/// Receives every finished cycle, successful or aborted
pub trait CycleSink: Send + Sync {
    fn cycle_finished(&self, cycle: &IngestionCycle);
}

/// `running` and the timer handle only ever change together
#[derive(Default)]
struct SchedulerState {
    running: bool,
    timer: Option<JoinHandle<()>>,
    /// Wall-clock instant the current timer was armed
    armed_at: Option<DateTime<Utc>>,
}

/// Clears the in-flight flag when a cycle ends, even if its task is aborted
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Recurring ingestion scheduler.
///
/// Create one per process and share it through an `Arc`. The timer task
/// only holds a weak reference, so dropping the last `Arc` ends it.
pub struct IngestionScheduler {
    interval: Duration,
    tasks: Vec<Box<dyn IngestTask>>,
    state: Mutex<SchedulerState>,
    last_completed: Mutex<Option<DateTime<Utc>>>,
    cycle_in_flight: AtomicBool,
    cycles_started: AtomicU64,
    skipped_ticks: AtomicU64,
    sink: Option<Arc<dyn CycleSink>>,
}

impl IngestionScheduler {
    /// Scheduler running the four simulated dashboard datasets
    pub fn new(interval: Duration) -> Self {
        Self::with_tasks(interval, default_tasks())
    }

    /// Scheduler running the given sub-tasks in order
    pub fn with_tasks(interval: Duration, tasks: Vec<Box<dyn IngestTask>>) -> Self {
        Self {
            interval,
            tasks,
            state: Mutex::new(SchedulerState::default()),
            last_completed: Mutex::new(None),
            cycle_in_flight: AtomicBool::new(false),
            cycles_started: AtomicU64::new(0),
            skipped_ticks: AtomicU64::new(0),
            sink: None,
        }
    }

    /// Report finished cycles to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn CycleSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Log startup and start the timer
    pub fn initialize(self: &Arc<Self>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            tasks = self.tasks.len(),
            "Data ingestion scheduler initialized"
        );
        self.start();
    }

    /// Arm the timer and run one cycle right away.
    ///
    /// Returns false, with a warning, when the scheduler is already running.
    /// Must be called from within a tokio runtime.
    pub fn start(self: &Arc<Self>) -> bool {
        {
            let mut state = self.state.lock();
            if state.running {
                warn!("Data ingestion scheduler is already running");
                return false;
            }

            // status() and the ticker share one anchor
            let first_tick = Instant::now() + self.interval;
            state.armed_at = Some(Utc::now());

            let weak = Arc::downgrade(self);
            let timer = tokio::spawn(Self::run_timer(weak, first_tick, self.interval));

            state.running = true;
            state.timer = Some(timer);
        }

        info!("Starting data ingestion scheduler");
        self.spawn_cycle();
        true
    }

    /// Cancel the timer. A cycle already in flight is left to finish.
    pub fn stop(&self) {
        let was_running = {
            let mut state = self.state.lock();
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.armed_at = None;
            std::mem::replace(&mut state.running, false)
        };

        if was_running {
            info!("Data ingestion scheduler stopped");
        } else {
            debug!("Data ingestion scheduler already stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Cycles that actually ran (skipped ticks excluded)
    pub fn cycles_started(&self) -> u64 {
        self.cycles_started.load(Ordering::SeqCst)
    }

    /// Ticks dropped because the previous cycle was still in flight
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks.load(Ordering::SeqCst)
    }

    /// Current status for the operational endpoint
    pub fn status(&self) -> IngestionStatus {
        let (is_running, armed_at) = {
            let state = self.state.lock();
            (state.running, state.armed_at)
        };

        IngestionStatus {
            is_running,
            last_ingestion: *self.last_completed.lock(),
            next_ingestion: armed_at.map(|anchor| next_firing(anchor, self.interval, Utc::now())),
        }
    }

    /// Run every sub-task once, in order.
    ///
    /// Returns `None` when another cycle is still in flight. Sub-task
    /// failures never propagate; they end up in the returned record.
    pub async fn run_cycle(&self) -> Option<IngestionCycle> {
        if self
            .cycle_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.skipped_ticks.fetch_add(1, Ordering::SeqCst);
            warn!("Previous ingestion cycle still running, skipping this tick");
            return None;
        }
        let _guard = InFlightGuard(&self.cycle_in_flight);

        let cycle_id = self.cycles_started.fetch_add(1, Ordering::SeqCst) + 1;
        let started_at = Utc::now();
        info!(cycle_id, "Starting data ingestion cycle");

        let mut results = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            let task_started = Utc::now();
            let outcome = match task.ingest().await {
                Ok(()) => SubTaskOutcome::Success,
                Err(e) => {
                    error!(cycle_id, task = task.name(), error = %e, "Error during data ingestion");
                    SubTaskOutcome::Failed(e.to_string())
                }
            };
            let failed = !outcome.is_success();

            results.push(SubTaskResult {
                name: task.name().to_string(),
                started_at: task_started,
                finished_at: Utc::now(),
                outcome,
            });

            if failed {
                break;
            }
        }

        let cycle = IngestionCycle {
            cycle_id,
            started_at,
            finished_at: Utc::now(),
            results,
        };

        if cycle.is_complete(self.tasks.len()) {
            *self.last_completed.lock() = Some(cycle.finished_at);
            info!(cycle_id, "Data ingestion cycle completed successfully");
        }

        if let Some(sink) = &self.sink {
            sink.cycle_finished(&cycle);
        }

        Some(cycle)
    }

    fn spawn_cycle(self: &Arc<Self>) {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.run_cycle().await;
        });
    }

    /// Fire on the `first_tick + k * period` grid. Late ticks are skipped
    /// rather than shifting the grid.
    async fn run_timer(scheduler: Weak<Self>, first_tick: Instant, period: Duration) {
        let mut ticker = interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match scheduler.upgrade() {
                Some(scheduler) => scheduler.spawn_cycle(),
                None => break,
            }
        }
    }
}

impl Drop for IngestionScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.state.get_mut().timer.take() {
            timer.abort();
        }
    }
}
