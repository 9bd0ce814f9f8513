//! Stage runner — one stage's `Idle -> Running -> Complete` lifecycle.
//!
//! DESIGN
//! ======
//! The runner publishes a `RunnerSnapshot` on a `watch` channel. The channel
//! value is the single source of truth: every transition goes through
//! `send_if_modified`, so the start guard, ticks, task progress and
//! cancellation are all checked against the same state under one lock.
//!
//! A runner drives at most one background task. `start` and `start_task`
//! are rejected unless the runner is `Idle`; `reset` returns a finished
//! runner to `Idle`.
//!
//! CANCELLATION
//! ============
//! `cancel` flips a running stage to `Cancelled` and aborts its task.
//! Dropping the runner cancels it too, so a torn-down screen never receives
//! progress or completion from a stage it no longer owns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, trace, warn};

use super::{MAX_PERCENT, Stage, StageProgress, StageTiming};

// =============================================================================
// STATE
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    Complete,
    /// Stopped by `cancel` or by dropping the runner.
    Cancelled,
    /// A `StageTask` returned an error.
    Failed,
}

impl RunnerState {
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled | Self::Failed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunnerSnapshot {
    pub state: RunnerState,
    pub progress: StageProgress,
    /// Timer ticks applied so far. Always 0 for task-driven stages.
    pub ticks: u32,
}

impl RunnerSnapshot {
    fn idle(stage: Stage) -> Self {
        Self { state: RunnerState::Idle, progress: StageProgress::new(stage), ticks: 0 }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("stage {0} is already running")]
    AlreadyRunning(Stage),
    #[error("stage {0} already finished; reset it before starting again")]
    AlreadyFinished(Stage),
    #[error("stage {stage} has invalid timing (increment {increment}, tick {tick_ms}ms)")]
    InvalidTiming { stage: Stage, increment: u8, tick_ms: u128 },
    #[error("no tokio runtime available to drive stage {0}")]
    NoRuntime(Stage),
}

/// Failure reported by a `StageTask`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TaskError {
    pub message: String,
}

impl TaskError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// =============================================================================
// REAL WORK
// =============================================================================

/// Real asynchronous work for a stage, reporting its own progress.
///
/// Returning `Ok` completes the stage at 100%, whatever was reported.
#[async_trait::async_trait]
pub trait StageTask: Send + Sync {
    async fn run(&self, stage: Stage, progress: ProgressReporter) -> Result<(), TaskError>;
}

/// Handle given to a `StageTask` for publishing progress.
#[derive(Clone)]
pub struct ProgressReporter {
    tx: Arc<watch::Sender<RunnerSnapshot>>,
}

impl ProgressReporter {
    /// Raise the stage percent. Values below the current percent are
    /// ignored; 100 is reserved for completion and clamped to 99.
    /// Returns false once the stage is no longer running.
    pub fn report(&self, percent: u8) -> bool {
        let mut running = true;
        self.tx.send_if_modified(|snap| {
            if snap.state != RunnerState::Running {
                running = false;
                return false;
            }
            let before = snap.progress.percent;
            snap.progress.raise_to(percent.min(MAX_PERCENT - 1));
            snap.progress.percent != before
        });
        running
    }

    #[must_use]
    pub fn current(&self) -> u8 {
        self.tx.borrow().progress.percent
    }
}

// =============================================================================
// RUNNER
// =============================================================================

#[derive(Default)]
struct TaskSlot {
    handle: Option<JoinHandle<()>>,
    failure: Option<TaskError>,
}

pub struct StageRunner {
    stage: Stage,
    timing: StageTiming,
    tx: Arc<watch::Sender<RunnerSnapshot>>,
    slot: Arc<Mutex<TaskSlot>>,
}

impl StageRunner {
    #[must_use]
    pub fn new(stage: Stage, timing: StageTiming) -> Self {
        let (tx, _rx) = watch::channel(RunnerSnapshot::idle(stage));
        Self { stage, timing, tx: Arc::new(tx), slot: Arc::new(Mutex::new(TaskSlot::default())) }
    }

    #[must_use]
    pub fn with_default_timing(stage: Stage) -> Self {
        Self::new(stage, StageTiming::default_for(stage))
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn timing(&self) -> StageTiming {
        self.timing
    }

    #[must_use]
    pub fn snapshot(&self) -> RunnerSnapshot {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.tx.borrow().state
    }

    /// Receiver for progress updates, for binding a progress bar.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RunnerSnapshot> {
        self.tx.subscribe()
    }

    /// Error from the last failed `StageTask`, if any.
    #[must_use]
    pub fn failure(&self) -> Option<TaskError> {
        self.lock_slot().failure.clone()
    }

    /// Start the simulated ticker. `on_complete` fires once when the counter
    /// reaches 100, and never if the stage is cancelled first.
    pub fn start<F>(&self, on_complete: F) -> Result<(), RunnerError>
    where
        F: FnOnce(Stage) + Send + 'static,
    {
        if !self.timing.is_valid() {
            return Err(RunnerError::InvalidTiming {
                stage: self.stage,
                increment: self.timing.increment,
                tick_ms: self.timing.tick.as_millis(),
            });
        }
        let runtime = self.begin()?;
        info!(
            stage = %self.stage,
            increment = self.timing.increment,
            tick_ms = self.timing.tick.as_millis(),
            "stage started"
        );
        let handle = runtime.spawn(run_ticker(self.stage, self.timing, Arc::clone(&self.tx), on_complete));
        self.lock_slot().handle = Some(handle);
        Ok(())
    }

    /// Start a real task for this stage. `on_complete` fires once if the task
    /// succeeds while the stage is still running.
    pub fn start_task<F>(&self, task: Arc<dyn StageTask>, on_complete: F) -> Result<(), RunnerError>
    where
        F: FnOnce(Stage) + Send + 'static,
    {
        let runtime = self.begin()?;
        info!(stage = %self.stage, "stage task started");
        let reporter = ProgressReporter { tx: Arc::clone(&self.tx) };
        let handle = runtime.spawn(run_task(self.stage, task, reporter, Arc::clone(&self.slot), on_complete));
        self.lock_slot().handle = Some(handle);
        Ok(())
    }

    /// Stop a running stage. Returns false if it was not running.
    pub fn cancel(&self) -> bool {
        let cancelled = self.tx.send_if_modified(|snap| {
            if snap.state == RunnerState::Running {
                snap.state = RunnerState::Cancelled;
                true
            } else {
                false
            }
        });
        if cancelled {
            if let Some(handle) = self.lock_slot().handle.take() {
                handle.abort();
            }
            info!(stage = %self.stage, percent = self.snapshot().progress.percent, "stage cancelled");
        }
        cancelled
    }

    /// Return a finished runner to `Idle` with the counter at 0.
    pub fn reset(&self) -> Result<(), RunnerError> {
        let stage = self.stage;
        let reset = self.tx.send_if_modified(|snap| {
            if snap.state == RunnerState::Running {
                return false;
            }
            *snap = RunnerSnapshot::idle(stage);
            true
        });
        if !reset {
            return Err(RunnerError::AlreadyRunning(stage));
        }
        let mut slot = self.lock_slot();
        slot.handle = None;
        slot.failure = None;
        Ok(())
    }

    /// Wait until the stage leaves `Running`. Returns immediately when the
    /// runner is idle or already finished.
    pub async fn wait(&self) -> RunnerSnapshot {
        let mut rx = self.tx.subscribe();
        loop {
            let snap = *rx.borrow_and_update();
            if snap.state != RunnerState::Running {
                return snap;
            }
            if rx.changed().await.is_err() {
                return *rx.borrow();
            }
        }
    }

    /// Transition `Idle -> Running`, rejecting every other state.
    fn begin(&self) -> Result<Handle, RunnerError> {
        let stage = self.stage;
        let runtime = Handle::try_current().map_err(|_| RunnerError::NoRuntime(stage))?;
        let mut rejected = None;
        self.tx.send_if_modified(|snap| match snap.state {
            RunnerState::Idle => {
                *snap = RunnerSnapshot { state: RunnerState::Running, ..RunnerSnapshot::idle(stage) };
                true
            }
            RunnerState::Running => {
                rejected = Some(RunnerError::AlreadyRunning(stage));
                false
            }
            RunnerState::Complete | RunnerState::Cancelled | RunnerState::Failed => {
                rejected = Some(RunnerError::AlreadyFinished(stage));
                false
            }
        });
        if let Some(err) = rejected {
            warn!(%stage, error = %err, "stage start rejected");
            return Err(err);
        }
        self.lock_slot().failure = None;
        Ok(runtime)
    }

    fn lock_slot(&self) -> MutexGuard<'_, TaskSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for StageRunner {
    fn drop(&mut self) {
        self.cancel();
    }
}

// =============================================================================
// DRIVERS
// =============================================================================

async fn run_ticker<F>(stage: Stage, timing: StageTiming, tx: Arc<watch::Sender<RunnerSnapshot>>, on_complete: F)
where
    F: FnOnce(Stage) + Send + 'static,
{
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + timing.tick, timing.tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let mut running = true;
        let mut finished = false;
        tx.send_if_modified(|snap| {
            if snap.state != RunnerState::Running {
                running = false;
                return false;
            }
            snap.ticks += 1;
            finished = snap.progress.advance_by(timing.increment);
            if finished {
                snap.state = RunnerState::Complete;
            }
            true
        });

        if !running {
            return;
        }
        if finished {
            info!(%stage, "stage complete");
            on_complete(stage);
            return;
        }
        trace!(%stage, percent = tx.borrow().progress.percent, "stage tick");
    }
}

async fn run_task<F>(
    stage: Stage,
    task: Arc<dyn StageTask>,
    reporter: ProgressReporter,
    slot: Arc<Mutex<TaskSlot>>,
    on_complete: F,
) where
    F: FnOnce(Stage) + Send + 'static,
{
    let tx = Arc::clone(&reporter.tx);
    match task.run(stage, reporter).await {
        Ok(()) => {
            let completed = tx.send_if_modified(|snap| {
                if snap.state != RunnerState::Running {
                    return false;
                }
                snap.progress.percent = MAX_PERCENT;
                snap.state = RunnerState::Complete;
                true
            });
            if completed {
                info!(%stage, "stage task complete");
                on_complete(stage);
            }
        }
        Err(err) => {
            // Record the failure before publishing `Failed` so waiters can read it.
            slot.lock().unwrap_or_else(PoisonError::into_inner).failure = Some(err.clone());
            let failed = tx.send_if_modified(|snap| {
                if snap.state != RunnerState::Running {
                    return false;
                }
                snap.state = RunnerState::Failed;
                true
            });
            if failed {
                warn!(%stage, error = %err, "stage task failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
