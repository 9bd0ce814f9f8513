//! Tokenization pipeline — upload, verify and tokenize, one stage at a time.
//!
//! DESIGN
//! ======
//! The pipeline owns no long-lived state besides configuration. For each
//! stage it creates a `StageRunner`, starts it (simulated ticker, or a real
//! `StageTask` when one is registered for the stage), forwards progress to
//! the `StageObserver`, and waits for the completion callback. Completion
//! advances the attached wizard by one step, so a wizard parked on the
//! upload step ends on the final review step. The wizard never moves past
//! its last step, so the pipeline cannot submit the form.
//!
//! CANCELLATION
//! ============
//! `cancel` stops the active stage and prevents later ones from starting.
//! Dropping the `run` future drops the active-stage guard, which cancels the
//! runner, so an abandoned screen never keeps a ticker alive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::config::StageConfig;
use crate::form::{FormError, de};
use crate::screens::TOKEN_ID_FIELD;
use crate::stage::{
    MAX_PERCENT, RunnerError, RunnerSnapshot, RunnerState, Stage, StageProgress, StageRunner, StageTask, TaskError,
};
use crate::store::{AppStore, NotificationLevel, to_minor_units};
use crate::wizard::{Wizard, WizardObserver};

// =============================================================================
// OBSERVER
// =============================================================================

/// Stage callbacks for the progress screen. Every method defaults to a no-op.
pub trait StageObserver: Send + Sync {
    fn on_stage_start(&self, _stage: Stage) {}
    fn on_progress(&self, _progress: StageProgress) {}
    fn on_stage_complete(&self, _stage: Stage) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStageObserver;

impl StageObserver for NoopStageObserver {}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("invoice form is not ready for tokenization: {0}")]
    Form(#[from] FormError),
    #[error("stage {0} was cancelled")]
    Cancelled(Stage),
    #[error("stage {stage} failed: {source}")]
    StageFailed { stage: Stage, source: TaskError },
}

// =============================================================================
// RECEIPT
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenReceipt {
    pub token_id: String,
    pub invoice_number: String,
    pub currency: String,
    pub amount_minor: u64,
}

/// Fields the pipeline needs before it may start.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceSummary {
    invoice_number: String,
    #[serde(deserialize_with = "de::amount")]
    amount: f64,
    #[serde(default = "default_currency")]
    currency: String,
}

fn default_currency() -> String {
    "USD".to_owned()
}

/// Display token id: `TKN-` followed by 16 random hex characters.
#[must_use]
pub fn issue_token_id() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("TKN-{hex}")
}

// =============================================================================
// PIPELINE
// =============================================================================

pub struct TokenizationPipeline {
    config: StageConfig,
    store: AppStore,
    tasks: HashMap<Stage, Arc<dyn StageTask>>,
    active: Mutex<Option<Arc<StageRunner>>>,
    cancel_requested: AtomicBool,
}

impl TokenizationPipeline {
    #[must_use]
    pub fn new(config: StageConfig, store: AppStore) -> Self {
        Self {
            config,
            store,
            tasks: HashMap::new(),
            active: Mutex::new(None),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// Drive `stage` with real work instead of the simulated ticker.
    #[must_use]
    pub fn with_task(mut self, stage: Stage, task: Arc<dyn StageTask>) -> Self {
        self.tasks.insert(stage, task);
        self
    }

    /// Progress receiver for the stage currently running, if any.
    #[must_use]
    pub fn progress(&self) -> Option<watch::Receiver<RunnerSnapshot>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).as_ref().map(|r| r.subscribe())
    }

    /// Stop the active stage and skip the remaining ones.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(runner) = active {
            runner.cancel();
        }
    }

    /// Run every stage against `wizard`, then write the issued token id into
    /// its form under `tokenId`.
    pub async fn run<O: WizardObserver>(
        &self,
        wizard: &mut Wizard<O>,
        observer: &dyn StageObserver,
    ) -> Result<TokenReceipt, PipelineError> {
        self.cancel_requested.store(false, Ordering::SeqCst);
        let summary: InvoiceSummary = wizard.form().to_typed()?;
        info!(
            invoice = %summary.invoice_number,
            step = wizard.current_step(),
            "tokenization pipeline started"
        );

        let mut token_id = None;
        for stage in Stage::ALL {
            if self.cancel_requested.load(Ordering::SeqCst) {
                warn!(%stage, "pipeline cancelled before stage start");
                return Err(PipelineError::Cancelled(stage));
            }

            observer.on_stage_start(stage);
            self.run_stage(stage, observer).await?;

            if stage == Stage::Tokenize {
                let id = issue_token_id();
                wizard.set_field(TOKEN_ID_FIELD, id.clone());
                token_id = Some(id);
            }
            observer.on_stage_complete(stage);
            // Advancing from the last step would submit the form.
            if wizard.controller().is_last() {
                debug!(%stage, step = wizard.current_step(), "wizard already on its last step");
            } else {
                wizard.advance();
            }
        }

        let receipt = TokenReceipt {
            token_id: token_id.unwrap_or_default(),
            invoice_number: summary.invoice_number,
            currency: summary.currency,
            amount_minor: to_minor_units(summary.amount),
        };
        self.store
            .notify(
                NotificationLevel::Success,
                "Invoice tokenized",
                format!("Invoice {} issued as {}", receipt.invoice_number, receipt.token_id),
            )
            .await;
        info!(token = %receipt.token_id, invoice = %receipt.invoice_number, "tokenization pipeline finished");
        Ok(receipt)
    }

    async fn run_stage(&self, stage: Stage, observer: &dyn StageObserver) -> Result<(), PipelineError> {
        let runner = Arc::new(StageRunner::new(stage, self.config.timing(stage)));
        let _guard = ActiveStage::install(&self.active, Arc::clone(&runner));

        let (done_tx, mut done_rx) = oneshot::channel();
        let on_complete = move |stage: Stage| {
            if done_tx.send(stage).is_err() {
                debug!(%stage, "pipeline stopped waiting for stage");
            }
        };
        match self.tasks.get(&stage) {
            Some(task) => runner.start_task(Arc::clone(task), on_complete)?,
            None => runner.start(on_complete)?,
        }
        if self.cancel_requested.load(Ordering::SeqCst) {
            runner.cancel();
        }

        let mut rx = runner.subscribe();
        let outcome = loop {
            tokio::select! {
                done = &mut done_rx => break done,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break (&mut done_rx).await;
                    }
                    let snap = *rx.borrow_and_update();
                    if snap.state == RunnerState::Running {
                        observer.on_progress(snap.progress);
                    }
                }
            }
        };

        if outcome.is_ok() {
            observer.on_progress(StageProgress { stage, percent: MAX_PERCENT });
            return Ok(());
        }
        match runner.state() {
            RunnerState::Failed => Err(PipelineError::StageFailed {
                stage,
                source: runner.failure().unwrap_or_else(|| TaskError::new("stage task failed")),
            }),
            _ => Err(PipelineError::Cancelled(stage)),
        }
    }
}

/// Registers the running stage for `cancel`/`progress` and cancels it when
/// dropped, including when the `run` future is dropped mid-stage.
struct ActiveStage<'a> {
    slot: &'a Mutex<Option<Arc<StageRunner>>>,
    runner: Arc<StageRunner>,
}

impl<'a> ActiveStage<'a> {
    fn install(slot: &'a Mutex<Option<Arc<StageRunner>>>, runner: Arc<StageRunner>) -> Self {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&runner));
        Self { slot, runner }
    }
}

impl Drop for ActiveStage<'_> {
    fn drop(&mut self) {
        self.runner.cancel();
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
