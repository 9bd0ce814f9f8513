//! Invoiceflow — wizard, form and stage-runner engine for the invoice
//! financing dashboard.
//!
//! DESIGN
//! ======
//! - `wizard`: 1-based step controller plus gated navigation over a form.
//! - `form`: tagged field values with shallow and deep merge.
//! - `stage`: simulated or task-driven async stages with cancellation.
//! - `pipeline`: upload, verify and tokenize chained against a wizard.
//! - `screens`: step tables and typed forms for each dashboard screen.
//! - `store`: injected app store for balances, notifications and transactions.
//! - `config`: stage timings from the environment.

pub mod config;
pub mod form;
pub mod pipeline;
pub mod screens;
pub mod stage;
pub mod store;
pub mod wizard;

pub use config::{ConfigError, StageConfig};
pub use form::{FieldValue, FileHandle, FormData, FormError};
pub use pipeline::{NoopStageObserver, PipelineError, StageObserver, TokenReceipt, TokenizationPipeline};
pub use screens::{Screen, SubmitError, Submission};
pub use stage::{RunnerError, RunnerState, Stage, StageProgress, StageRunner, StageTask, StageTiming};
pub use store::AppStore;
pub use wizard::{Navigation, NoopObserver, StepDefinition, Wizard, WizardController, WizardObserver};
