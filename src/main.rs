use invoiceflow::StageConfig;
use invoiceflow::form::{FieldValue, FileHandle, FormData};
use invoiceflow::pipeline::{StageObserver, TokenizationPipeline};
use invoiceflow::screens::{Screen, TERMS_FIELD};
use invoiceflow::stage::{Stage, StageProgress};
use invoiceflow::store::AppStore;
use invoiceflow::wizard::{Navigation, WizardObserver};
use time::{Date, Month};
use tracing::{debug, info};

/// Logs wizard callbacks the way a screen would re-render on them.
struct LogObserver;

impl WizardObserver for LogObserver {
    fn on_step_change(&mut self, new_index: usize) {
        info!(step = new_index, "wizard step changed");
    }

    fn on_field_change(&mut self, key: &str, value: &FieldValue) {
        debug!(%key, value = %value.to_json(), "field changed");
    }

    fn on_submit(&mut self, form: &FormData) {
        info!(fields = form.len(), "wizard submitted");
    }
}

impl StageObserver for LogObserver {
    fn on_stage_start(&self, stage: Stage) {
        info!(stage = stage.label(), "stage started");
    }

    fn on_progress(&self, progress: StageProgress) {
        debug!(stage = %progress.stage, percent = progress.percent, "stage progress");
    }

    fn on_stage_complete(&self, stage: Stage) {
        info!(stage = stage.label(), "stage complete");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    if let Err(err) = dotenvy::dotenv() {
        debug!(error = %err, "no .env file loaded");
    }

    let config = StageConfig::from_env()?;
    let store = AppStore::new();

    // Invoice tokenization: details, upload, then the stage pipeline.
    let screen = Screen::InvoiceTokenization;
    let mut wizard = screen.wizard(LogObserver);
    wizard.set_field("invoiceNumber", "INV-2024-0142");
    wizard.set_field("buyerName", "Acme Retail");
    wizard.set_field("amount", "48,500.00");
    wizard.set_field("dueDate", Date::from_calendar_date(2025, Month::September, 30)?);
    wizard.next();
    wizard.set_field("invoiceFile", FileHandle::new("INV-2024-0142.pdf", 184_320, "application/pdf"));

    let pipeline = TokenizationPipeline::new(config, store.clone());
    let receipt = pipeline.run(&mut wizard, &LogObserver).await?;
    info!(token = %receipt.token_id, step = wizard.current_step(), "invoice tokenized");

    wizard.set_field(TERMS_FIELD, true);
    if wizard.next() == Navigation::Submit {
        screen.submit(&store, wizard.form()).await?;
    }

    // Factoring request against the same invoice.
    let screen = Screen::Factoring;
    let mut wizard = screen.wizard(LogObserver);
    wizard.set_field("invoiceNumber", "INV-2024-0142");
    wizard.set_field("amount", 48_500.0);
    wizard.set_field("buyerName", "Acme Retail");
    wizard.set_field("buyerEmail", "ap@acme.example");
    wizard.set_field(TERMS_FIELD, true);
    while let Navigation::Moved { .. } = wizard.next() {}
    screen.submit(&store, wizard.form()).await?;

    for tx in store.transactions().await {
        info!(kind = ?tx.kind, status = ?tx.status, amount_minor = tx.amount_minor, reference = %tx.reference, "transaction");
    }
    info!(unread = store.unread_count().await, "notifications");
    Ok(())
}
