//! End-to-end: fill an invoice wizard, tokenize it, accept terms, submit.

use std::collections::HashMap;
use std::time::Duration;

use invoiceflow::form::FileHandle;
use invoiceflow::pipeline::{NoopStageObserver, TokenizationPipeline};
use invoiceflow::screens::{Screen, TERMS_FIELD, TOKEN_ID_FIELD};
use invoiceflow::store::{AppStore, TransactionKind, TransactionStatus};
use invoiceflow::wizard::{Navigation, NoopObserver};
use invoiceflow::{Stage, StageConfig};
use time::{Date, Month};

fn fast_config() -> StageConfig {
    let vars: HashMap<&str, &str> = [
        ("STAGE_UPLOAD_INCREMENT", "50"),
        ("STAGE_UPLOAD_TICK_MS", "10"),
        ("STAGE_VERIFY_INCREMENT", "50"),
        ("STAGE_VERIFY_TICK_MS", "10"),
        ("STAGE_TOKENIZE_INCREMENT", "100"),
        ("STAGE_TOKENIZE_TICK_MS", "5"),
    ]
    .into_iter()
    .collect();
    StageConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_owned())).expect("config")
}

#[tokio::test(start_paused = true)]
async fn invoice_is_tokenized_and_listed() {
    let store = AppStore::new();
    let config = fast_config();
    assert_eq!(config.timing(Stage::Tokenize).tick, Duration::from_millis(5));

    let screen = Screen::InvoiceTokenization;
    let mut wizard = screen.wizard(NoopObserver);
    assert_eq!(wizard.back(), Navigation::Exit);

    wizard.set_field("invoiceNumber", "INV-9001");
    wizard.set_field("buyerName", "Globex");
    wizard.set_field("amount", 2_500.0);
    wizard.set_field("dueDate", Date::from_calendar_date(2025, Month::December, 1).expect("date"));
    assert_eq!(wizard.next(), Navigation::Moved { from: 1, to: 2 });
    wizard.set_field("invoiceFile", FileHandle::new("INV-9001.pdf", 2048, "application/pdf"));

    let pipeline = TokenizationPipeline::new(config, store.clone());
    let started = tokio::time::Instant::now();
    let receipt = pipeline.run(&mut wizard, &NoopStageObserver).await.expect("pipeline");
    assert!(started.elapsed() >= Duration::from_millis(45));
    assert_eq!(wizard.current_step(), wizard.step_count());

    assert_eq!(wizard.next(), Navigation::Blocked, "terms not yet accepted");
    wizard.set_field(TERMS_FIELD, true);
    assert_eq!(wizard.next(), Navigation::Submit);

    let tx = screen.submit(&store, wizard.form()).await.expect("submit");
    assert_eq!(tx.kind, TransactionKind::Tokenization);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.reference, receipt.token_id);
    assert_eq!(tx.amount_minor, 250_000);
    assert_eq!(
        wizard.form().get(TOKEN_ID_FIELD).and_then(|v| v.as_text()),
        Some(receipt.token_id.as_str())
    );

    assert_eq!(store.unread_count().await, 2);
    assert_eq!(store.transactions().await.len(), 1);
}

#[tokio::test]
async fn factoring_request_is_recorded_pending() {
    let store = AppStore::new();
    let screen = Screen::Factoring;
    let mut wizard = screen.wizard(NoopObserver);
    wizard.set_field("invoiceNumber", "INV-9001");
    wizard.set_field("amount", "2,500");
    wizard.set_field("buyerName", "Globex");
    wizard.set_field("buyerEmail", "ap@globex.example");

    assert_eq!(wizard.next(), Navigation::Moved { from: 1, to: 2 });
    assert_eq!(wizard.next(), Navigation::Moved { from: 2, to: 3 });
    assert_eq!(wizard.next(), Navigation::Moved { from: 3, to: 4 });
    assert_eq!(wizard.back(), Navigation::Moved { from: 4, to: 3 });
    assert_eq!(wizard.next(), Navigation::Moved { from: 3, to: 4 });
    wizard.set_field(TERMS_FIELD, true);
    assert_eq!(wizard.next(), Navigation::Submit);

    let tx = screen.submit(&store, wizard.form()).await.expect("submit");
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(store.transactions().await, vec![tx]);
}
