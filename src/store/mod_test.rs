use super::*;

// =============================================================================
// wallet
// =============================================================================

#[tokio::test]
async fn unknown_asset_has_zero_balance() {
    let store = AppStore::new();
    assert_eq!(store.balance("USDC").await, 0);
    assert!(store.balances().await.is_empty());
}

#[tokio::test]
async fn credit_then_debit_updates_balance() {
    let store = AppStore::new();
    assert_eq!(store.credit("USDC", 10_000).await, 10_000);
    assert_eq!(store.debit("USDC", 2_500).await, Ok(7_500));
    assert_eq!(store.balance("USDC").await, 7_500);
}

#[tokio::test]
async fn debit_beyond_balance_fails_without_change() {
    let store = AppStore::new();
    store.credit("ETH", 100).await;

    let err = store.debit("ETH", 101).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::InsufficientFunds { asset: "ETH".into(), available: 100, requested: 101 }
    );
    assert_eq!(store.balance("ETH").await, 100);
}

#[tokio::test]
async fn clones_share_state() {
    let store = AppStore::new();
    let other = store.clone();
    other.credit("USDC", 5).await;
    assert_eq!(store.balance("USDC").await, 5);
}

// =============================================================================
// notifications
// =============================================================================

#[tokio::test]
async fn notifications_are_newest_first_and_track_read_state() {
    let store = AppStore::new();
    let first = store.notify(NotificationLevel::Info, "Welcome", "").await;
    let second = store.notify(NotificationLevel::Success, "Invoice tokenized", "TKN-1").await;

    let list = store.notifications().await;
    assert_eq!(list.iter().map(|n| n.id).collect::<Vec<_>>(), vec![second, first]);
    assert_eq!(store.unread_count().await, 2);

    store.mark_read(first).await.unwrap();
    assert_eq!(store.unread_count().await, 1);
}

#[tokio::test]
async fn mark_read_unknown_id_fails() {
    let store = AppStore::new();
    let id = Uuid::new_v4();
    assert_eq!(store.mark_read(id).await, Err(StoreError::UnknownNotification(id)));
}

// =============================================================================
// transactions
// =============================================================================

#[tokio::test]
async fn transactions_are_newest_first() {
    let store = AppStore::new();
    let a = store
        .record_transaction(TransactionKind::Deposit, TransactionStatus::Completed, "USDC", 100, "dep-1")
        .await;
    let b = store
        .record_transaction(TransactionKind::Factoring, TransactionStatus::Pending, "USD", 50_000, "INV-7")
        .await;

    let list = store.transactions().await;
    assert_eq!(list, vec![b, a]);
}

#[tokio::test]
async fn set_transaction_status_updates_record() {
    let store = AppStore::new();
    let tx = store
        .record_transaction(TransactionKind::TradeFinance, TransactionStatus::Pending, "USD", 1, "LC-1")
        .await;

    let updated = store.set_transaction_status(tx.id, TransactionStatus::Completed).await.unwrap();
    assert_eq!(updated.status, TransactionStatus::Completed);
    assert_eq!(store.transactions().await[0].status, TransactionStatus::Completed);

    let missing = Uuid::new_v4();
    assert_eq!(
        store.set_transaction_status(missing, TransactionStatus::Failed).await,
        Err(StoreError::UnknownTransaction(missing))
    );
}

#[test]
fn transaction_kind_serializes_snake_case() {
    assert_eq!(
        serde_json::to_value(TransactionKind::SupplyChainFinance).unwrap(),
        serde_json::json!("supply_chain_finance")
    );
}

#[test]
fn to_minor_units_rounds_to_cents() {
    assert_eq!(to_minor_units(12.34), 1234);
    assert_eq!(to_minor_units(0.125), 13);
    assert_eq!(to_minor_units(750.0), 75_000);
    assert_eq!(to_minor_units(-3.0), 0);
    assert_eq!(to_minor_units(f64::NAN), 0);
}
