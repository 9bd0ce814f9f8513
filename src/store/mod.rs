//! Shared dashboard state: wallet balances, notifications and transactions.
//!
//! DESIGN
//! ======
//! `AppStore` is a cloneable handle passed explicitly to whatever needs it
//! (the tokenization pipeline, screen submission, the dashboard cards).
//! There is no global instance. All inner state sits behind one
//! `tokio::sync::RwLock`; reads clone snapshots out so no lock is held
//! while a caller renders.
//!
//! Amounts are integer minor units (cents) per asset symbol.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("insufficient {asset} balance: available {available}, requested {requested}")]
    InsufficientFunds { asset: String, available: u64, requested: u64 },
    #[error("notification not found: {0}")]
    UnknownNotification(Uuid),
    #[error("transaction not found: {0}")]
    UnknownTransaction(Uuid),
}

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Tokenization,
    Factoring,
    TradeFinance,
    SupplyChainFinance,
    Deposit,
    Withdrawal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub asset: String,
    pub amount_minor: u64,
    /// Human reference shown in the table, e.g. an invoice number.
    pub reference: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub ts: i64,
}

// =============================================================================
// APP STORE
// =============================================================================

#[derive(Default)]
struct StoreInner {
    balances: BTreeMap<String, u64>,
    notifications: Vec<Notification>,
    transactions: Vec<Transaction>,
}

#[derive(Clone, Default)]
pub struct AppStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl AppStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // wallet
    // -------------------------------------------------------------------------

    pub async fn balance(&self, asset: &str) -> u64 {
        self.inner.read().await.balances.get(asset).copied().unwrap_or(0)
    }

    pub async fn balances(&self) -> BTreeMap<String, u64> {
        self.inner.read().await.balances.clone()
    }

    /// Add funds and return the new balance. Saturates at `u64::MAX`.
    pub async fn credit(&self, asset: &str, amount_minor: u64) -> u64 {
        let mut inner = self.inner.write().await;
        let balance = inner.balances.entry(asset.to_owned()).or_insert(0);
        *balance = balance.saturating_add(amount_minor);
        debug!(asset, amount_minor, balance = *balance, "wallet credited");
        *balance
    }

    /// Remove funds and return the new balance, or fail without changes.
    pub async fn debit(&self, asset: &str, amount_minor: u64) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let available = inner.balances.get(asset).copied().unwrap_or(0);
        if available < amount_minor {
            return Err(StoreError::InsufficientFunds {
                asset: asset.to_owned(),
                available,
                requested: amount_minor,
            });
        }
        let remaining = available - amount_minor;
        inner.balances.insert(asset.to_owned(), remaining);
        debug!(asset, amount_minor, balance = remaining, "wallet debited");
        Ok(remaining)
    }

    // -------------------------------------------------------------------------
    // notifications
    // -------------------------------------------------------------------------

    pub async fn notify(&self, level: NotificationLevel, title: impl Into<String>, body: impl Into<String>) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            body: body.into(),
            read: false,
            ts: now_ms(),
        };
        let id = notification.id;
        self.inner.write().await.notifications.push(notification);
        id
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let notification = inner
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StoreError::UnknownNotification(id))?;
        notification.read = true;
        Ok(())
    }

    pub async fn unread_count(&self) -> usize {
        self.inner.read().await.notifications.iter().filter(|n| !n.read).count()
    }

    /// Notifications, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.inner.read().await.notifications.iter().rev().cloned().collect()
    }

    // -------------------------------------------------------------------------
    // transactions
    // -------------------------------------------------------------------------

    pub async fn record_transaction(
        &self,
        kind: TransactionKind,
        status: TransactionStatus,
        asset: &str,
        amount_minor: u64,
        reference: impl Into<String>,
    ) -> Transaction {
        let tx = Transaction {
            id: Uuid::new_v4(),
            kind,
            status,
            asset: asset.to_owned(),
            amount_minor,
            reference: reference.into(),
            ts: now_ms(),
        };
        info!(id = %tx.id, kind = ?kind, status = ?status, asset, amount_minor, "transaction recorded");
        self.inner.write().await.transactions.push(tx.clone());
        tx
    }

    pub async fn set_transaction_status(&self, id: Uuid, status: TransactionStatus) -> Result<Transaction, StoreError> {
        let mut inner = self.inner.write().await;
        let tx = inner
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::UnknownTransaction(id))?;
        tx.status = status;
        Ok(tx.clone())
    }

    /// Transactions, newest first.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.inner.read().await.transactions.iter().rev().cloned().collect()
    }
}

/// Convert a decimal amount into minor units, rounding to the nearest cent.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_minor_units(amount: f64) -> u64 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    (amount * 100.0).round() as u64
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
