//! Screen presets — the step tables of every wizard in the dashboard.
//!
//! DESIGN
//! ======
//! Each screen used to carry its own copy of the step/progress logic. Here a
//! screen is only configuration: a step table, default field values, a typed
//! form, and the transaction it records on submit. Navigation and field
//! merging come from `Wizard`.
//!
//! The invoice tokenization screen is driven through its middle steps by
//! `TokenizationPipeline`, which writes `tokenId` before the final step.

pub mod forms;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::form::{FormData, FormError};
use crate::store::{AppStore, NotificationLevel, Transaction, TransactionKind, TransactionStatus, to_minor_units};
use crate::wizard::{StepDefinition, Wizard, WizardObserver};

pub use forms::{FactoringForm, InvoiceTokenizationForm, SupplyChainDetails, SupplyChainFinanceForm, TradeFinanceForm};

/// Field written by the tokenization pipeline.
pub const TOKEN_ID_FIELD: &str = "tokenId";
pub const TERMS_FIELD: &str = "termsAccepted";

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("terms must be accepted before submitting")]
    TermsNotAccepted,
    #[error("invoice has not been tokenized yet")]
    MissingToken,
}

/// What a submitted form amounts to, independent of the screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub reference: String,
    pub currency: String,
    pub amount: f64,
    pub terms_accepted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    InvoiceTokenization,
    Factoring,
    TradeFinance,
    SupplyChainFinance,
}

impl Screen {
    pub const ALL: [Screen; 4] =
        [Screen::InvoiceTokenization, Screen::Factoring, Screen::TradeFinance, Screen::SupplyChainFinance];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::InvoiceTokenization => "invoice-tokenization",
            Self::Factoring => "factoring",
            Self::TradeFinance => "trade-finance",
            Self::SupplyChainFinance => "supply-chain-finance",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::InvoiceTokenization => "Tokenize Invoice",
            Self::Factoring => "New Factoring Request",
            Self::TradeFinance => "New Trade Finance Request",
            Self::SupplyChainFinance => "New Supply Chain Finance Program",
        }
    }

    #[must_use]
    pub fn transaction_kind(self) -> TransactionKind {
        match self {
            Self::InvoiceTokenization => TransactionKind::Tokenization,
            Self::Factoring => TransactionKind::Factoring,
            Self::TradeFinance => TransactionKind::TradeFinance,
            Self::SupplyChainFinance => TransactionKind::SupplyChainFinance,
        }
    }

    #[must_use]
    pub fn steps(self) -> Vec<StepDefinition> {
        match self {
            Self::InvoiceTokenization => invoice_tokenization_steps(),
            Self::Factoring => factoring_steps(),
            Self::TradeFinance => trade_finance_steps(),
            Self::SupplyChainFinance => supply_chain_finance_steps(),
        }
    }

    /// Values the form starts with on mount.
    #[must_use]
    pub fn defaults(self) -> FormData {
        let form = FormData::new().with_field("currency", "USD").with_field(TERMS_FIELD, false);
        match self {
            Self::Factoring => form.with_field("advanceRate", "80").with_field("termDays", "30"),
            Self::TradeFinance => form.with_field("instrumentType", "letter_of_credit"),
            Self::SupplyChainFinance => form.with_field("supplyChainDetails", FormData::new()),
            Self::InvoiceTokenization => form,
        }
    }

    /// A wizard configured for this screen, on step 1 with defaults.
    #[must_use]
    pub fn wizard<O: WizardObserver>(self, observer: O) -> Wizard<O> {
        Wizard::new(self.name(), self.steps(), observer).with_defaults(self.defaults())
    }

    /// Validate the filled form against the screen's typed shape.
    pub fn summarize(self, form: &FormData) -> Result<Submission, FormError> {
        let submission = match self {
            Self::InvoiceTokenization => {
                let f: InvoiceTokenizationForm = form.to_typed()?;
                Submission {
                    reference: f.token_id.unwrap_or_default(),
                    currency: f.currency,
                    amount: f.amount,
                    terms_accepted: f.terms_accepted,
                }
            }
            Self::Factoring => {
                let f: FactoringForm = form.to_typed()?;
                Submission {
                    reference: f.invoice_number,
                    currency: f.currency,
                    amount: f.amount,
                    terms_accepted: f.terms_accepted,
                }
            }
            Self::TradeFinance => {
                let f: TradeFinanceForm = form.to_typed()?;
                Submission {
                    reference: format!("{}:{}", f.instrument_type, f.beneficiary_name),
                    currency: f.currency,
                    amount: f.amount,
                    terms_accepted: f.terms_accepted,
                }
            }
            Self::SupplyChainFinance => {
                let f: SupplyChainFinanceForm = form.to_typed()?;
                Submission {
                    reference: f.program_name,
                    currency: f.currency,
                    amount: f.amount,
                    terms_accepted: f.terms_accepted,
                }
            }
        };
        Ok(submission)
    }

    /// Record the submitted form in the store and notify the user.
    ///
    /// Financing requests start `Pending`; a tokenized invoice is already
    /// issued, so its listing is recorded `Completed`.
    pub async fn submit(self, store: &AppStore, form: &FormData) -> Result<Transaction, SubmitError> {
        let submission = self.summarize(form)?;
        if !submission.terms_accepted {
            return Err(SubmitError::TermsNotAccepted);
        }
        if self == Self::InvoiceTokenization && submission.reference.is_empty() {
            return Err(SubmitError::MissingToken);
        }

        let status = match self {
            Self::InvoiceTokenization => TransactionStatus::Completed,
            Self::Factoring | Self::TradeFinance | Self::SupplyChainFinance => TransactionStatus::Pending,
        };
        let tx = store
            .record_transaction(
                self.transaction_kind(),
                status,
                &submission.currency,
                to_minor_units(submission.amount),
                submission.reference.clone(),
            )
            .await;
        store
            .notify(
                NotificationLevel::Success,
                format!("{} submitted", self.title()),
                format!("Reference {}", submission.reference),
            )
            .await;
        info!(screen = self.name(), id = %tx.id, "screen submitted");
        Ok(tx)
    }
}

// =============================================================================
// STEP TABLES
// =============================================================================

fn positive_amount(form: &FormData) -> bool {
    form.positive_number("amount")
}

fn terms_accepted(form: &FormData) -> bool {
    form.flag(TERMS_FIELD)
}

fn invoice_tokenization_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new("Invoice Details", "Enter the invoice number, buyer, amount and due date")
            .required_fields(&["invoiceNumber", "buyerName", "amount", "currency", "dueDate"])
            .completed_when(positive_amount),
        StepDefinition::new("Upload Documents", "Attach the signed invoice PDF").required_fields(&["invoiceFile"]),
        StepDefinition::new("Verification", "Invoice details are checked against the uploaded document"),
        StepDefinition::new("Tokenization", "The invoice is minted as a transferable token"),
        StepDefinition::new("Token Issued", "Review the token and accept the listing terms")
            .required_fields(&[TOKEN_ID_FIELD])
            .completed_when(terms_accepted),
    ]
}

fn factoring_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new("Invoice Selection", "Choose the invoice to factor")
            .required_fields(&["invoiceNumber", "amount", "currency"])
            .completed_when(positive_amount),
        StepDefinition::new("Financing Terms", "Set the advance rate and term")
            .required_fields(&["advanceRate", "termDays"])
            .completed_when(|f| {
                f.get("advanceRate")
                    .and_then(crate::form::FieldValue::as_number)
                    .is_some_and(|rate| rate > 0.0 && rate <= 100.0)
            }),
        StepDefinition::new("Buyer Information", "Who pays the invoice")
            .required_fields(&["buyerName", "buyerEmail"])
            .completed_when(|f| f.get("buyerEmail").and_then(|v| v.as_text()).is_some_and(|e| e.contains('@'))),
        StepDefinition::new("Review & Submit", "Confirm the request").completed_when(terms_accepted),
    ]
}

fn trade_finance_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new("Transaction Details", "Instrument, amount and currency")
            .required_fields(&["instrumentType", "amount", "currency"])
            .completed_when(positive_amount),
        StepDefinition::new("Counterparty", "Beneficiary of the instrument")
            .required_fields(&["beneficiaryName", "beneficiaryCountry"]),
        StepDefinition::new("Shipment", "Ports and shipment date")
            .required_fields(&["portOfLoading", "portOfDischarge", "shipmentDate"]),
        StepDefinition::new("Review & Submit", "Confirm the request").completed_when(terms_accepted),
    ]
}

fn supply_chain_finance_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new("Program Details", "Name and size of the program")
            .required_fields(&["programName", "amount", "currency"])
            .completed_when(positive_amount),
        StepDefinition::new("Supply Chain Details", "Supplier, buyer and payment terms").required_fields(&[
            "supplyChainDetails.supplierName",
            "supplyChainDetails.buyerName",
            "supplyChainDetails.paymentTerms",
        ]),
        StepDefinition::new("Documents", "Attach the purchase order").required_fields(&["purchaseOrderFile"]),
        StepDefinition::new("Review & Submit", "Confirm the program").completed_when(terms_accepted),
    ]
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
