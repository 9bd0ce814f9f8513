//! Typed views of each screen's filled form.
//!
//! Field names follow the camelCase keys the form controls write.

use serde::Deserialize;
use time::Date;

use crate::form::FileHandle;
use crate::form::de;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTokenizationForm {
    pub invoice_number: String,
    pub buyer_name: String,
    #[serde(deserialize_with = "de::amount")]
    pub amount: f64,
    pub currency: String,
    #[serde(deserialize_with = "de::iso_date::deserialize")]
    pub due_date: Date,
    pub invoice_file: FileHandle,
    /// Set by the tokenization pipeline once the token is issued.
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub terms_accepted: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoringForm {
    pub invoice_number: String,
    #[serde(deserialize_with = "de::amount")]
    pub amount: f64,
    pub currency: String,
    /// Share of the invoice paid up front, in percent.
    #[serde(deserialize_with = "de::amount")]
    pub advance_rate: f64,
    #[serde(deserialize_with = "de::whole_number")]
    pub term_days: u32,
    pub buyer_name: String,
    pub buyer_email: String,
    #[serde(default)]
    pub terms_accepted: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeFinanceForm {
    /// e.g. `letter_of_credit`, `bank_guarantee`, `documentary_collection`.
    pub instrument_type: String,
    #[serde(deserialize_with = "de::amount")]
    pub amount: f64,
    pub currency: String,
    pub beneficiary_name: String,
    pub beneficiary_country: String,
    pub port_of_loading: String,
    pub port_of_discharge: String,
    #[serde(deserialize_with = "de::iso_date::deserialize")]
    pub shipment_date: Date,
    #[serde(default)]
    pub terms_accepted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChainDetails {
    pub supplier_name: String,
    pub buyer_name: String,
    pub payment_terms: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChainFinanceForm {
    pub program_name: String,
    #[serde(deserialize_with = "de::amount")]
    pub amount: f64,
    pub currency: String,
    pub supply_chain_details: SupplyChainDetails,
    pub purchase_order_file: FileHandle,
    #[serde(default)]
    pub terms_accepted: bool,
}
