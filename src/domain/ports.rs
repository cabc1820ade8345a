use super::ids::{InvoiceId, PaymentId};
use super::invoice::InvoiceRecord;
use super::money::{Amount, Currency};
use super::payment::PaymentRequest;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Read-only access to the host ERP's invoices.
#[async_trait]
pub trait InvoiceLookup: Send + Sync {
    async fn get(&self, invoice_id: &InvoiceId) -> Result<Option<InvoiceRecord>>;
}

/// Spells out an amount in a currency.
pub trait AmountFormatter: Send + Sync {
    fn amount_to_text(&self, amount: Amount, currency: &Currency) -> Result<String>;
}

/// Persists one aggregated payment and returns its identifier.
#[async_trait]
pub trait PaymentPoster: Send + Sync {
    async fn post(&self, request: PaymentRequest) -> Result<PaymentId>;
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Claimed,
    Completed,
    Failed,
}

/// Records which batch runs have been submitted, so one batch is never applied twice.
#[async_trait]
pub trait RunLedger: Send + Sync {
    /// Returns `false` if `run_id` was already claimed.
    async fn claim(&self, run_id: &str) -> Result<bool>;
    /// Forgets a claimed run that was rejected before anything was posted.
    async fn release(&self, run_id: &str) -> Result<()>;
    async fn complete(&self, run_id: &str) -> Result<()>;
    async fn fail(&self, run_id: &str) -> Result<()>;
    async fn status(&self, run_id: &str) -> Result<Option<RunStatus>>;
}

pub type InvoiceLookupBox = Box<dyn InvoiceLookup>;
pub type AmountFormatterBox = Box<dyn AmountFormatter>;
pub type PaymentPosterBox = Box<dyn PaymentPoster>;
pub type RunLedgerBox = Box<dyn RunLedger>;
