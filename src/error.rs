use crate::domain::ids::{InvoiceId, PartnerId, PaymentId, PaymentMethodId};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("No invoices selected for payment")]
    EmptySelection,
    #[error("Invoice {invoice} is {state}; only open invoices can be paid")]
    NotSettleable { invoice: InvoiceId, state: String },
    #[error("Customer invoices and vendor bills cannot be mixed in a single payment")]
    MixedDirection,
    #[error("All invoices must use the same currency (expected {expected}, invoice {invoice} uses {found})")]
    CurrencyMismatch {
        invoice: InvoiceId,
        expected: String,
        found: String,
    },
    #[error("Invoice {invoice} is listed more than once in the batch")]
    DuplicateInvoice { invoice: InvoiceId },
    #[error("Total of invoice amounts ({actual}) does not match the declared amount ({declared})")]
    TotalMismatch { declared: Decimal, actual: Decimal },
    #[error("A payment method must be set for invoice {invoice}")]
    MissingPaymentMethod { invoice: InvoiceId },
    #[error("Amount {applied} applied to invoice {invoice} exceeds its balance {balance}")]
    Overpayment {
        invoice: InvoiceId,
        applied: Decimal,
        balance: Decimal,
    },
    #[error("Payer {payer} has conflicting payment methods ({first} and {second})")]
    ConflictingPaymentMethod {
        payer: PartnerId,
        first: PaymentMethodId,
        second: PaymentMethodId,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unknown invoice {0}")]
    UnknownInvoice(InvoiceId),
    #[error("Could not spell out amount: {0}")]
    Formatting(String),
    #[error("Posting payment for {payer} failed after {} payment(s) were posted: {reason}", .posted.len())]
    Posting {
        payer: PartnerId,
        posted: Vec<PaymentId>,
        reason: String,
    },
    #[error("Batch run {0} was already submitted")]
    DuplicateRun(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, BatchError>;
