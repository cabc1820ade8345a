use crate::domain::ids::{InvoiceId, PaymentId};
use crate::domain::invoice::InvoiceRecord;
use crate::domain::payment::PaymentRequest;
use crate::domain::ports::{InvoiceLookup, PaymentPoster, RunLedger, RunStatus};
use crate::error::{BatchError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory invoice lookup.
///
/// Uses `Arc<RwLock<HashMap<InvoiceId, InvoiceRecord>>>` to allow shared concurrent access.
#[derive(Default, Clone)]
pub struct InMemoryInvoiceLookup {
    invoices: Arc<RwLock<HashMap<InvoiceId, InvoiceRecord>>>,
}

impl InMemoryInvoiceLookup {
    /// Creates a new, empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, invoice: InvoiceRecord) {
        let mut invoices = self.invoices.write().await;
        invoices.insert(invoice.id.clone(), invoice);
    }
}

#[async_trait]
impl InvoiceLookup for InMemoryInvoiceLookup {
    async fn get(&self, invoice_id: &InvoiceId) -> Result<Option<InvoiceRecord>> {
        let invoices = self.invoices.read().await;
        Ok(invoices.get(invoice_id).cloned())
    }
}

#[derive(Default)]
struct PosterState {
    requests: Vec<PaymentRequest>,
    fail_after: Option<usize>,
}

/// Records posted payment requests and hands out sequential identifiers
/// (`PAY/0001`, `PAY/0002`, ...).
#[derive(Default, Clone)]
pub struct InMemoryPaymentPoster {
    state: Arc<RwLock<PosterState>>,
}

impl InMemoryPaymentPoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A poster that accepts `accepted` requests and rejects every one after that.
    pub fn failing_after(accepted: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(PosterState {
                requests: Vec::new(),
                fail_after: Some(accepted),
            })),
        }
    }

    /// Every request accepted so far, in posting order.
    pub async fn requests(&self) -> Vec<PaymentRequest> {
        self.state.read().await.requests.clone()
    }
}

#[async_trait]
impl PaymentPoster for InMemoryPaymentPoster {
    async fn post(&self, request: PaymentRequest) -> Result<PaymentId> {
        let mut state = self.state.write().await;
        if state.fail_after.is_some_and(|limit| state.requests.len() >= limit) {
            return Err(BatchError::Io(std::io::Error::other(
                "posting service unavailable",
            )));
        }
        state.requests.push(request);
        Ok(PaymentId::new(format!("PAY/{:04}", state.requests.len())))
    }
}

/// A thread-safe in-memory run ledger; claims are lost when the process exits.
#[derive(Default, Clone)]
pub struct InMemoryRunLedger {
    runs: Arc<RwLock<HashMap<String, RunStatus>>>,
}

impl InMemoryRunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    async fn set(&self, run_id: &str, status: RunStatus) {
        let mut runs = self.runs.write().await;
        runs.insert(run_id.to_string(), status);
    }
}

#[async_trait]
impl RunLedger for InMemoryRunLedger {
    async fn claim(&self, run_id: &str) -> Result<bool> {
        let mut runs = self.runs.write().await;
        if runs.contains_key(run_id) {
            return Ok(false);
        }
        runs.insert(run_id.to_string(), RunStatus::Claimed);
        Ok(true)
    }

    async fn release(&self, run_id: &str) -> Result<()> {
        let mut runs = self.runs.write().await;
        runs.remove(run_id);
        Ok(())
    }

    async fn complete(&self, run_id: &str) -> Result<()> {
        self.set(run_id, RunStatus::Completed).await;
        Ok(())
    }

    async fn fail(&self, run_id: &str) -> Result<()> {
        self.set(run_id, RunStatus::Failed).await;
        Ok(())
    }

    async fn status(&self, run_id: &str) -> Result<Option<RunStatus>> {
        let runs = self.runs.read().await;
        Ok(runs.get(run_id).copied())
    }
}
