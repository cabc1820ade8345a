use super::aggregator::{BatchOptions, aggregate};
use crate::config::BatchSettings;
use crate::domain::intent::PaymentLineIntent;
use crate::domain::payment::{AggregatedPayment, PaymentGroups, PaymentRequest, PostedPayment};
use crate::domain::ports::{AmountFormatterBox, PaymentPosterBox, RunLedgerBox};
use crate::error::{BatchError, Result};
use tracing::{error, info, warn};

/// Turns a batch of payment intents into posted payments, one per payer.
///
/// `BatchProcessor` owns the posting service and the run ledger. Every run is
/// claimed in the ledger under its identifier before anything is posted, so the
/// same batch cannot be applied twice.
pub struct BatchProcessor {
    poster: PaymentPosterBox,
    ledger: RunLedgerBox,
    formatter: AmountFormatterBox,
    settings: BatchSettings,
}

impl BatchProcessor {
    /// Creates a new `BatchProcessor`.
    ///
    /// # Arguments
    ///
    /// * `poster` - Persists each aggregated payment.
    /// * `ledger` - Tracks which batch runs were already submitted.
    /// * `formatter` - Spells out payment totals.
    /// * `settings` - Journal, date and payment methods shared by the run.
    pub fn new(
        poster: PaymentPosterBox,
        ledger: RunLedgerBox,
        formatter: AmountFormatterBox,
        settings: BatchSettings,
    ) -> Self {
        Self {
            poster,
            ledger,
            formatter,
            settings,
        }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Validates and aggregates the batch without posting anything.
    pub fn preview(
        &self,
        intents: &[PaymentLineIntent],
        options: &BatchOptions,
    ) -> Result<PaymentGroups> {
        aggregate(intents, options, self.formatter.as_ref())
    }

    /// Processes one batch run.
    ///
    /// A run rejected by validation is released from the ledger so that the
    /// corrected batch can be resubmitted under the same identifier. Once
    /// posting has started the run stays claimed, even on failure.
    pub async fn process(
        &self,
        run_id: &str,
        intents: &[PaymentLineIntent],
        options: &BatchOptions,
    ) -> Result<Vec<PostedPayment>> {
        if !self.ledger.claim(run_id).await? {
            return Err(BatchError::DuplicateRun(run_id.to_string()));
        }

        let groups = match self.preview(intents, options) {
            Ok(groups) => groups,
            Err(e) => {
                self.ledger.release(run_id).await?;
                return Err(e);
            }
        };

        let mut posted = Vec::with_capacity(groups.len());
        for payment in groups.iter() {
            let request = self.payment_request(&groups, payment);
            match self.poster.post(request).await {
                Ok(payment_id) => {
                    info!(
                        run = run_id,
                        payer = %payment.payer_id,
                        payment = %payment_id,
                        amount = %payment.total_amount,
                        "posted payment"
                    );
                    posted.push(PostedPayment {
                        payer: payment.payer_id.clone(),
                        payment_id,
                        partner_type: payment.partner_type,
                        amount: payment.total_amount,
                        currency: groups.currency().clone(),
                        memo: payment.memo.clone(),
                        invoice_ids: payment.invoice_ids().cloned().collect(),
                    });
                }
                Err(e) => {
                    error!(run = run_id, payer = %payment.payer_id, error = %e, "posting failed");
                    self.ledger.fail(run_id).await?;
                    return Err(BatchError::Posting {
                        payer: payment.payer_id.clone(),
                        posted: posted.into_iter().map(|p| p.payment_id).collect(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if posted.is_empty() {
            warn!(run = run_id, "no invoice had an amount to settle");
        }
        self.ledger.complete(run_id).await?;
        Ok(posted)
    }

    /// Builds the posting request for one payer group.
    pub fn payment_request(
        &self,
        groups: &PaymentGroups,
        payment: &AggregatedPayment,
    ) -> PaymentRequest {
        let payment_method = payment
            .payment_method
            .clone()
            .or_else(|| self.settings.default_payment_method.clone());
        let check_amount_in_words = match &payment_method {
            Some(method) if *method == self.settings.check_payment_method => {
                Some(payment.amount_in_words.clone())
            }
            _ => None,
        };

        PaymentRequest {
            journal: self.settings.journal.clone(),
            payment_date: self.settings.payment_date,
            communication: payment.memo.clone(),
            currency: groups.currency().clone(),
            partner: payment.payer_id.clone(),
            partner_type: payment.partner_type,
            direction: groups.direction(),
            amount: payment.total_amount,
            payment_method,
            invoice_ids: payment.invoice_ids().cloned().collect(),
            check_amount_in_words,
        }
    }
}
