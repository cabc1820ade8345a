use super::aggregator::validate_batch;
use crate::domain::ids::{InvoiceId, PartnerId};
use crate::domain::intent::PaymentLineIntent;
use crate::domain::invoice::{PartnerType, PaymentDirection};
use crate::domain::money::{Amount, Currency};
use crate::domain::ports::InvoiceLookup;
use crate::error::{BatchError, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// Header values proposed for a batch before the user picks amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// `|sum(residual * sign)|` over every invoice in the batch.
    pub amount: Amount,
    pub currency: Currency,
    pub direction: PaymentDirection,
    /// Commercial partner of the first invoice.
    pub partner: PartnerId,
    pub partner_type: PartnerType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBatch {
    pub intents: Vec<PaymentLineIntent>,
    pub summary: BatchSummary,
}

/// Resolves the selected invoices and builds one unselected intent per invoice.
pub async fn prepare_batch(
    lookup: &dyn InvoiceLookup,
    invoice_ids: &[InvoiceId],
) -> Result<PreparedBatch> {
    let mut records = Vec::with_capacity(invoice_ids.len());
    for id in invoice_ids {
        let record = lookup
            .get(id)
            .await?
            .ok_or_else(|| BatchError::UnknownInvoice(id.clone()))?;
        records.push(record);
    }

    let intents: Vec<PaymentLineIntent> =
        records.iter().map(PaymentLineIntent::from_invoice).collect();
    let profile = validate_batch(&intents)?;

    let net: Decimal = records
        .iter()
        .map(|r| r.residual.value() * Decimal::from(r.kind.sign()))
        .sum();
    let direction = if net > Decimal::ZERO {
        PaymentDirection::Inbound
    } else {
        PaymentDirection::Outbound
    };

    // validate_batch rejected an empty selection, so there is a first record.
    let partner = records
        .first()
        .map(|r| r.commercial_partner.clone())
        .ok_or(BatchError::EmptySelection)?;

    Ok(PreparedBatch {
        intents,
        summary: BatchSummary {
            amount: Amount::new(net.abs())?,
            currency: profile.currency,
            direction,
            partner,
            partner_type: profile.partner_type,
        },
    })
}
