use crate::domain::ids::{AccountId, InvoiceId, PartnerId, PaymentMethodId};
use crate::domain::intent::{Handling, PaymentLineIntent};
use crate::domain::invoice::{InvoiceKind, InvoiceState};
use crate::domain::money::{Amount, Currency};
use crate::error::{BatchError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of the intents CSV. Empty optional cells deserialize to `None`.
#[derive(Debug, Deserialize)]
struct IntentRow {
    invoice_id: InvoiceId,
    payer_id: PartnerId,
    invoice_kind: InvoiceKind,
    state: InvoiceState,
    currency: String,
    balance_due: Decimal,
    amount_applied: Option<Decimal>,
    handling: Option<Handling>,
    writeoff_account: Option<AccountId>,
    payment_method: Option<PaymentMethodId>,
    reference_number: String,
}

impl TryFrom<IntentRow> for PaymentLineIntent {
    type Error = BatchError;

    fn try_from(row: IntentRow) -> Result<Self> {
        let mut intent = PaymentLineIntent {
            invoice_id: row.invoice_id,
            payer_id: row.payer_id,
            invoice_kind: row.invoice_kind,
            state: row.state,
            currency: Currency::new(&row.currency),
            balance_due: Amount::new(row.balance_due)?,
            amount_applied: Amount::ZERO,
            payment_difference: Decimal::ZERO,
            handling: row.handling.unwrap_or_default(),
            writeoff_account: row.writeoff_account,
            payment_method: row.payment_method,
            reference_number: row.reference_number,
        };
        intent.set_amount_applied(Amount::new(row.amount_applied.unwrap_or_default())?);
        Ok(intent)
    }
}

pub struct IntentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> IntentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn intents(self) -> impl Iterator<Item = Result<PaymentLineIntent>> {
        self.reader
            .into_deserialize::<IntentRow>()
            .map(|result| result.map_err(BatchError::from).and_then(PaymentLineIntent::try_from))
    }
}
