#![allow(dead_code)]

use paybatch::domain::intent::{Handling, PaymentLineIntent};
use paybatch::domain::invoice::{InvoiceKind, InvoiceState};
use paybatch::domain::money::{Amount, Currency};
use rand::Rng;
use rust_decimal::Decimal;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 11] = [
    "invoice_id",
    "payer_id",
    "invoice_kind",
    "state",
    "currency",
    "balance_due",
    "amount_applied",
    "handling",
    "writeoff_account",
    "payment_method",
    "reference_number",
];

/// Writes an intents CSV with the standard header followed by `rows`.
pub fn write_intents(path: &Path, rows: &[[&str; 11]]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn supplier_intent(invoice: &str, payer: &str, balance: Decimal, applied: Decimal) -> PaymentLineIntent {
    PaymentLineIntent {
        invoice_id: invoice.into(),
        payer_id: payer.into(),
        invoice_kind: InvoiceKind::SupplierInvoice,
        state: InvoiceState::Open,
        currency: Currency::new("USD"),
        balance_due: Amount::new(balance).unwrap(),
        amount_applied: Amount::new(applied).unwrap(),
        payment_difference: Decimal::ZERO,
        handling: Handling::KeepOpen,
        writeoff_account: None,
        payment_method: None,
        reference_number: format!("BILL-{invoice}"),
    }
}

/// A supplier batch of `size` intents spread over `payers` payers, with cent
/// amounts and roughly one intent in five left unselected.
pub fn random_supplier_batch(size: usize, payers: u32) -> Vec<PaymentLineIntent> {
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|i| {
            let balance_cents: i64 = rng.gen_range(1..=100_000);
            let applied_cents = if rng.gen_range(0..5) == 0 {
                0
            } else {
                rng.gen_range(1..=balance_cents)
            };
            let payer = format!("S{}", rng.gen_range(1..=payers));
            supplier_intent(
                &i.to_string(),
                &payer,
                Decimal::new(balance_cents, 2),
                Decimal::new(applied_cents, 2),
            )
        })
        .collect()
}
