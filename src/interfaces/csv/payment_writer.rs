use crate::domain::invoice::PartnerType;
use crate::domain::payment::PostedPayment;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PaymentRow<'a> {
    payer: &'a str,
    payment_id: &'a str,
    partner_type: PartnerType,
    amount: Decimal,
    memo: &'a str,
    invoices: String,
}

pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_payments(&mut self, payments: &[PostedPayment]) -> Result<()> {
        for payment in payments {
            let invoices: Vec<&str> = payment.invoice_ids.iter().map(|id| id.as_str()).collect();
            self.writer.serialize(PaymentRow {
                payer: payment.payer.as_str(),
                payment_id: payment.payment_id.as_str(),
                partner_type: payment.partner_type,
                amount: payment.amount.fixed_for(&payment.currency),
                memo: &payment.memo,
                invoices: invoices.join(";"),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
