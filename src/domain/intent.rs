use super::ids::{AccountId, InvoiceId, PartnerId, PaymentMethodId};
use super::invoice::{InvoiceKind, InvoiceRecord, InvoiceState, PartnerType};
use super::money::{Amount, Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What happens to the residual difference once a customer invoice is settled.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum Handling {
    #[default]
    KeepOpen,
    MarkFullyPaid,
}

/// One invoice touched by a batch payment run, together with the amount the
/// user chose to settle now.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentLineIntent {
    pub invoice_id: InvoiceId,
    pub payer_id: PartnerId,
    pub invoice_kind: InvoiceKind,
    pub state: InvoiceState,
    pub currency: Currency,
    pub balance_due: Amount,
    pub amount_applied: Amount,
    /// `balance_due - amount_applied`; only tracked for customer lines.
    #[serde(default)]
    pub payment_difference: Decimal,
    #[serde(default)]
    pub handling: Handling,
    pub writeoff_account: Option<AccountId>,
    pub payment_method: Option<PaymentMethodId>,
    pub reference_number: String,
}

impl PaymentLineIntent {
    /// Builds an unselected line for `invoice`: nothing applied yet, the whole
    /// residual still open.
    pub fn from_invoice(invoice: &InvoiceRecord) -> Self {
        let mut intent = Self {
            invoice_id: invoice.id.clone(),
            payer_id: invoice.partner.clone(),
            invoice_kind: invoice.kind,
            state: invoice.state,
            currency: invoice.currency.clone(),
            balance_due: invoice.residual,
            amount_applied: Amount::ZERO,
            payment_difference: Decimal::ZERO,
            handling: Handling::KeepOpen,
            writeoff_account: None,
            payment_method: None,
            reference_number: invoice.number.clone(),
        };
        intent.refresh_difference();
        intent
    }

    pub fn partner_type(&self) -> PartnerType {
        self.invoice_kind.partner_type()
    }

    pub fn is_customer(&self) -> bool {
        self.partner_type() == PartnerType::Customer
    }

    pub fn is_selected(&self) -> bool {
        !self.amount_applied.is_zero()
    }

    /// Changes the settled amount, keeping the customer-side difference in step.
    pub fn set_amount_applied(&mut self, amount: Amount) {
        self.amount_applied = amount;
        self.refresh_difference();
    }

    /// Signed contribution to the batch net total.
    pub fn signed_amount(&self) -> Decimal {
        self.amount_applied.value() * Decimal::from(self.invoice_kind.sign())
    }

    pub(crate) fn refresh_difference(&mut self) {
        if self.is_customer() {
            self.payment_difference = self.balance_due.value() - self.amount_applied.value();
        }
    }

    /// Rounds both amounts to the currency's minor units.
    pub(crate) fn normalize_amounts(&mut self) {
        self.balance_due = self.balance_due.rounded_for(&self.currency);
        self.amount_applied = self.amount_applied.rounded_for(&self.currency);
        self.refresh_difference();
    }
}
