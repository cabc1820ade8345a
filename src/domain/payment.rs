use super::ids::{AccountId, InvoiceId, PartnerId, PaymentId, PaymentMethodId};
use super::intent::Handling;
use super::invoice::{PartnerType, PaymentDirection};
use super::money::{Amount, Currency};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How a single invoice is settled inside an aggregated payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "side", rename_all = "lowercase")]
pub enum LineSettlement {
    Customer {
        amount: Amount,
        handling: Handling,
        payment_difference: Decimal,
        writeoff_account: Option<AccountId>,
    },
    Supplier {
        amount: Amount,
    },
}

impl LineSettlement {
    pub fn amount(&self) -> Amount {
        match self {
            LineSettlement::Customer { amount, .. } | LineSettlement::Supplier { amount } => *amount,
        }
    }
}

/// One payment per payer, settling every invoice of that payer selected in the batch.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct AggregatedPayment {
    pub payer_id: PartnerId,
    pub partner_type: PartnerType,
    pub total_amount: Amount,
    pub amount_in_words: String,
    pub memo: String,
    pub line_settlements: BTreeMap<InvoiceId, LineSettlement>,
    /// Last payment method seen for this payer.
    pub payment_method: Option<PaymentMethodId>,
    /// Set when the payer's intents named more than one payment method.
    pub payment_method_conflict: bool,
}

impl AggregatedPayment {
    pub fn invoice_ids(&self) -> impl Iterator<Item = &InvoiceId> {
        self.line_settlements.keys()
    }
}

/// Aggregated payments keyed by payer, iterated in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentGroups {
    partner_type: PartnerType,
    currency: Currency,
    net_total: Decimal,
    payments: Vec<AggregatedPayment>,
    index: HashMap<PartnerId, usize>,
}

impl PaymentGroups {
    pub fn new(partner_type: PartnerType, currency: Currency) -> Self {
        Self {
            partner_type,
            currency,
            net_total: Decimal::ZERO,
            payments: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn get(&self, payer: &PartnerId) -> Option<&AggregatedPayment> {
        self.index.get(payer).map(|&i| &self.payments[i])
    }

    pub(crate) fn get_mut(&mut self, payer: &PartnerId) -> Option<&mut AggregatedPayment> {
        match self.index.get(payer) {
            Some(&i) => self.payments.get_mut(i),
            None => None,
        }
    }

    pub(crate) fn insert(&mut self, payment: AggregatedPayment) {
        self.index
            .insert(payment.payer_id.clone(), self.payments.len());
        self.payments.push(payment);
    }

    pub(crate) fn add_signed(&mut self, amount: Decimal) {
        self.net_total += amount;
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregatedPayment> {
        self.payments.iter()
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    pub fn partner_type(&self) -> PartnerType {
        self.partner_type
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Sum of the signed contributions of every settled intent.
    pub fn net_total(&self) -> Decimal {
        self.net_total
    }

    pub fn direction(&self) -> PaymentDirection {
        if self.net_total > Decimal::ZERO {
            PaymentDirection::Inbound
        } else {
            PaymentDirection::Outbound
        }
    }

    /// Sum of every group's total.
    pub fn total_amount(&self) -> Amount {
        self.payments.iter().map(|p| p.total_amount).sum()
    }

    pub fn into_payments(self) -> Vec<AggregatedPayment> {
        self.payments
    }
}

/// What the posting service needs to persist one aggregated payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentRequest {
    pub journal: String,
    pub payment_date: NaiveDate,
    pub communication: String,
    pub currency: Currency,
    pub partner: PartnerId,
    pub partner_type: PartnerType,
    pub direction: PaymentDirection,
    pub amount: Amount,
    pub payment_method: Option<PaymentMethodId>,
    pub invoice_ids: Vec<InvoiceId>,
    /// Only filled when paying by check.
    pub check_amount_in_words: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PostedPayment {
    pub payer: PartnerId,
    pub payment_id: PaymentId,
    pub partner_type: PartnerType,
    pub amount: Amount,
    pub currency: Currency,
    pub memo: String,
    pub invoice_ids: Vec<InvoiceId>,
}
