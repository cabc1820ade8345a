use super::ids::{InvoiceId, PartnerId};
use super::money::{Amount, Currency};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    CustomerInvoice,
    CustomerRefund,
    SupplierInvoice,
    SupplierRefund,
}

impl InvoiceKind {
    pub fn partner_type(&self) -> PartnerType {
        match self {
            InvoiceKind::CustomerInvoice | InvoiceKind::CustomerRefund => PartnerType::Customer,
            InvoiceKind::SupplierInvoice | InvoiceKind::SupplierRefund => PartnerType::Supplier,
        }
    }

    /// Invoice amounts are unsigned; this tells whether money comes in (+1) or goes out (-1).
    pub fn sign(&self) -> i8 {
        match self {
            InvoiceKind::CustomerInvoice | InvoiceKind::SupplierRefund => 1,
            InvoiceKind::SupplierInvoice | InvoiceKind::CustomerRefund => -1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PartnerType {
    Customer,
    Supplier,
}

impl fmt::Display for PartnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartnerType::Customer => f.write_str("customer"),
            PartnerType::Supplier => f.write_str("supplier"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceState {
    Draft,
    Open,
    Paid,
    Cancelled,
}

impl fmt::Display for InvoiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceState::Draft => "draft",
            InvoiceState::Open => "open",
            InvoiceState::Paid => "paid",
            InvoiceState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// An invoice as resolved by the host ERP's data layer.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub number: String,
    pub kind: InvoiceKind,
    pub state: InvoiceState,
    pub partner: PartnerId,
    /// The partner's commercial entity, used for the batch summary.
    pub commercial_partner: PartnerId,
    pub currency: Currency,
    /// Outstanding amount still owed on the invoice.
    pub residual: Amount,
}
