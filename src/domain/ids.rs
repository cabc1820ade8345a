//! Opaque identifiers handed to us by the host ERP.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(
    /// Identifier of an invoice or vendor bill.
    InvoiceId
);
opaque_id!(
    /// Identifier of the commercial partner (customer or supplier) paying or being paid.
    PartnerId
);
opaque_id!(
    /// Identifier of a payment instrument such as a check or a bank transfer.
    PaymentMethodId
);
opaque_id!(
    /// Account a writeoff difference is posted against.
    AccountId
);
opaque_id!(
    /// Identifier returned by the posting service for a persisted payment.
    PaymentId
);
