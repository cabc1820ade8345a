//! Domain types for batch payments: identifiers, money, invoices, payment
//! intents, aggregated payments, and the ports to the host ERP.

pub mod ids;
pub mod intent;
pub mod invoice;
pub mod money;
pub mod payment;
pub mod ports;
pub mod words;
