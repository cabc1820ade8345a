//! Application layer: batch validation and aggregation, batch preparation from
//! the invoice lookup, and the processor that posts one payment per payer.

pub mod aggregator;
pub mod batch;
pub mod processor;
