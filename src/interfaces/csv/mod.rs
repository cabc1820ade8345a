//! CSV input of payment intents and CSV output of posted payments.

pub mod intent_reader;
pub mod payment_writer;
