use crate::domain::ids::PaymentMethodId;
use crate::domain::words::{CurrencyLabels, EnglishAmountFormatter};
use crate::error::Result;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const DEFAULT_JOURNAL: &str = "BANK";
const DEFAULT_CHECK_METHOD: &str = "check";

/// Settings shared by every payment posted from a batch run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Journal the payments are posted in.
    pub journal: String,
    pub payment_date: NaiveDate,
    /// Used when a payer group carries no payment method of its own.
    pub default_payment_method: Option<PaymentMethodId>,
    /// Payments with this method get the amount in words printed on the check.
    pub check_payment_method: PaymentMethodId,
    /// Unit labels per currency code for the amount in words.
    pub currency_labels: HashMap<String, CurrencyLabels>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            journal: DEFAULT_JOURNAL.to_string(),
            payment_date: Local::now().date_naive(),
            default_payment_method: None,
            check_payment_method: PaymentMethodId::new(DEFAULT_CHECK_METHOD),
            currency_labels: HashMap::new(),
        }
    }
}

impl BatchSettings {
    /// Reads settings from a JSON file; missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn formatter(&self) -> EnglishAmountFormatter {
        EnglishAmountFormatter::with_labels(self.currency_labels.clone())
    }
}
