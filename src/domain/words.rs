//! Spelling out monetary amounts, as printed on checks.

use super::money::{Amount, Currency};
use super::ports::AmountFormatter;
use crate::error::{BatchError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use std::collections::HashMap;

const ONES: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 7] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
    "quintillion",
];

/// Unit and subunit labels, e.g. `("Dollars", "Cents")`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyLabels {
    pub unit: String,
    pub subunit: String,
}

impl CurrencyLabels {
    pub fn new(unit: impl Into<String>, subunit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            subunit: subunit.into(),
        }
    }
}

/// English amount-to-text, e.g. `120.50 USD` -> `one hundred twenty Dollars and fifty Cents`.
#[derive(Debug, Clone, Default)]
pub struct EnglishAmountFormatter {
    overrides: HashMap<String, CurrencyLabels>,
}

impl EnglishAmountFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the built-in labels for the given currency codes.
    pub fn with_labels(overrides: HashMap<String, CurrencyLabels>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(code, labels)| (code.to_ascii_uppercase(), labels))
            .collect();
        Self { overrides }
    }

    fn labels(&self, currency: &Currency) -> CurrencyLabels {
        if let Some(labels) = self.overrides.get(currency.code()) {
            return labels.clone();
        }
        match currency.code() {
            "USD" | "CAD" | "AUD" | "NZD" | "MXN" => CurrencyLabels::new("Dollars", "Cents"),
            "EUR" => CurrencyLabels::new("Euros", "Cents"),
            "GBP" => CurrencyLabels::new("Pounds", "Pence"),
            "JPY" => CurrencyLabels::new("Yen", "Sen"),
            "CHF" => CurrencyLabels::new("Francs", "Centimes"),
            code => CurrencyLabels::new(code, "Cents"),
        }
    }
}

impl AmountFormatter for EnglishAmountFormatter {
    fn amount_to_text(&self, amount: Amount, currency: &Currency) -> Result<String> {
        let amount = amount.rounded_for(currency).value();
        let integer = amount.trunc();
        let whole = integer.to_u64().ok_or_else(|| {
            BatchError::Formatting(format!("{amount} {currency} is too large to spell out"))
        })?;

        let labels = self.labels(currency);
        let mut text = format!("{} {}", number_to_words(whole), labels.unit);

        let scale = Decimal::from(10u64.pow(currency.minor_units()));
        let fraction = ((amount - integer) * scale).round().to_u64().unwrap_or(0);
        if fraction != 0 {
            text.push_str(&format!(
                " and {} {}",
                number_to_words(fraction),
                labels.subunit
            ));
        }
        Ok(text)
    }
}

/// Spells out a non-negative integer in English.
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut groups = Vec::new();
    let mut rest = n;
    let mut scale = 0;
    while rest > 0 {
        let chunk = rest % 1000;
        if chunk != 0 {
            let words = below_thousand(chunk);
            if SCALES[scale].is_empty() {
                groups.push(words);
            } else {
                groups.push(format!("{words} {}", SCALES[scale]));
            }
        }
        rest /= 1000;
        scale += 1;
    }
    groups.reverse();
    groups.join(" ")
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    let mut parts = Vec::new();
    if hundreds > 0 {
        parts.push(format!("{} hundred", ONES[hundreds as usize]));
    }
    if rest > 0 {
        parts.push(below_hundred(rest));
    }
    parts.join(" ")
}

fn below_hundred(n: u64) -> String {
    if n < 20 {
        ONES[n as usize].to_string()
    } else if n % 10 == 0 {
        TENS[(n / 10) as usize].to_string()
    } else {
        format!("{}-{}", TENS[(n / 10) as usize], ONES[(n % 10) as usize])
    }
}
