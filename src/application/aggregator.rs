use crate::domain::intent::PaymentLineIntent;
use crate::domain::invoice::{InvoiceState, PartnerType};
use crate::domain::money::{Amount, Currency};
use crate::domain::payment::{AggregatedPayment, LineSettlement, PaymentGroups};
use crate::domain::ports::AmountFormatter;
use crate::error::{BatchError, Result};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

const MEMO_SEPARATOR: &str = " : ";

/// Per-run settings the user supplies alongside the selected invoices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOptions {
    /// Prefixed to every invoice reference in the memo, as `<communication>-<reference>`.
    pub communication: Option<String>,
    /// Declared check amount; the batch total must match it exactly.
    pub expected_total: Option<Decimal>,
    /// Reject payers whose intents name different payment methods instead of
    /// only warning about it.
    pub strict_payment_methods: bool,
}

/// The direction and currency every intent of a valid batch shares.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProfile {
    pub partner_type: PartnerType,
    pub currency: Currency,
}

/// Checks that a batch can be paid at all: non-empty, only open invoices, one
/// direction and one currency. Each invoice may appear once.
pub fn validate_batch(intents: &[PaymentLineIntent]) -> Result<BatchProfile> {
    let first = intents.first().ok_or(BatchError::EmptySelection)?;

    if let Some(intent) = intents.iter().find(|i| i.state != InvoiceState::Open) {
        return Err(BatchError::NotSettleable {
            invoice: intent.invoice_id.clone(),
            state: intent.state.to_string(),
        });
    }

    let partner_type = first.partner_type();
    if intents.iter().any(|i| i.partner_type() != partner_type) {
        return Err(BatchError::MixedDirection);
    }

    if let Some(intent) = intents.iter().find(|i| i.currency != first.currency) {
        return Err(BatchError::CurrencyMismatch {
            invoice: intent.invoice_id.clone(),
            expected: first.currency.to_string(),
            found: intent.currency.to_string(),
        });
    }

    let mut seen = HashSet::with_capacity(intents.len());
    if let Some(intent) = intents.iter().find(|i| !seen.insert(&i.invoice_id)) {
        return Err(BatchError::DuplicateInvoice {
            invoice: intent.invoice_id.clone(),
        });
    }

    Ok(BatchProfile {
        partner_type,
        currency: first.currency.clone(),
    })
}

/// Groups the selected intents of a batch by payer, producing one aggregated
/// payment per payer.
///
/// The whole batch is validated before anything is returned: any failure
/// discards the batch. Intents with nothing applied are skipped.
pub fn aggregate(
    intents: &[PaymentLineIntent],
    options: &BatchOptions,
    formatter: &dyn AmountFormatter,
) -> Result<PaymentGroups> {
    let profile = validate_batch(intents)?;

    let intents: Vec<PaymentLineIntent> = intents
        .iter()
        .cloned()
        .map(|mut intent| {
            intent.normalize_amounts();
            intent
        })
        .collect();

    check_settlements(&intents, &profile, options)?;

    let mut groups = PaymentGroups::new(profile.partner_type, profile.currency.clone());
    for intent in intents.iter().filter(|i| i.is_selected()) {
        groups.add_signed(intent.signed_amount());
        let fragment = memo_fragment(options.communication.as_deref(), &intent.reference_number);

        match groups.get_mut(&intent.payer_id) {
            Some(payment) => {
                payment.total_amount += intent.amount_applied;
                payment.memo.push_str(MEMO_SEPARATOR);
                payment.memo.push_str(&fragment);
                payment.amount_in_words =
                    formatter.amount_to_text(payment.total_amount, &profile.currency)?;
                payment
                    .line_settlements
                    .insert(intent.invoice_id.clone(), settlement(intent));

                if let Some(method) = &intent.payment_method {
                    if let Some(previous) = &payment.payment_method
                        && previous != method
                    {
                        if options.strict_payment_methods {
                            return Err(BatchError::ConflictingPaymentMethod {
                                payer: intent.payer_id.clone(),
                                first: previous.clone(),
                                second: method.clone(),
                            });
                        }
                        warn!(
                            payer = %intent.payer_id,
                            previous = %previous,
                            method = %method,
                            "conflicting payment methods for payer, keeping the last one"
                        );
                        payment.payment_method_conflict = true;
                    }
                    payment.payment_method = Some(method.clone());
                }
            }
            None => {
                let amount_in_words =
                    formatter.amount_to_text(intent.amount_applied, &profile.currency)?;
                let mut line_settlements = BTreeMap::new();
                line_settlements.insert(intent.invoice_id.clone(), settlement(intent));
                groups.insert(AggregatedPayment {
                    payer_id: intent.payer_id.clone(),
                    partner_type: profile.partner_type,
                    total_amount: intent.amount_applied,
                    amount_in_words,
                    memo: fragment,
                    line_settlements,
                    payment_method: intent.payment_method.clone(),
                    payment_method_conflict: false,
                });
            }
        }
    }

    debug!(
        payers = groups.len(),
        total = %groups.total_amount(),
        net = %groups.net_total(),
        "aggregated batch"
    );
    Ok(groups)
}

/// Sets every intent to settle its full balance, clearing customer differences.
pub fn auto_fill(intents: &mut [PaymentLineIntent]) {
    for intent in intents.iter_mut() {
        intent.amount_applied = intent.balance_due;
        if intent.is_customer() {
            intent.payment_difference = Decimal::ZERO;
        }
    }
}

fn check_settlements(
    intents: &[PaymentLineIntent],
    profile: &BatchProfile,
    options: &BatchOptions,
) -> Result<()> {
    if let Some(declared) = options.expected_total {
        let actual: Amount = intents.iter().map(|i| i.amount_applied).sum();
        if actual.value() != declared {
            return Err(BatchError::TotalMismatch {
                declared,
                actual: actual.value(),
            });
        }
    }

    match profile.partner_type {
        PartnerType::Customer => {
            if let Some(intent) = intents
                .iter()
                .find(|i| i.is_selected() && i.payment_method.is_none())
            {
                return Err(BatchError::MissingPaymentMethod {
                    invoice: intent.invoice_id.clone(),
                });
            }
        }
        PartnerType::Supplier => {
            if let Some(intent) = intents.iter().find(|i| i.amount_applied > i.balance_due) {
                return Err(BatchError::Overpayment {
                    invoice: intent.invoice_id.clone(),
                    applied: intent.amount_applied.value(),
                    balance: intent.balance_due.value(),
                });
            }
        }
    }
    Ok(())
}

fn memo_fragment(communication: Option<&str>, reference: &str) -> String {
    match communication.filter(|c| !c.is_empty()) {
        Some(communication) => format!("{communication}-{reference}"),
        None => reference.to_string(),
    }
}

fn settlement(intent: &PaymentLineIntent) -> LineSettlement {
    match intent.partner_type() {
        PartnerType::Customer => LineSettlement::Customer {
            amount: intent.amount_applied,
            handling: intent.handling,
            payment_difference: intent.payment_difference,
            writeoff_account: intent.writeoff_account.clone(),
        },
        PartnerType::Supplier => LineSettlement::Supplier {
            amount: intent.amount_applied,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{InvoiceId, PartnerId, PaymentMethodId};
    use crate::domain::intent::Handling;
    use crate::domain::invoice::InvoiceKind;
    use crate::domain::words::EnglishAmountFormatter;
    use rust_decimal_macros::dec;

    fn intent(
        invoice: &str,
        payer: &str,
        kind: InvoiceKind,
        balance: Decimal,
        applied: Decimal,
    ) -> PaymentLineIntent {
        let mut intent = PaymentLineIntent {
            invoice_id: invoice.into(),
            payer_id: payer.into(),
            invoice_kind: kind,
            state: InvoiceState::Open,
            currency: Currency::new("USD"),
            balance_due: Amount::new(balance).unwrap(),
            amount_applied: Amount::ZERO,
            payment_difference: Decimal::ZERO,
            handling: Handling::KeepOpen,
            writeoff_account: None,
            payment_method: None,
            reference_number: invoice.to_string(),
        };
        intent.set_amount_applied(Amount::new(applied).unwrap());
        intent
    }

    fn customer(invoice: &str, payer: &str, balance: Decimal, applied: Decimal) -> PaymentLineIntent {
        let mut intent = intent(invoice, payer, InvoiceKind::CustomerInvoice, balance, applied);
        intent.payment_method = Some("check".into());
        intent
    }

    fn supplier(invoice: &str, payer: &str, balance: Decimal, applied: Decimal) -> PaymentLineIntent {
        intent(invoice, payer, InvoiceKind::SupplierInvoice, balance, applied)
    }

    fn run(intents: &[PaymentLineIntent], options: &BatchOptions) -> Result<PaymentGroups> {
        aggregate(intents, options, &EnglishAmountFormatter::new())
    }

    #[test]
    fn test_customer_batch_with_communication() {
        let intents = vec![
            customer("A1", "P1", dec!(40), dec!(40)),
            customer("A2", "P1", dec!(60), dec!(60)),
        ];
        let options = BatchOptions {
            communication: Some("INV-BATCH".to_string()),
            ..Default::default()
        };

        let groups = run(&intents, &options).unwrap();
        assert_eq!(groups.len(), 1);
        let payment = groups.get(&PartnerId::new("P1")).unwrap();
        assert_eq!(payment.total_amount.value(), dec!(100));
        assert_eq!(payment.memo, "INV-BATCH-A1 : INV-BATCH-A2");
        assert_eq!(payment.amount_in_words, "one hundred Dollars");
        assert_eq!(payment.partner_type, PartnerType::Customer);
        assert_eq!(groups.direction(), crate::domain::invoice::PaymentDirection::Inbound);
    }

    #[test]
    fn test_memo_without_communication_keeps_input_order() {
        let intents = vec![
            supplier("B2", "S1", dec!(10), dec!(5)),
            supplier("B1", "S1", dec!(10), dec!(5)),
            supplier("B3", "S1", dec!(10), dec!(5)),
        ];
        let groups = run(&intents, &BatchOptions::default()).unwrap();
        let payment = groups.get(&PartnerId::new("S1")).unwrap();
        assert_eq!(payment.memo, "B2 : B1 : B3");
        assert_eq!(payment.amount_in_words, "fifteen Dollars");
        assert_eq!(groups.net_total(), dec!(-15));
    }

    #[test]
    fn test_zero_amount_intents_are_skipped() {
        let intents = vec![
            supplier("B1", "S1", dec!(10), dec!(10)),
            supplier("B2", "S1", dec!(10), dec!(0)),
            supplier("B3", "S2", dec!(10), dec!(0)),
        ];
        let groups = run(&intents, &BatchOptions::default()).unwrap();
        assert_eq!(groups.len(), 1);
        let payment = groups.get(&PartnerId::new("S1")).unwrap();
        assert!(payment.line_settlements.contains_key(&InvoiceId::new("B1")));
        assert!(!payment.line_settlements.contains_key(&InvoiceId::new("B2")));
        assert!(groups.get(&PartnerId::new("S2")).is_none());
    }

    #[test]
    fn test_groups_iterate_in_first_seen_order() {
        let intents = vec![
            supplier("B1", "S2", dec!(10), dec!(1)),
            supplier("B2", "S1", dec!(10), dec!(2)),
            supplier("B3", "S2", dec!(10), dec!(3)),
        ];
        let groups = run(&intents, &BatchOptions::default()).unwrap();
        let payers: Vec<&str> = groups.iter().map(|p| p.payer_id.as_str()).collect();
        assert_eq!(payers, vec!["S2", "S1"]);
        assert_eq!(
            groups.get(&PartnerId::new("S2")).unwrap().total_amount.value(),
            dec!(4)
        );
    }

    #[test]
    fn test_customer_settlement_detail() {
        let mut partial = customer("A1", "P1", dec!(100), dec!(90));
        partial.handling = Handling::MarkFullyPaid;
        partial.writeoff_account = Some("WRITEOFF".into());
        let groups = run(&[partial], &BatchOptions::default()).unwrap();
        let payment = groups.get(&PartnerId::new("P1")).unwrap();
        match &payment.line_settlements[&InvoiceId::new("A1")] {
            LineSettlement::Customer {
                amount,
                handling,
                payment_difference,
                writeoff_account,
            } => {
                assert_eq!(amount.value(), dec!(90));
                assert_eq!(*handling, Handling::MarkFullyPaid);
                assert_eq!(*payment_difference, dec!(10));
                assert_eq!(writeoff_account.as_ref().unwrap().as_str(), "WRITEOFF");
            }
            other => panic!("expected a customer settlement, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_selection() {
        assert!(matches!(
            run(&[], &BatchOptions::default()),
            Err(BatchError::EmptySelection)
        ));
    }

    #[test]
    fn test_not_settleable() {
        let mut paid = supplier("B1", "S1", dec!(10), dec!(10));
        paid.state = InvoiceState::Paid;
        assert!(matches!(
            run(&[paid], &BatchOptions::default()),
            Err(BatchError::NotSettleable { .. })
        ));
    }

    #[test]
    fn test_mixed_direction() {
        let intents = vec![
            customer("A1", "P1", dec!(10), dec!(10)),
            supplier("B1", "S1", dec!(10), dec!(10)),
        ];
        assert!(matches!(
            run(&intents, &BatchOptions::default()),
            Err(BatchError::MixedDirection)
        ));
    }

    #[test]
    fn test_currency_mismatch() {
        let mut eur = supplier("B2", "S1", dec!(10), dec!(10));
        eur.currency = Currency::new("EUR");
        let intents = vec![supplier("B1", "S1", dec!(10), dec!(10)), eur];
        match run(&intents, &BatchOptions::default()) {
            Err(BatchError::CurrencyMismatch { expected, found, .. }) => {
                assert_eq!(expected, "USD");
                assert_eq!(found, "EUR");
            }
            other => panic!("expected currency mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_invoice_rejected() {
        let intents = vec![
            supplier("B1", "S1", dec!(100), dec!(80)),
            supplier("B1", "S1", dec!(100), dec!(80)),
        ];
        match run(&intents, &BatchOptions::default()) {
            Err(BatchError::DuplicateInvoice { invoice }) => assert_eq!(invoice.as_str(), "B1"),
            other => panic!("expected duplicate invoice, got {other:?}"),
        }
    }

    #[test]
    fn test_total_mismatch_is_exact() {
        let intents = vec![
            supplier("B1", "S1", dec!(1), dec!(0.1)),
            supplier("B2", "S1", dec!(1), dec!(0.2)),
        ];
        let matching = BatchOptions {
            expected_total: Some(dec!(0.3)),
            ..Default::default()
        };
        assert!(run(&intents, &matching).is_ok());

        let off = BatchOptions {
            expected_total: Some(dec!(0.31)),
            ..Default::default()
        };
        assert!(matches!(
            run(&intents, &off),
            Err(BatchError::TotalMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_payment_method_only_for_settled_customer_lines() {
        let mut unselected = customer("A2", "P1", dec!(10), dec!(0));
        unselected.payment_method = None;
        let intents = vec![customer("A1", "P1", dec!(10), dec!(10)), unselected];
        assert!(run(&intents, &BatchOptions::default()).is_ok());

        let mut selected = customer("A3", "P1", dec!(10), dec!(5));
        selected.payment_method = None;
        assert!(matches!(
            run(&[selected], &BatchOptions::default()),
            Err(BatchError::MissingPaymentMethod { .. })
        ));
    }

    #[test]
    fn test_supplier_overpayment() {
        let intents = vec![supplier("B1", "S1", dec!(100), dec!(150))];
        assert!(matches!(
            run(&intents, &BatchOptions::default()),
            Err(BatchError::Overpayment { .. })
        ));
    }

    #[test]
    fn test_customer_overpayment_is_allowed() {
        let intents = vec![customer("A1", "P1", dec!(100), dec!(150))];
        let groups = run(&intents, &BatchOptions::default()).unwrap();
        let payment = groups.get(&PartnerId::new("P1")).unwrap();
        assert_eq!(
            payment.line_settlements[&InvoiceId::new("A1")],
            LineSettlement::Customer {
                amount: Amount::new(dec!(150)).unwrap(),
                handling: Handling::KeepOpen,
                payment_difference: dec!(-50),
                writeoff_account: None,
            }
        );
    }

    #[test]
    fn test_conflicting_payment_methods_warn_by_default() {
        let mut second = customer("A2", "P1", dec!(10), dec!(10));
        second.payment_method = Some(PaymentMethodId::new("transfer"));
        let intents = vec![customer("A1", "P1", dec!(10), dec!(10)), second];

        let groups = run(&intents, &BatchOptions::default()).unwrap();
        let payment = groups.get(&PartnerId::new("P1")).unwrap();
        assert_eq!(payment.payment_method, Some(PaymentMethodId::new("transfer")));
        assert!(payment.payment_method_conflict);

        let strict = BatchOptions {
            strict_payment_methods: true,
            ..Default::default()
        };
        assert!(matches!(
            run(&intents, &strict),
            Err(BatchError::ConflictingPaymentMethod { .. })
        ));
    }

    #[test]
    fn test_amounts_are_rounded_to_minor_units() {
        let intents = vec![
            supplier("B1", "S1", dec!(10), dec!(3.335)),
            supplier("B2", "S1", dec!(10), dec!(3.335)),
        ];
        let options = BatchOptions {
            expected_total: Some(dec!(6.68)),
            ..Default::default()
        };
        let groups = run(&intents, &options).unwrap();
        assert_eq!(groups.total_amount().value(), dec!(6.68));
    }

    #[test]
    fn test_auto_fill() {
        let mut intents = vec![
            customer("A1", "P1", dec!(10), dec!(0)),
            customer("A2", "P1", dec!(20), dec!(5)),
            customer("A3", "P2", dec!(30), dec!(0)),
        ];
        auto_fill(&mut intents);
        let applied: Vec<Decimal> = intents.iter().map(|i| i.amount_applied.value()).collect();
        assert_eq!(applied, vec![dec!(10), dec!(20), dec!(30)]);
        assert!(intents.iter().all(|i| i.payment_difference.is_zero()));

        let snapshot = intents.clone();
        auto_fill(&mut intents);
        assert_eq!(intents, snapshot);
    }
}
