use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

const HEADER: &str = "invoice_id, payer_id, invoice_kind, state, currency, balance_due, amount_applied, handling, writeoff_account, payment_method, reference_number";

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "{HEADER}").unwrap();
    writeln!(csv, "1, S1, supplier_invoice, open, USD, 100.0, 100.0, , , , B1").unwrap();

    let mut cmd = Command::new(cargo_bin!("paybatch"));
    cmd.arg(csv.path()).arg("--ledger-path").arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Persistent run ledger requested via --ledger-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory ledger."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "{HEADER}").unwrap();
    writeln!(csv, "1, S1, supplier_invoice, open, USD, 100.0, 100.0, , , , B1").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("paybatch"));
    cmd.arg(csv.path()).arg("--ledger-path").arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
