use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use paybatch::application::aggregator::{BatchOptions, auto_fill};
use paybatch::application::processor::BatchProcessor;
use paybatch::config::BatchSettings;
use paybatch::domain::ids::PaymentMethodId;
use paybatch::domain::ports::RunLedgerBox;
use paybatch::infrastructure::in_memory::{InMemoryPaymentPoster, InMemoryRunLedger};
use paybatch::interfaces::csv::intent_reader::IntentReader;
use paybatch::interfaces::csv::payment_writer::PaymentWriter;
use paybatch::telemetry;
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payment intents CSV file
    input: PathBuf,

    /// Batch communication prefixed to every invoice reference in the memo
    #[arg(long)]
    communication: Option<String>,

    /// Declared check amount; the sum of applied amounts must match it exactly
    #[arg(long)]
    expected_total: Option<Decimal>,

    /// Settle every invoice for its full balance
    #[arg(long)]
    auto_fill: bool,

    /// Reject payers whose invoices name different payment methods
    #[arg(long)]
    strict_payment_methods: bool,

    /// Identifier of this batch run (defaults to the input path)
    #[arg(long)]
    run_id: Option<String>,

    /// Path to a persistent run ledger (optional). If provided, uses RocksDB.
    #[arg(long)]
    ledger_path: Option<PathBuf>,

    /// JSON settings file (journal, payment date, payment methods, currency labels)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Payment method used for payers whose invoices name none
    #[arg(long)]
    default_payment_method: Option<String>,

    /// Aggregate and print the payments without posting them
    #[arg(long)]
    dry_run: bool,

    #[arg(long, value_enum, default_value = "csv")]
    format: Format,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let mut settings = BatchSettings::load(cli.config.as_deref()).into_diagnostic()?;
    if let Some(method) = cli.default_payment_method {
        settings.default_payment_method = Some(PaymentMethodId::new(method));
    }

    let ledger: RunLedgerBox = open_ledger(cli.ledger_path).into_diagnostic()?;
    let formatter = Box::new(settings.formatter());
    let processor = BatchProcessor::new(
        Box::new(InMemoryPaymentPoster::new()),
        ledger,
        formatter,
        settings,
    );

    // Read intents
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = IntentReader::new(file);
    let mut intents = Vec::new();
    for intent in reader.intents() {
        match intent {
            Ok(intent) => intents.push(intent),
            Err(e) => eprintln!("Error reading intent: {}", e),
        }
    }
    if cli.auto_fill {
        auto_fill(&mut intents);
    }

    let options = BatchOptions {
        communication: cli.communication,
        expected_total: cli.expected_total,
        strict_payment_methods: cli.strict_payment_methods,
    };

    let stdout = io::stdout();
    if cli.dry_run {
        let groups = processor.preview(&intents, &options).into_diagnostic()?;
        let payments = groups.into_payments();
        serde_json::to_writer_pretty(stdout.lock(), &payments).into_diagnostic()?;
        println!();
        return Ok(());
    }

    let run_id = cli
        .run_id
        .unwrap_or_else(|| cli.input.display().to_string());
    let posted = processor
        .process(&run_id, &intents, &options)
        .await
        .into_diagnostic()?;

    match cli.format {
        Format::Csv => {
            let mut writer = PaymentWriter::new(stdout.lock());
            writer.write_payments(&posted).into_diagnostic()?;
        }
        Format::Json => {
            serde_json::to_writer_pretty(stdout.lock(), &posted).into_diagnostic()?;
            println!();
        }
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_ledger(path: Option<PathBuf>) -> paybatch::error::Result<RunLedgerBox> {
    use paybatch::infrastructure::rocksdb::RocksDBRunLedger;

    let ledger: RunLedgerBox = match path {
        Some(path) => Box::new(RocksDBRunLedger::open(path)?),
        None => Box::new(InMemoryRunLedger::new()),
    };
    Ok(ledger)
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_ledger(path: Option<PathBuf>) -> paybatch::error::Result<RunLedgerBox> {
    if path.is_some() {
        tracing::warn!(
            "Persistent run ledger requested via --ledger-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory ledger."
        );
    }
    Ok(Box::new(InMemoryRunLedger::new()))
}
