use artshop::application::engine::{Backends, StoreEngine};
use artshop::config::{DEFAULT_PAGE_SIZE, EngineConfig};
use artshop::infrastructure::notifications::LogNotifier;
use artshop::infrastructure::payments::TestCardProcessor;
#[cfg(feature = "storage-rocksdb")]
use artshop::infrastructure::rocksdb::RocksDBStore;
use artshop::interfaces::commands::{CommandRunner, read_commands};
use artshop::interfaces::csv::catalog_reader::CatalogReader;
use artshop::interfaces::csv::report_writer::ReportWriter;
use artshop::telemetry::{self, LogFormat};
use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    Orders,
    Catalog,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON-lines command script (place_order, confirm_payment, update_status, ...)
    commands: Option<PathBuf>,

    /// Catalog CSV to load before running commands
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "ARTSHOP_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Report written to stdout once all commands have run
    #[arg(long, value_enum, default_value_t = Report::Orders)]
    report: Report,

    /// Upper bound on a single payment processor call
    #[arg(long, env = "ARTSHOP_PAYMENT_TIMEOUT_MS", default_value_t = 5_000)]
    payment_timeout_ms: u64,

    /// Default listing page size
    #[arg(long, env = "ARTSHOP_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    #[arg(long, env = "ARTSHOP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn open_backends(db_path: Option<PathBuf>) -> Result<Backends> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Backends {
                catalog: Box::new(store.clone()),
                orders: Box::new(store.clone()),
                contacts: Box::new(store),
            })
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Backends::in_memory())
        }
        None => Ok(Backends::in_memory()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    let config = EngineConfig::default()
        .with_payment_timeout(Duration::from_millis(cli.payment_timeout_ms))
        .with_default_page_size(cli.page_size);
    let engine = StoreEngine::new(
        open_backends(cli.db_path)?,
        Box::new(TestCardProcessor::new()),
        Box::new(LogNotifier),
        config,
    );

    if let Some(path) = cli.catalog {
        let file = File::open(path).into_diagnostic()?;
        let mut loaded = 0usize;
        for (index, product) in CatalogReader::new(file).products().enumerate() {
            let row = index + 1;
            match product {
                Ok(product) => match engine.import_product(product).await {
                    Ok(_) => loaded += 1,
                    Err(e) => tracing::warn!(row, error = %e, "skipping catalog row"),
                },
                Err(e) => tracing::warn!(row, error = %e, "skipping catalog row"),
            }
        }
        tracing::info!(loaded, "catalog loaded");
    }

    if let Some(path) = cli.commands {
        let file = File::open(path).into_diagnostic()?;
        let mut runner = CommandRunner::new(&engine);
        for (line, command) in read_commands(BufReader::new(file)) {
            let command = match command {
                Ok(command) => command,
                Err(e) => {
                    tracing::error!(line, error = %e, "unreadable command");
                    continue;
                }
            };
            let op = command.name();
            if let Err(e) = runner.run(command).await {
                tracing::error!(line, op, error = %e, "command failed");
            }
        }
    }

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    match cli.report {
        Report::Orders => {
            let orders = engine.export_orders().await.into_diagnostic()?;
            writer.write_orders(&orders).into_diagnostic()?;
        }
        Report::Catalog => {
            let products = engine.stock_levels().await.into_diagnostic()?;
            writer.write_stock(&products).into_diagnostic()?;
        }
    }

    Ok(())
}
