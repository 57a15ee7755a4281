use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use token_sweeper::application::scheduler::run_scheduled;
use token_sweeper::application::sweep::{SweepSettings, Sweeper};
use token_sweeper::config::SweeperConfig;
use token_sweeper::domain::ports::{OrderStore, OrderStoreBox};
use token_sweeper::infrastructure::adyen::AdyenRecurringClient;
use token_sweeper::infrastructure::in_memory::InMemoryOrderStore;
#[cfg(feature = "storage-rocksdb")]
use token_sweeper::infrastructure::rocksdb::RocksDBOrderStore;
use token_sweeper::infrastructure::throttle::SleepThrottle;
use token_sweeper::interfaces::csv::order_reader::OrderReader;
use token_sweeper::interfaces::csv::outcome_writer::OutcomeWriter;
use token_sweeper::observability::init_tracing;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short, default_value = "token-sweeper.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single sweep and print per-order outcomes as CSV
    Sweep(StoreArgs),
    /// Run sweeps forever on the configured interval
    Schedule(StoreArgs),
}

#[derive(Args)]
struct StoreArgs {
    /// Orders CSV to load into the store before sweeping
    orders: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SweeperConfig::from_file(&cli.config).into_diagnostic()?;
    init_tracing(&config.logging).into_diagnostic()?;

    let args = match &cli.command {
        Command::Sweep(args) | Command::Schedule(args) => args,
    };

    let store = open_store(args.db_path.as_deref())?;
    if let Some(orders) = &args.orders {
        import_orders(store.as_ref(), orders).await?;
    }

    let gateway = AdyenRecurringClient::from_config(&config.gateway).into_diagnostic()?;
    let sweeper = Sweeper::new(
        store,
        Box::new(gateway),
        Arc::new(SleepThrottle),
        SweepSettings::from_config(&config),
    );

    match cli.command {
        Command::Sweep(_) => {
            let stdout = io::stdout();
            let mut writer = OutcomeWriter::new(stdout.lock());
            sweeper.run_once(&mut writer).await.into_diagnostic()?;
        }
        Command::Schedule(_) => {
            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Shutdown requested, finishing the order in flight");
                        trigger.cancel();
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
                }
            });
            run_scheduled(&sweeper, &config.schedule, &cancel).await;
        }
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<&Path>) -> Result<OrderStoreBox> {
    match db_path {
        Some(path) => {
            let store = RocksDBOrderStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        None => Ok(Box::new(InMemoryOrderStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<&Path>) -> Result<OrderStoreBox> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Box::new(InMemoryOrderStore::new()))
}

async fn import_orders(store: &dyn OrderStore, path: &Path) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    let reader = OrderReader::new(file);
    let mut imported = 0u64;

    for order_result in reader.orders() {
        match order_result {
            Ok(order) => {
                store.upsert_order(order).await.into_diagnostic()?;
                imported += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed order row");
            }
        }
    }

    tracing::info!(imported, path = %path.display(), "Imported orders");
    Ok(())
}
