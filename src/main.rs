//! Rebalancer - overflow inventory redistribution batch tool

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rebalancer::{
    config::AppConfig,
    ingest::{Ingester, SourceSystem},
    repository::{seed, Repository},
    services::{ils::SierraService, sheets::GoogleSheetsService, Services},
};

#[derive(Parser, Debug)]
#[command(name = "rebalancer")]
#[command(about = "Redistribute overflow inventory between library branches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the store schema and seed the code tables
    InitStore,
    /// Import branch records from a JSON file
    LoadBranches {
        /// Path to a JSON array of {system, code, label} entries
        file: PathBuf,
    },
    /// Ingest an ILS export file into the store
    Ingest {
        /// Source system the export came from
        #[arg(value_enum)]
        system: SourceSystem,
        /// Path to the export file
        file: PathBuf,
    },
    /// Publish a shopping-cart spreadsheet from uncarted items
    CreateCart {
        #[arg(value_enum)]
        system: SourceSystem,
    },
    /// Read staff destination selections back from a cart
    PullSelections {
        /// Cart to read; defaults to the latest
        #[arg(long)]
        cart_id: Option<i64>,
    },
    /// Place ILS holds for staff-selected items
    IssueHolds {
        /// Cart to distribute; defaults to the latest
        #[arg(long)]
        cart_id: Option<i64>,
    },
    /// List holds currently on the batch account
    ListHolds {
        #[arg(long, default_value_t = 300)]
        limit: usize,
    },
    /// Remove every hold from the batch account
    ClearHolds,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("rebalancer={}", config.logging.level).into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting rebalancer v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool and bring the schema up to date
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let repository = Repository::new(pool.clone());
    let sheets = Arc::new(GoogleSheetsService::new(config.sheets.clone()));
    let ils = Arc::new(SierraService::new(config.ils.clone()));
    let services = Services::new(repository, &config, sheets, ils);

    match cli.command {
        Command::InitStore => {
            seed::seed_store(&pool).await?;
            tracing::info!("store initialized and seeded");
        }
        Command::LoadBranches { file } => {
            let loaded = seed::load_branches(&pool, &file).await?;
            tracing::info!(loaded, "branch records imported");
        }
        Command::Ingest { system, file } => {
            let report = Ingester::new(pool.clone(), system).ingest_file(&file).await?;
            println!(
                "{}: read {}, inserted {}, skipped {}, new shelf codes {}",
                system,
                report.rows_read,
                report.rows_inserted,
                report.rows_skipped,
                report.new_shelf_codes
            );
        }
        Command::CreateCart { system } => {
            let published = services.cart.create_cart(system).await?;
            println!(
                "cart {} published as sheet {} with {} items",
                published.cart_id, published.sheet_id, published.items_listed
            );
        }
        Command::PullSelections { cart_id } => {
            let report = services.selections.pull_selections(cart_id).await?;
            println!(
                "rows seen {}, holds updated {}, unmatched {}",
                report.rows_seen, report.holds_updated, report.unmatched_items
            );
        }
        Command::IssueHolds { cart_id } => {
            let report = services.distributor.issue_holds(cart_id).await?;
            println!(
                "holds placed {}, skipped {}",
                report.holds_placed, report.holds_skipped
            );
        }
        Command::ListHolds { limit } => {
            for hold in services.distributor.account_holds(limit).await? {
                println!(
                    "{} {} -> {}",
                    hold.id,
                    hold.record.unwrap_or_default(),
                    hold.pickup_location.unwrap_or_default()
                );
            }
        }
        Command::ClearHolds => {
            services.distributor.clear_account_holds().await?;
            tracing::info!("batch account holds cleared");
        }
    }

    Ok(())
}
