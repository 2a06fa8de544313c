use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tally::{Config, CreateTransactionRequest};
use tally_core::{Money, TransactionType};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Personal income/outcome ledger with CSV import"
)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, env = "TALLY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the config file
    #[arg(long, env = "TALLY_DATABASE", global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a single transaction
    Create {
        #[arg(long)]
        title: String,
        /// Non-negative decimal amount, e.g. 12.50
        #[arg(long)]
        value: Money,
        /// `income` or `outcome`
        #[arg(long = "type")]
        kind: TransactionType,
        /// Category title; created if it does not exist yet
        #[arg(long)]
        category: String,
    },
    /// Import transactions from a CSV file with title, value, type, category columns
    Import { file: PathBuf },
    /// List all transactions with the current balance
    #[command(alias = "ls")]
    List,
    /// Show income, outcome and total
    Balance,
    /// Apply or revert schema migrations
    #[command(subcommand)]
    Migrate(MigrateCommands),
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Apply every pending migration
    Up,
    /// Revert the most recently applied migration
    Down,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::default_path);
    let config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let db_path = config.database_path(cli.database.as_deref())?;
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }
    tracing::debug!("Using database {}", db_path.display());

    match cli.command {
        Commands::Create {
            title,
            value,
            kind,
            category,
        } => {
            let db = tally_storage::create_db(&db_path).await?;
            let request = CreateTransactionRequest {
                title,
                value,
                kind,
                category,
            };
            emit(commands::create_transaction(&db, request).await)
        }
        Commands::Import { file } => {
            let db = tally_storage::create_db(&db_path).await?;
            emit(commands::import_transactions(&db, &file, config.import).await)
        }
        Commands::List => {
            let db = tally_storage::create_db(&db_path).await?;
            emit(commands::get_transactions(&db).await)
        }
        Commands::Balance => {
            let db = tally_storage::create_db(&db_path).await?;
            emit(commands::get_balance(&db).await)
        }
        // Migration commands must not auto-apply the schema first.
        Commands::Migrate(MigrateCommands::Up) => {
            let db = tally_storage::open_db(&db_path).await?;
            emit(commands::migrate_up(&db).await)
        }
        Commands::Migrate(MigrateCommands::Down) => {
            let db = tally_storage::open_db(&db_path).await?;
            emit(commands::migrate_down(&db).await)
        }
    }
}

/// Prints a successful result as JSON on stdout, or the error on stderr and exits non-zero.
fn emit<T: Serialize>(result: Result<T, CommandError>) -> anyhow::Result<()> {
    match result {
        Ok(value) => print_json(&value),
        Err(e) => {
            tracing::error!(status = e.status, "{}", e.message);
            eprintln!("{}", serde_json::to_string_pretty(&e)?);
            std::process::exit(1);
        }
    }
}
