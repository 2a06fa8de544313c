use serde::Serialize;
use std::path::Path;
use tally::{
    CreateTransactionRequest, CreateTransactionService, ImportTransactionsService,
    ListTransactionsService,
};
use tally_core::{Balance, LedgerError, Money, Transaction, TransactionType};
use tally_import::CsvImportProfile;
use tally_storage::{DbPool, SqliteCategoryRepository, SqliteTransactionRepository, StorageError};

#[derive(Debug, Serialize)]
pub struct CommandError {
    pub message: String,
    pub status: u16,
}

impl From<LedgerError> for CommandError {
    fn from(e: LedgerError) -> Self {
        CommandError {
            status: e.status_code(),
            message: e.to_string(),
        }
    }
}

impl From<StorageError> for CommandError {
    fn from(e: StorageError) -> Self {
        LedgerError::from(e).into()
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionOutput {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub value: String,
    pub category: String,
    pub created_at: String,
}

impl From<Transaction> for TransactionOutput {
    fn from(t: Transaction) -> Self {
        TransactionOutput {
            id: t.id.to_string(),
            title: t.title,
            kind: t.kind,
            value: amount(t.value),
            category: t.category.title,
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceOutput {
    pub income: String,
    pub outcome: String,
    pub total: String,
}

impl From<Balance> for BalanceOutput {
    fn from(b: Balance) -> Self {
        BalanceOutput {
            income: amount(b.income),
            outcome: amount(b.outcome),
            total: amount(b.total),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub transactions: Vec<TransactionOutput>,
    pub balance: BalanceOutput,
}

#[derive(Debug, Serialize)]
pub struct MigrationOutput {
    pub applied: Vec<&'static str>,
    pub reverted: Option<&'static str>,
}

fn amount(m: Money) -> String {
    format!("{:.2}", m.as_decimal())
}

fn repositories(db: &DbPool) -> (SqliteTransactionRepository, SqliteCategoryRepository) {
    (
        SqliteTransactionRepository::new(db.clone()),
        SqliteCategoryRepository::new(db.clone()),
    )
}

pub async fn create_transaction(
    db: &DbPool,
    request: CreateTransactionRequest,
) -> Result<TransactionOutput, CommandError> {
    let (transactions, categories) = repositories(db);
    let created = CreateTransactionService::new(transactions, categories)
        .execute(request)
        .await?;
    Ok(created.into())
}

pub async fn import_transactions(
    db: &DbPool,
    path: &Path,
    profile: CsvImportProfile,
) -> Result<Vec<TransactionOutput>, CommandError> {
    let (transactions, categories) = repositories(db);
    let imported = ImportTransactionsService::new(transactions, categories, profile)
        .execute(path)
        .await?;
    Ok(imported.into_iter().map(TransactionOutput::from).collect())
}

pub async fn get_transactions(db: &DbPool) -> Result<ListOutput, CommandError> {
    let listing = ListTransactionsService::new(SqliteTransactionRepository::new(db.clone()))
        .execute()
        .await?;
    Ok(ListOutput {
        transactions: listing
            .transactions
            .into_iter()
            .map(TransactionOutput::from)
            .collect(),
        balance: listing.balance.into(),
    })
}

pub async fn get_balance(db: &DbPool) -> Result<BalanceOutput, CommandError> {
    let listing = ListTransactionsService::new(SqliteTransactionRepository::new(db.clone()))
        .execute()
        .await?;
    Ok(listing.balance.into())
}

pub async fn migrate_up(db: &DbPool) -> Result<MigrationOutput, CommandError> {
    let applied = tally_storage::run_migrations(db).await?;
    Ok(MigrationOutput {
        applied,
        reverted: None,
    })
}

pub async fn migrate_down(db: &DbPool) -> Result<MigrationOutput, CommandError> {
    let reverted = tally_storage::revert_last_migration(db).await?;
    Ok(MigrationOutput {
        applied: Vec::new(),
        reverted,
    })
}
