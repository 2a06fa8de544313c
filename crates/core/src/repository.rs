//! Data-access seams between the ledger services and a storage backend.

use async_trait::async_trait;

use super::category::Category;
use super::error::RepositoryError;
use super::transaction::Transaction;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Exact, case-sensitive title match.
    async fn find_by_title(&self, title: &str) -> Result<Option<Category>, RepositoryError>;

    /// Every stored category whose title is one of `titles`.
    async fn find_by_titles(&self, titles: &[String]) -> Result<Vec<Category>, RepositoryError>;

    async fn insert(&self, category: &Category) -> Result<(), RepositoryError>;

    /// Inserts all categories or none of them.
    async fn bulk_insert(&self, categories: &[Category]) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// All transactions in insertion order, each with its category loaded.
    async fn find_all(&self) -> Result<Vec<Transaction>, RepositoryError>;

    async fn insert(&self, transaction: &Transaction) -> Result<(), RepositoryError>;

    /// Inserts all transactions or none of them, preserving slice order.
    async fn bulk_insert(&self, transactions: &[Transaction]) -> Result<(), RepositoryError>;
}
