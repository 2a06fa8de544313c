use serde::Serialize;
use tally_core::{Balance, LedgerError, Transaction, TransactionRepository};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListing {
    pub transactions: Vec<Transaction>,
    pub balance: Balance,
}

pub struct ListTransactionsService<T> {
    transactions: T,
}

impl<T: TransactionRepository> ListTransactionsService<T> {
    pub fn new(transactions: T) -> Self {
        Self { transactions }
    }

    pub async fn execute(&self) -> Result<TransactionListing, LedgerError> {
        let transactions = self.transactions.find_all().await?;
        let balance = Balance::from_transactions(&transactions);
        Ok(TransactionListing {
            transactions,
            balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{Category, CategoryRepository, Money, TransactionType};
    use tally_storage::{create_db, SqliteCategoryRepository, SqliteTransactionRepository};

    #[tokio::test]
    async fn lists_with_balance() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("ledger.db")).await.unwrap();
        let categories = SqliteCategoryRepository::new(pool.clone());
        let transactions = SqliteTransactionRepository::new(pool);

        let work = Category::new("Work");
        categories.insert(&work).await.unwrap();
        transactions
            .bulk_insert(&[
                Transaction::new("Pay", TransactionType::Income, Money::from_cents(2000), work.clone()),
                Transaction::new("Lunch", TransactionType::Outcome, Money::from_cents(750), work),
            ])
            .await
            .unwrap();

        let listing = ListTransactionsService::new(transactions).execute().await.unwrap();
        assert_eq!(listing.transactions.len(), 2);
        assert_eq!(listing.balance.income, Money::from_cents(2000));
        assert_eq!(listing.balance.outcome, Money::from_cents(750));
        assert_eq!(listing.balance.total, Money::from_cents(1250));
    }
}
