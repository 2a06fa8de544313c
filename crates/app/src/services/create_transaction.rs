use serde::{Deserialize, Serialize};
use tally_core::{
    Balance, Category, CategoryRepository, LedgerError, Money, Transaction, TransactionRepository,
    TransactionType,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub title: String,
    pub value: Money,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Category title; created on first use.
    pub category: String,
}

/// Records a single transaction after checking it against the current balance.
///
/// The balance check and the inserts are separate round trips, so two
/// concurrent outcomes can both pass the check.
pub struct CreateTransactionService<T, C> {
    transactions: T,
    categories: C,
}

impl<T, C> CreateTransactionService<T, C>
where
    T: TransactionRepository,
    C: CategoryRepository,
{
    pub fn new(transactions: T, categories: C) -> Self {
        Self {
            transactions,
            categories,
        }
    }

    pub async fn execute(&self, request: CreateTransactionRequest) -> Result<Transaction, LedgerError> {
        if request.value.is_negative() {
            return Err(LedgerError::NegativeValue(request.value));
        }

        let existing = self.transactions.find_all().await?;
        let balance = Balance::from_transactions(&existing);

        if request.kind == TransactionType::Outcome && request.value > balance.total {
            tracing::warn!(
                requested = %request.value,
                available = %balance.total,
                "Rejected outcome exceeding balance"
            );
            return Err(LedgerError::InsufficientBalance {
                requested: request.value,
                available: balance.total,
            });
        }

        let category = match self.categories.find_by_title(&request.category).await? {
            Some(category) => category,
            None => {
                let category = Category::new(&request.category);
                self.categories.insert(&category).await?;
                tracing::info!(title = %category.title, "Created category");
                category
            }
        };

        let transaction = Transaction::new(&request.title, request.kind, request.value, category);
        self.transactions.insert(&transaction).await?;

        tracing::info!(
            id = %transaction.id,
            kind = %transaction.kind,
            value = %transaction.value,
            "Created transaction"
        );
        Ok(transaction)
    }
}
