pub mod balance;
pub mod category;
pub mod error;
pub mod money;
pub mod repository;
pub mod transaction;

pub use balance::Balance;
pub use category::{Category, CategoryId};
pub use error::{LedgerError, RepositoryError};
pub use money::{Money, ParseMoneyError};
pub use repository::{CategoryRepository, TransactionRepository};
pub use transaction::{ParseTransactionTypeError, Transaction, TransactionId, TransactionType};
