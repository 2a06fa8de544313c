//! Ledger operations, each generic over the repositories it needs.

pub mod create_transaction;
pub mod import_transactions;
pub mod list_transactions;

pub use create_transaction::{CreateTransactionRequest, CreateTransactionService};
pub use import_transactions::ImportTransactionsService;
pub use list_transactions::{ListTransactionsService, TransactionListing};
