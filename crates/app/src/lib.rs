pub mod config;
pub mod services;

pub use config::{Config, ConfigError};
pub use services::{
    CreateTransactionRequest, CreateTransactionService, ImportTransactionsService,
    ListTransactionsService, TransactionListing,
};
