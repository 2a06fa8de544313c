use thiserror::Error;

use super::money::Money;

/// Failure reported by a storage backend behind one of the repository traits.
#[derive(Debug, Error)]
#[error("Storage error: {0}")]
pub struct RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl RepositoryError {
    pub fn new<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RepositoryError(Box::new(source))
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("There is not enough balance to complete the transaction: requested {requested}, available {available}")]
    InsufficientBalance { requested: Money, available: Money },
    #[error("Invalid file: {0}")]
    InvalidFile(String),
    #[error("Transaction value must not be negative: {0}")]
    NegativeValue(Money),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LedgerError {
    /// HTTP-style status for callers that surface errors over a request/response boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            LedgerError::InsufficientBalance { .. }
            | LedgerError::InvalidFile(_)
            | LedgerError::NegativeValue(_) => 400,
            LedgerError::Repository(_) => 500,
        }
    }
}
