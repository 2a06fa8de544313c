use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::category::Category;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn new() -> Self {
        TransactionId(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a transaction. Serialized as the lowercase tokens
/// `income` / `outcome`, which is also the storage and CSV representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown transaction type: '{0}' (expected 'income' or 'outcome')")]
pub struct ParseTransactionTypeError(pub String);

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Outcome => "outcome",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income" => Ok(TransactionType::Income),
            "outcome" => Ok(TransactionType::Outcome),
            other => Err(ParseTransactionTypeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub value: Money,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a not-yet-persisted transaction stamped with the current time.
    pub fn new(title: &str, kind: TransactionType, value: Money, category: Category) -> Self {
        let now = Utc::now();
        Transaction {
            id: TransactionId::new(),
            title: title.to_string(),
            kind,
            value,
            category,
            created_at: now,
            updated_at: now,
        }
    }
}
