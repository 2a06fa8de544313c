use serde::{Deserialize, Serialize};

use super::money::Money;
use super::transaction::{Transaction, TransactionType};

/// Aggregate of a set of transactions. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub income: Money,
    pub outcome: Money,
    pub total: Money,
}

impl Balance {
    pub fn zero() -> Self {
        Balance {
            income: Money::zero(),
            outcome: Money::zero(),
            total: Money::zero(),
        }
    }

    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let (income, outcome) = transactions.into_iter().fold(
            (Money::zero(), Money::zero()),
            |(income, outcome), tx| match tx.kind {
                TransactionType::Income => (income + tx.value, outcome),
                TransactionType::Outcome => (income, outcome + tx.value),
            },
        );

        Balance {
            income,
            outcome,
            total: income - outcome,
        }
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn tx(kind: TransactionType, cents: i64) -> Transaction {
        Transaction::new("t", kind, Money::from_cents(cents), Category::new("c"))
    }

    #[test]
    fn empty_is_zero() {
        let none: Vec<Transaction> = Vec::new();
        let balance = Balance::from_transactions(&none);
        assert_eq!(balance, Balance::zero());
        assert!(balance.total.is_zero());
    }

    #[test]
    fn sums_by_type() {
        let txs = vec![
            tx(TransactionType::Income, 500_000),
            tx(TransactionType::Outcome, 120_000),
            tx(TransactionType::Income, 10_050),
            tx(TransactionType::Outcome, 25),
        ];
        let balance = Balance::from_transactions(&txs);
        assert_eq!(balance.income, Money::from_cents(510_050));
        assert_eq!(balance.outcome, Money::from_cents(120_025));
        assert_eq!(balance.total, Money::from_cents(390_025));
    }

    #[test]
    fn total_is_income_minus_outcome() {
        let txs = vec![
            tx(TransactionType::Outcome, 300),
            tx(TransactionType::Income, 100),
        ];
        let balance = Balance::from_transactions(&txs);
        assert_eq!(balance.total, balance.income - balance.outcome);
        assert!(balance.total.is_negative());
        assert!(!balance.income.is_negative());
        assert!(!balance.outcome.is_negative());
    }

    #[test]
    fn order_does_not_matter() {
        let mut txs = vec![
            tx(TransactionType::Income, 700),
            tx(TransactionType::Outcome, 200),
            tx(TransactionType::Income, 33),
        ];
        let forward = Balance::from_transactions(&txs);
        txs.reverse();
        assert_eq!(Balance::from_transactions(&txs), forward);
    }
}
