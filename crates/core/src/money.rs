use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;
use thiserror::Error;

/// A monetary amount with two decimal places of precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid amount: '{0}'")]
pub struct ParseMoneyError(pub String);

/// Largest magnitude accepted from text, in whole units. Keeps ledger sums
/// far below the point where `Decimal` arithmetic overflows.
const MAX_PARSED_UNITS: i64 = 100_000_000_000_000;

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// `None` when the amount does not fit in an `i64` number of cents.
    pub fn to_cents(self) -> Option<i64> {
        self.0.checked_mul(Decimal::from(100))?.round().to_i64()
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed).map_err(|_| ParseMoneyError(trimmed.to_string()))?;
        if decimal.abs() > Decimal::from(MAX_PARSED_UNITS) {
            return Err(ParseMoneyError(trimmed.to_string()));
        }
        Ok(Money::from_decimal(decimal))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}
