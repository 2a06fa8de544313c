//! Conversions between domain values and their TEXT column representation.
//!
//! Money is stored as an exact decimal string (`"1200.5"`), never as a float.
//! Timestamps are RFC 3339 in UTC with a fixed nine-digit fraction so that
//! they round-trip exactly and lexical order matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tally_core::{Money, TransactionType};
use uuid::Uuid;

use crate::error::StorageError;

pub fn encode_money(value: Money) -> String {
    value.as_decimal().normalize().to_string()
}

pub fn decode_money(raw: &str) -> Result<Money, StorageError> {
    Decimal::from_str(raw)
        .map(Money::from_decimal)
        .map_err(|_| StorageError::Decode {
            column: "value",
            value: raw.to_string(),
        })
}

pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_timestamp(column: &'static str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| StorageError::Decode {
            column,
            value: raw.to_string(),
        })
}

pub fn decode_uuid(column: &'static str, raw: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(raw).map_err(|_| StorageError::Decode {
        column,
        value: raw.to_string(),
    })
}

pub fn decode_type(raw: &str) -> Result<TransactionType, StorageError> {
    raw.parse().map_err(|_| StorageError::Decode {
        column: "type",
        value: raw.to_string(),
    })
}
