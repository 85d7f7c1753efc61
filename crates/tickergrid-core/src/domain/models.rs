//! Canonical domain models served by the API.
//!
//! These are deliberately thin: the resilience pipeline treats them as
//! opaque payloads, and the wire shape (camelCase JSON) is the contract.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Symbol, ValidationError};

/// A trading venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub code: String,
    pub name: String,
    pub timezone: String,
}

/// An industry sector grouping stocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: String,
    pub name: String,
}

/// A listed instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub symbol: Symbol,
    pub name: String,
    pub exchange_code: String,
    pub sector_id: String,
}

/// One OHLCV observation in a price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub symbol: Symbol,
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

/// Inclusive time window for a price query. `from` never exceeds `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    #[serde(with = "time::serde::rfc3339")]
    pub from: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub to: OffsetDateTime,
}

impl PriceRange {
    pub fn new(from: OffsetDateTime, to: OffsetDateTime) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvalidPriceRange);
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, ts: OffsetDateTime) -> bool {
        self.from <= ts && ts <= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn rejects_inverted_range() {
        let err = PriceRange::new(
            datetime!(2026-02-01 00:00 UTC),
            datetime!(2026-01-01 00:00 UTC),
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidPriceRange));
    }

    #[test]
    fn range_membership_is_inclusive() {
        let range = PriceRange::new(
            datetime!(2026-01-01 00:00 UTC),
            datetime!(2026-01-31 00:00 UTC),
        )
        .expect("valid range");

        assert!(range.contains(datetime!(2026-01-01 00:00 UTC)));
        assert!(range.contains(datetime!(2026-01-31 00:00 UTC)));
        assert!(!range.contains(datetime!(2026-02-01 00:00 UTC)));
    }

    #[test]
    fn stock_serializes_camel_case() {
        let stock = Stock {
            symbol: Symbol::parse("AAPL").expect("valid"),
            name: String::from("Apple Inc."),
            exchange_code: String::from("XNAS"),
            sector_id: String::from("tech"),
        };

        let json = serde_json::to_value(&stock).expect("serializes");
        assert_eq!(json["exchangeCode"], "XNAS");
        assert_eq!(json["sectorId"], "tech");
    }
}
