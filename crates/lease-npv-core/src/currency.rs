//! Exchange-rate table and display-currency conversion.
//!
//! All lease arithmetic runs in USD. Conversion happens only at the edges,
//! through an explicit [`ExchangeRateTable`] passed in by the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::LeaseNpvError;
use crate::types::{Currency, Money};
use crate::LeaseNpvResult;

/// Rates older than this are considered stale.
pub const RATE_CACHE_TTL_HOURS: i64 = 24;

/// Units of each currency per one USD, as of `fetched_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateTable {
    /// Keyed by upper-case currency code
    pub rates: BTreeMap<String, Decimal>,
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRateTable {
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            rates: BTreeMap::new(),
            fetched_at,
        }
    }

    /// Builder-style insert. Rates must be positive.
    pub fn with_rate(mut self, currency: Currency, units_per_usd: Decimal) -> LeaseNpvResult<Self> {
        self.insert(currency, units_per_usd)?;
        Ok(self)
    }

    pub fn insert(&mut self, currency: Currency, units_per_usd: Decimal) -> LeaseNpvResult<()> {
        if units_per_usd <= Decimal::ZERO {
            return Err(LeaseNpvError::InvalidInput {
                field: format!("rates.{}", currency.code()),
                reason: "Exchange rate must be positive".into(),
            });
        }
        self.rates.insert(currency.code().to_string(), units_per_usd);
        Ok(())
    }

    /// Units of `currency` per USD. USD is always 1.
    pub fn rate(&self, currency: &Currency) -> LeaseNpvResult<Decimal> {
        if *currency == Currency::USD {
            return Ok(Decimal::ONE);
        }
        match self.rates.get(currency.code()) {
            Some(rate) if *rate > Decimal::ZERO => Ok(*rate),
            Some(_) => Err(LeaseNpvError::InvalidInput {
                field: format!("rates.{}", currency.code()),
                reason: "Exchange rate must be positive".into(),
            }),
            None => Err(LeaseNpvError::UnknownCurrency(currency.code().to_string())),
        }
    }

    pub fn from_usd(&self, amount: Money, to: &Currency) -> LeaseNpvResult<Money> {
        Ok(amount * self.rate(to)?)
    }

    pub fn to_usd(&self, amount: Money, from: &Currency) -> LeaseNpvResult<Money> {
        Ok(amount / self.rate(from)?)
    }

    /// Convert between any two currencies in the table via USD.
    pub fn convert(&self, amount: Money, from: &Currency, to: &Currency) -> LeaseNpvResult<Money> {
        if from == to {
            return Ok(amount);
        }
        self.from_usd(self.to_usd(amount, from)?, to)
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// True once the table is older than [`RATE_CACHE_TTL_HOURS`].
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let stale = self.age(now) > Duration::hours(RATE_CACHE_TTL_HOURS);
        if stale {
            warn!(
                fetched_at = %self.fetched_at,
                "exchange rates are older than {RATE_CACHE_TTL_HOURS}h"
            );
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn table() -> ExchangeRateTable {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ExchangeRateTable::new(at)
            .with_rate(Currency::EUR, dec!(0.8))
            .unwrap()
            .with_rate(Currency::INR, dec!(80))
            .unwrap()
    }

    #[test]
    fn test_usd_is_identity() {
        let t = table();
        assert_eq!(t.rate(&Currency::USD).unwrap(), Decimal::ONE);
        assert_eq!(t.from_usd(dec!(12.5), &Currency::USD).unwrap(), dec!(12.5));
    }

    #[test]
    fn test_cross_conversion_via_usd() {
        let t = table();
        // 8 EUR = 10 USD = 800 INR
        assert_eq!(t.convert(dec!(8), &Currency::EUR, &Currency::INR).unwrap(), dec!(800));
    }

    #[test]
    fn test_round_trip() {
        let t = table();
        let eur = t.from_usd(dec!(1234.56), &Currency::EUR).unwrap();
        assert_eq!(t.to_usd(eur, &Currency::EUR).unwrap(), dec!(1234.56));
    }

    #[test]
    fn test_unknown_currency() {
        let err = table().from_usd(dec!(1), &Currency::JPY).unwrap_err();
        assert!(matches!(err, LeaseNpvError::UnknownCurrency(ref c) if c == "JPY"));
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        let mut t = table();
        assert!(t.insert(Currency::GBP, Decimal::ZERO).is_err());
    }

    #[test]
    fn test_staleness() {
        let t = table();
        let fresh = Utc.with_ymd_and_hms(2024, 5, 2, 11, 59, 0).unwrap();
        let stale = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 1).unwrap();
        assert!(!t.is_stale(fresh));
        assert!(t.is_stale(stale));
    }

    #[test]
    fn test_deserialize_table() {
        let json = r#"{"rates": {"EUR": "0.9", "GBP": "0.8"}, "fetched_at": "2024-05-01T00:00:00Z"}"#;
        let t: ExchangeRateTable = serde_json::from_str(json).unwrap();
        assert_eq!(t.rate(&Currency::GBP).unwrap(), dec!(0.8));
    }
}
