//! # Money Types
//!
//! Currency and minor-unit conversion. Collaborator requests always carry
//! integer minor units (cents, pence, ...), never decimal amounts.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    NZD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::NZD => "NZD",
        }
    }

    /// Number of decimal places for this currency
    /// (JPY has 0, the others here have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a user-facing decimal amount to integer minor units.
    ///
    /// Rounds to the nearest unit, never truncates: truncation would
    /// systematically underestimate charges. A guard digit absorbs binary
    /// float drift so `10.005` converts to `1001`, not `1000`.
    pub fn to_minor_units(&self, amount: f64) -> i64 {
        let scale = 10_f64.powi(self.decimal_places() as i32);
        ((amount * scale * 10.0).round() / 10.0).round() as i64
    }

    /// Convert from minor units back to a decimal amount
    pub fn from_minor_units(&self, minor: i64) -> f64 {
        let scale = 10_f64.powi(self.decimal_places() as i32);
        minor as f64 / scale
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monetary amount in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Amount in minor units (cents for USD)
    pub minor: i64,
    pub currency: Currency,
}

impl Amount {
    /// Build from a user-facing decimal amount
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        Self {
            minor: currency.to_minor_units(amount),
            currency,
        }
    }

    /// Build directly from minor units
    pub fn from_minor(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    pub fn as_decimal(&self) -> f64 {
        self.currency.from_minor_units(self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_unit_conversion_rounds() {
        assert_eq!(Currency::USD.to_minor_units(10.005), 1001);
        assert_eq!(Currency::AUD.to_minor_units(77.99), 7799);
        assert_eq!(Currency::EUR.to_minor_units(10.0), 1000);
        assert_eq!(Currency::JPY.to_minor_units(1000.0), 1000);
    }

    #[test]
    fn test_round_trip() {
        assert_eq!(Currency::USD.from_minor_units(1099), 10.99);
        let amount = Amount::from_decimal(29.99, Currency::GBP);
        assert_eq!(amount.minor, 2999);
        assert_eq!(amount.as_decimal(), 29.99);
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::AUD.as_str(), "AUD");
        assert_eq!(Currency::AUD.to_string(), "AUD");
        assert_eq!(
            serde_json::to_string(&Currency::AUD).unwrap(),
            "\"AUD\""
        );
    }
}
