//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error constructing a [`Price`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rubles, not kopecks).
    amount: Decimal,
    /// ISO 4217 currency code.
    currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self {
            amount,
            currency_code,
        })
    }

    /// A zero price in the default currency.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code: CurrencyCode::default(),
        }
    }

    /// The amount in the currency's standard unit.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The ISO 4217 currency code.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency_code.code())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    RUB,
    USD,
    EUR,
}

impl CurrencyCode {
    /// The three-letter ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RUB => "RUB",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        let result = Price::new(Decimal::new(-100, 2), CurrencyCode::RUB);
        assert!(matches!(result, Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_zero_price_allowed() {
        let price = Price::new(Decimal::ZERO, CurrencyCode::RUB).unwrap();
        assert_eq!(price.amount(), Decimal::ZERO);
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(99_990, 2), CurrencyCode::RUB).unwrap();
        assert_eq!(price.to_string(), "999.90 RUB");
    }
}
