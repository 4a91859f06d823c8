use crate::error::{Result, StoreError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative monetary value held in minor units (cents).
///
/// Arithmetic is integer-only and checked, so totals over many lines never drift.
/// `Decimal` is used only when crossing the CSV/JSON boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn from_cents(cents: i64) -> Result<Self> {
        if cents < 0 {
            return Err(StoreError::validation("Amount must not be negative"));
        }
        Ok(Self(cents))
    }

    /// Converts a major-unit decimal (`45.99`) into cents.
    ///
    /// Values with sub-cent precision are rejected instead of rounded.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| StoreError::validation("Amount out of range"))?;
        if !cents.fract().is_zero() {
            return Err(StoreError::validation(format!(
                "Amount {value} has more than two decimal places"
            )));
        }
        let cents = cents
            .to_i64()
            .ok_or_else(|| StoreError::validation("Amount out of range"))?;
        Self::from_cents(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| StoreError::validation("Amount overflow"))
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(cents) if cents >= 0 => Ok(Self(cents)),
            _ => Err(StoreError::validation("Amount underflow")),
        }
    }

    pub fn checked_mul(self, quantity: u32) -> Result<Self> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or_else(|| StoreError::validation("Amount overflow"))
    }

    /// Sums an iterator of amounts, failing on overflow.
    pub fn sum<I: IntoIterator<Item = Money>>(amounts: I) -> Result<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl TryFrom<Decimal> for Money {
    type Error = StoreError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::from_decimal(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.to_decimal()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// Currencies the storefront can price in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Mxn,
    Cop,
    Ars,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Mxn => "MXN",
            Currency::Cop => "COP",
            Currency::Ars => "ARS",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(dec!(45)).unwrap().cents(), 4500);
        assert_eq!(Money::from_decimal(dec!(10.5)).unwrap().cents(), 1050);
        assert_eq!(Money::from_decimal(dec!(0.01)).unwrap().cents(), 1);
    }

    #[test]
    fn test_money_rejects_sub_cent_and_negative() {
        assert!(matches!(
            Money::from_decimal(dec!(0.001)),
            Err(StoreError::ValidationError(_))
        ));
        assert!(matches!(
            Money::from_decimal(dec!(-1.00)),
            Err(StoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_money_arithmetic_is_exact() {
        // 0.10 added 3 times is exactly 0.30 in cents
        let dime = Money::from_decimal(dec!(0.10)).unwrap();
        let total = Money::sum([dime, dime, dime]).unwrap();
        assert_eq!(total, Money::from_decimal(dec!(0.30)).unwrap());

        let line = Money::from_cents(1999).unwrap().checked_mul(3).unwrap();
        assert_eq!(line.to_decimal(), dec!(59.97));
    }

    #[test]
    fn test_money_overflow() {
        let big = Money::from_cents(i64::MAX).unwrap();
        assert!(big.checked_mul(2).is_err());
        assert!(big.checked_add(Money::from_cents(1).unwrap()).is_err());
        assert!(Money::ZERO.checked_sub(Money::from_cents(1).unwrap()).is_err());
    }

    #[test]
    fn test_money_serde_as_decimal_string() {
        let money = Money::from_cents(11000).unwrap();
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "\"110.00\"");

        let parsed: Money = serde_json::from_str("\"45.5\"").unwrap();
        assert_eq!(parsed.cents(), 4550);
        assert!(serde_json::from_str::<Money>("\"1.234\"").is_err());
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::default(), Currency::Usd);
        assert_eq!(serde_json::to_string(&Currency::Mxn).unwrap(), "\"MXN\"");
        let parsed: Currency = serde_json::from_str("\"EUR\"").unwrap();
        assert_eq!(parsed, Currency::Eur);
    }
}
