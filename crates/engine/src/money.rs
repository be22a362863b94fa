use std::{fmt, ops::Neg};

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Signed money amount represented as integer **minor units**.
///
/// Use this type for balances, limits and transaction amounts inside the
/// engine to avoid floating-point drift. The value is signed:
/// - positive = money held / income
/// - negative = money owed / expense
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.display(Currency::Eur).to_string(), "12.34 EUR");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Addition that reports overflow as [`EngineError::InvalidAmount`].
    pub fn try_add(self, rhs: Money) -> ResultEngine<Money> {
        self.0
            .checked_add(rhs.0)
            .map(Money)
            .ok_or_else(|| EngineError::InvalidAmount("amount overflow".to_string()))
    }

    /// Subtraction that reports overflow as [`EngineError::InvalidAmount`].
    pub fn try_sub(self, rhs: Money) -> ResultEngine<Money> {
        self.0
            .checked_sub(rhs.0)
            .map(Money)
            .ok_or_else(|| EngineError::InvalidAmount("amount overflow".to_string()))
    }

    /// Sums amounts, failing on overflow.
    pub fn try_sum<I>(iter: I) -> ResultEngine<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        iter.into_iter().try_fold(Money::ZERO, Money::try_add)
    }

    /// Formats the amount in major units of `currency`.
    #[must_use]
    pub fn display(self, currency: Currency) -> MoneyDisplay {
        MoneyDisplay {
            money: self,
            currency,
        }
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

/// Display adapter returned by [`Money::display`].
pub struct MoneyDisplay {
    money: Money,
    currency: Currency,
}

impl fmt::Display for MoneyDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.money.is_negative() { "-" } else { "" };
        let abs = self.money.0.unsigned_abs();
        let digits = u32::from(self.currency.minor_units());
        if digits == 0 {
            return write!(f, "{sign}{abs} {}", self.currency);
        }
        let scale = 10u64.pow(digits);
        let width = digits as usize;
        write!(
            f,
            "{sign}{}.{:0width$} {}",
            abs / scale,
            abs % scale,
            self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_currency_minor_units() {
        assert_eq!(Money::new(0).display(Currency::Eur).to_string(), "0.00 EUR");
        assert_eq!(Money::new(5).display(Currency::Usd).to_string(), "0.05 USD");
        assert_eq!(
            Money::new(-1050).display(Currency::Eur).to_string(),
            "-10.50 EUR"
        );
        assert_eq!(
            Money::new(5_000_000).display(Currency::Vnd).to_string(),
            "5000000 VND"
        );
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        assert_eq!(Money::new(2).try_add(Money::new(3)).unwrap(), Money::new(5));
        assert_eq!(Money::new(2).try_sub(Money::new(3)).unwrap(), Money::new(-1));
        assert!(matches!(
            Money::new(i64::MAX).try_add(Money::new(1)),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn try_sum_adds_everything() {
        let total = Money::try_sum([Money::new(100), Money::new(-40), Money::new(15)]).unwrap();
        assert_eq!(total, Money::new(75));
        assert_eq!(Money::try_sum([]).unwrap(), Money::ZERO);
    }
}
