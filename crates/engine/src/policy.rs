//! Account type policy.
//!
//! Every [`AccountKind`] constrains the sign of the balance, and credit cards
//! also bound it by their limit:
//!
//! | kind                                 | balance                 | limit      |
//! |--------------------------------------|-------------------------|------------|
//! | `Payment`, `Saving`, `Lending`, `Invest` | `>= 0`              | not allowed|
//! | `Debt`                               | `<= 0`                  | not allowed|
//! | `CreditCard`                         | `-limit <= balance <= 0`| `>= 0`     |
//!
//! The checks are pure, so they are run against *projected* balances before
//! anything is written.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Payment,
    Saving,
    Lending,
    Debt,
    CreditCard,
    Invest,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Saving => "saving",
            Self::Lending => "lending",
            Self::Debt => "debt",
            Self::CreditCard => "credit_card",
            Self::Invest => "invest",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "payment" => Ok(Self::Payment),
            "saving" => Ok(Self::Saving),
            "lending" => Ok(Self::Lending),
            "debt" => Ok(Self::Debt),
            "credit_card" => Ok(Self::CreditCard),
            "invest" => Ok(Self::Invest),
            other => Err(EngineError::Validation(format!(
                "invalid account kind: {other}"
            ))),
        }
    }
}

/// Why a balance is not acceptable for an account kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceViolation {
    /// The balance went below zero on a kind that must stay non-negative.
    BelowZero,
    /// The balance went above zero on a kind that must stay non-positive.
    AboveZero,
    /// A credit card owes more than its limit.
    OverLimit,
    MissingLimit,
    NegativeLimit,
    /// A limit was given for a kind other than `CreditCard`.
    UnexpectedLimit,
}

impl BalanceViolation {
    fn describe(self, kind: AccountKind, balance: Money, limit: Option<Money>) -> String {
        let balance = balance.minor();
        match self {
            Self::BelowZero => format!("{kind} balance must be >= 0, got {balance}"),
            Self::AboveZero => format!("{kind} balance must be <= 0, got {balance}"),
            Self::OverLimit => format!(
                "credit card balance {balance} exceeds limit {}",
                limit.unwrap_or_default().minor()
            ),
            Self::MissingLimit => "credit card requires a limit".to_string(),
            Self::NegativeLimit => format!(
                "credit card limit must be >= 0, got {}",
                limit.unwrap_or_default().minor()
            ),
            Self::UnexpectedLimit => format!("limit is only allowed on credit cards, not {kind}"),
        }
    }

    /// Error for a balance given directly (creation, edit, parent rollup).
    pub fn invalid_balance(self, kind: AccountKind, balance: Money, limit: Option<Money>) -> EngineError {
        EngineError::InvalidBalance(self.describe(kind, balance, limit))
    }

    /// Error for a balance projected by a money movement.
    pub fn projected(self, kind: AccountKind, balance: Money, limit: Option<Money>) -> EngineError {
        let reason = self.describe(kind, balance, limit);
        match self {
            Self::OverLimit => EngineError::InsufficientCreditLimit(reason),
            Self::BelowZero => EngineError::InsufficientBalance(reason),
            _ => EngineError::InvalidBalance(reason),
        }
    }
}

/// Checks `balance`/`limit` against the rules of `kind`.
pub fn check(kind: AccountKind, balance: Money, limit: Option<Money>) -> Result<(), BalanceViolation> {
    match kind {
        AccountKind::Payment | AccountKind::Saving | AccountKind::Lending | AccountKind::Invest => {
            if limit.is_some() {
                return Err(BalanceViolation::UnexpectedLimit);
            }
            if balance.is_negative() {
                return Err(BalanceViolation::BelowZero);
            }
            Ok(())
        }
        AccountKind::Debt => {
            if limit.is_some() {
                return Err(BalanceViolation::UnexpectedLimit);
            }
            if balance.is_positive() {
                return Err(BalanceViolation::AboveZero);
            }
            Ok(())
        }
        AccountKind::CreditCard => {
            let limit = limit.ok_or(BalanceViolation::MissingLimit)?;
            if limit.is_negative() {
                return Err(BalanceViolation::NegativeLimit);
            }
            if balance.is_positive() {
                return Err(BalanceViolation::AboveZero);
            }
            if balance < -limit {
                return Err(BalanceViolation::OverLimit);
            }
            Ok(())
        }
    }
}

/// Validates a balance given directly by the caller.
pub fn validate(kind: AccountKind, balance: Money, limit: Option<Money>) -> Result<(), EngineError> {
    check(kind, balance, limit).map_err(|violation| violation.invalid_balance(kind, balance, limit))
}

/// Validates a balance projected by a money movement.
pub fn validate_projected(
    kind: AccountKind,
    balance: Money,
    limit: Option<Money>,
) -> Result<(), EngineError> {
    check(kind, balance, limit).map_err(|violation| violation.projected(kind, balance, limit))
}

/// Spending still available on a credit card (`limit + balance`).
///
/// Returns `None` for kinds without a limit.
#[must_use]
pub fn available_limit(kind: AccountKind, balance: Money, limit: Option<Money>) -> Option<Money> {
    match kind {
        AccountKind::CreditCard => limit.map(|limit| Money::new(limit.minor() + balance.minor())),
        _ => None,
    }
}
