//! The module contains the errors the engine can throw.
//!
//! Every error aborts the whole operation: nothing is committed when an
//! [`EngineError`] is returned. The main families are:
//!
//! - [`InvalidBalance`] thrown when an account violates its type policy.
//! - [`Hierarchy`] thrown when a parent assignment breaks the two-level tree.
//! - [`InsufficientBalance`] / [`InsufficientCreditLimit`] thrown when a
//!   transaction would push an account past its bound.
//! - [`HasChildren`] / [`HasReferencingTransactions`] /
//!   [`ReassignmentIncomplete`] thrown by the deletion protocol.
//! - [`KeyNotFound`] thrown when an item is not found.
//!
//!  [`InvalidBalance`]: EngineError::InvalidBalance
//!  [`Hierarchy`]: EngineError::Hierarchy
//!  [`InsufficientBalance`]: EngineError::InsufficientBalance
//!  [`InsufficientCreditLimit`]: EngineError::InsufficientCreditLimit
//!  [`HasChildren`]: EngineError::HasChildren
//!  [`HasReferencingTransactions`]: EngineError::HasReferencingTransactions
//!  [`ReassignmentIncomplete`]: EngineError::ReassignmentIncomplete
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Violations of the two-level parent/child constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("{0} cannot be its own parent")]
    InvalidParentSelf(String),
    #[error("parent {0} not found")]
    ParentNotFound(String),
    #[error("parent type mismatch: {0}")]
    ParentTypeMismatch(String),
    #[error("invalid parent hierarchy: {0}")]
    InvalidParentHierarchy(String),
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid balance: {0}")]
    InvalidBalance(String),
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("Insufficient credit limit: {0}")]
    InsufficientCreditLimit(String),
    #[error("\"{0}\" has children")]
    HasChildren(String),
    #[error("\"{0}\" is referenced by transactions")]
    HasReferencingTransactions(String),
    #[error("Reassignment incomplete: {0}")]
    ReassignmentIncomplete(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::InvalidBalance(a), Self::InvalidBalance(b)) => a == b,
            (Self::Hierarchy(a), Self::Hierarchy(b)) => a == b,
            (Self::InsufficientBalance(a), Self::InsufficientBalance(b)) => a == b,
            (Self::InsufficientCreditLimit(a), Self::InsufficientCreditLimit(b)) => a == b,
            (Self::HasChildren(a), Self::HasChildren(b)) => a == b,
            (Self::HasReferencingTransactions(a), Self::HasReferencingTransactions(b)) => a == b,
            (Self::ReassignmentIncomplete(a), Self::ReassignmentIncomplete(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_errors_convert_transparently() {
        let err: EngineError = HierarchyError::ParentNotFound("account".to_string()).into();
        assert_eq!(err.to_string(), "parent account not found");
        assert_eq!(
            err,
            EngineError::Hierarchy(HierarchyError::ParentNotFound("account".to_string()))
        );
    }

    #[test]
    fn different_kinds_are_not_equal() {
        assert_ne!(
            EngineError::InsufficientBalance("x".to_string()),
            EngineError::InsufficientCreditLimit("x".to_string())
        );
    }
}
