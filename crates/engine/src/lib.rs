//! Ledger consistency engine.
//!
//! Keeps account balances, category/partner rollups and the transaction log
//! consistent for every owner. All state lives in the database given to
//! [`Engine::builder`]; every write runs in a single database transaction.

pub use accounts::Account;
pub use categories::{Category, CategoryBalance, CategoryKind};
pub use commands::{
    NewAccountCmd, NewCategoryCmd, NewPartnerCmd, NewTransactionCmd, ParentUpdate,
    TransactionListFilter, UpdateAccountCmd, UpdateCategoryCmd, UpdatePartnerCmd,
};
pub use currency::Currency;
pub use error::{EngineError, HierarchyError};
pub use hierarchy::Tree;
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use partners::{Partner, PartnerBalance, PartnerContact};
pub use policy::{AccountKind, BalanceViolation};
pub use transactions::{Movement, Transaction, TransactionKind, TransactionRefs};

pub mod accounts;
pub mod categories;
mod commands;
mod currency;
mod error;
pub mod hierarchy;
mod money;
mod ops;
pub mod partners;
pub mod policy;
pub mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

/// A root account and its children, with parent balances already summed.
pub type AccountTree = Tree<Account>;
/// A root category and its children, with balances computed on read.
pub type CategoryTree = Tree<CategoryBalance>;
/// A root partner and its children, with balances computed on read.
pub type PartnerTree = Tree<PartnerBalance>;
