//! Request and response bodies of the HTTP API.
//!
//! Amounts are integer minor units (`*_minor`). Every request is scoped to
//! the owner sent in the `x-owner-id` header, so no body carries an owner.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
    Jpy,
    Vnd,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
            Self::Vnd => "VND",
        }
    }
}

/// A root node and its direct children.
#[derive(Debug, Serialize, Deserialize)]
pub struct Tree<T> {
    pub root: T,
    pub children: Vec<T>,
}

/// Query string of the delete endpoints for categories and partners.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeleteQuery {
    /// Node that takes over the transactions of the deleted one.
    pub replacement_id: Option<Uuid>,
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Payment,
        Saving,
        Lending,
        Debt,
        CreditCard,
        Invest,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub kind: AccountKind,
        #[serde(default)]
        pub currency: Currency,
        #[serde(default)]
        pub balance_minor: i64,
        /// Required for credit cards, rejected otherwise.
        pub limit_minor: Option<i64>,
        pub parent_id: Option<Uuid>,
    }

    /// Partial update. `clear_limit`/`clear_parent` win over the matching
    /// value fields.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub balance_minor: Option<i64>,
        pub limit_minor: Option<i64>,
        #[serde(default)]
        pub clear_limit: bool,
        pub kind: Option<AccountKind>,
        pub parent_id: Option<Uuid>,
        #[serde(default)]
        pub clear_parent: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub kind: AccountKind,
        pub currency: Currency,
        pub balance_minor: i64,
        pub limit_minor: Option<i64>,
        /// Credit cards only: `limit + balance`.
        pub available_limit_minor: Option<i64>,
        pub parent_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsResponse {
        pub accounts: Vec<Tree<AccountView>>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub kind: CategoryKind,
        pub parent_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub kind: Option<CategoryKind>,
        pub parent_id: Option<Uuid>,
        #[serde(default)]
        pub clear_parent: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub kind: CategoryKind,
        pub parent_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryBalanceView {
        #[serde(flatten)]
        pub category: CategoryView,
        pub own_balance_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoriesResponse {
        pub categories: Vec<Tree<CategoryBalanceView>>,
    }
}

pub mod partner {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PartnerContact {
        pub email: Option<String>,
        pub phone: Option<String>,
        pub tax_no: Option<String>,
        pub identify: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PartnerNew {
        pub name: String,
        #[serde(flatten)]
        pub contact: PartnerContact,
        pub parent_id: Option<Uuid>,
    }

    /// Partial update. `contact`, when present, replaces all contact fields.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PartnerUpdate {
        pub name: Option<String>,
        pub contact: Option<PartnerContact>,
        pub parent_id: Option<Uuid>,
        #[serde(default)]
        pub clear_parent: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PartnerView {
        pub id: Uuid,
        pub name: String,
        #[serde(flatten)]
        pub contact: PartnerContact,
        pub parent_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PartnerBalanceView {
        #[serde(flatten)]
        pub partner: PartnerView,
        pub own_balance_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PartnersResponse {
        pub partners: Vec<Tree<PartnerBalanceView>>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
        Transfer,
    }

    /// Create a transaction.
    ///
    /// - income: `from_category_id` + `to_account_id`
    /// - expense: `from_account_id` + optional `to_category_id`
    /// - transfer: `from_account_id` + `to_account_id`
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub kind: TransactionKind,
        /// Must be > 0.
        pub amount_minor: i64,
        #[serde(default)]
        pub currency: Currency,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        pub from_account_id: Option<Uuid>,
        pub from_category_id: Option<Uuid>,
        pub to_account_id: Option<Uuid>,
        pub to_category_id: Option<Uuid>,
        pub partner_id: Option<Uuid>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub currency: Currency,
        pub occurred_at: DateTime<Utc>,
        pub from_account_id: Option<Uuid>,
        pub from_category_id: Option<Uuid>,
        pub to_account_id: Option<Uuid>,
        pub to_category_id: Option<Uuid>,
        pub partner_id: Option<Uuid>,
        pub note: Option<String>,
        pub created_by: String,
        pub deleted_at: Option<DateTime<Utc>>,
    }

    /// Query string of `GET /transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub partner_id: Option<Uuid>,
        pub include_deleted: Option<bool>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}
