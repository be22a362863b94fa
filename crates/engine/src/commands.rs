//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Required fields go through
//! `new`, everything else through `#[must_use]` setters.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AccountKind, CategoryKind, Currency, PartnerContact, TransactionKind, TransactionRefs};

/// How an update changes the parent of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentUpdate {
    Set(Uuid),
    Clear,
}

impl ParentUpdate {
    pub(crate) fn target(self) -> Option<Uuid> {
        match self {
            Self::Set(id) => Some(id),
            Self::Clear => None,
        }
    }
}

/// Create an account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub owner_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub currency: Currency,
    pub balance_minor: i64,
    pub limit_minor: Option<i64>,
    pub parent_id: Option<Uuid>,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        kind: AccountKind,
        currency: Currency,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            kind,
            currency,
            balance_minor: 0,
            limit_minor: None,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = balance_minor;
        self
    }

    #[must_use]
    pub fn limit_minor(mut self, limit_minor: i64) -> Self {
        self.limit_minor = Some(limit_minor);
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Update an account. Fields left as `None` are unchanged.
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub id: Uuid,
    pub owner_id: String,
    pub name: Option<String>,
    pub balance_minor: Option<i64>,
    /// `Some(None)` removes the limit.
    pub limit_minor: Option<Option<i64>>,
    pub kind: Option<AccountKind>,
    pub parent: Option<ParentUpdate>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(id: Uuid, owner_id: impl Into<String>) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
            name: None,
            balance_minor: None,
            limit_minor: None,
            kind: None,
            parent: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = Some(balance_minor);
        self
    }

    #[must_use]
    pub fn limit_minor(mut self, limit_minor: i64) -> Self {
        self.limit_minor = Some(Some(limit_minor));
        self
    }

    #[must_use]
    pub fn clear_limit(mut self) -> Self {
        self.limit_minor = Some(None);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: AccountKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: Uuid) -> Self {
        self.parent = Some(ParentUpdate::Set(parent_id));
        self
    }

    #[must_use]
    pub fn clear_parent(mut self) -> Self {
        self.parent = Some(ParentUpdate::Clear);
        self
    }
}

/// Create an income, expense or transfer.
///
/// The references must match the kind:
/// - income: `from_category` + `to_account`
/// - expense: `from_account` + optional `to_category`
/// - transfer: `from_account` + `to_account`
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub owner_id: String,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
    pub refs: TransactionRefs,
    pub partner_id: Option<Uuid>,
    pub note: Option<String>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        kind: TransactionKind,
        amount_minor: i64,
        currency: Currency,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind,
            amount_minor,
            currency,
            occurred_at,
            refs: TransactionRefs::default(),
            partner_id: None,
            note: None,
        }
    }

    #[must_use]
    pub fn from_account(mut self, account_id: Uuid) -> Self {
        self.refs.from_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn from_category(mut self, category_id: Uuid) -> Self {
        self.refs.from_category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn to_account(mut self, account_id: Uuid) -> Self {
        self.refs.to_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn to_category(mut self, category_id: Uuid) -> Self {
        self.refs.to_category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn partner_id(mut self, partner_id: Uuid) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Create a category.
#[derive(Clone, Debug)]
pub struct NewCategoryCmd {
    pub owner_id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub parent_id: Option<Uuid>,
}

impl NewCategoryCmd {
    #[must_use]
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            kind,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Update a category. Fields left as `None` are unchanged.
#[derive(Clone, Debug)]
pub struct UpdateCategoryCmd {
    pub id: Uuid,
    pub owner_id: String,
    pub name: Option<String>,
    pub kind: Option<CategoryKind>,
    pub parent: Option<ParentUpdate>,
}

impl UpdateCategoryCmd {
    #[must_use]
    pub fn new(id: Uuid, owner_id: impl Into<String>) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
            name: None,
            kind: None,
            parent: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: CategoryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: Uuid) -> Self {
        self.parent = Some(ParentUpdate::Set(parent_id));
        self
    }

    #[must_use]
    pub fn clear_parent(mut self) -> Self {
        self.parent = Some(ParentUpdate::Clear);
        self
    }
}

/// Create a partner.
#[derive(Clone, Debug)]
pub struct NewPartnerCmd {
    pub owner_id: String,
    pub name: String,
    pub contact: PartnerContact,
    pub parent_id: Option<Uuid>,
}

impl NewPartnerCmd {
    #[must_use]
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            contact: PartnerContact::default(),
            parent_id: None,
        }
    }

    #[must_use]
    pub fn contact(mut self, contact: PartnerContact) -> Self {
        self.contact = contact;
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.contact.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.contact.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn tax_no(mut self, tax_no: impl Into<String>) -> Self {
        self.contact.tax_no = Some(tax_no.into());
        self
    }

    #[must_use]
    pub fn identify(mut self, identify: impl Into<String>) -> Self {
        self.contact.identify = Some(identify.into());
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Update a partner. `contact` replaces every contact field at once.
#[derive(Clone, Debug)]
pub struct UpdatePartnerCmd {
    pub id: Uuid,
    pub owner_id: String,
    pub name: Option<String>,
    pub contact: Option<PartnerContact>,
    pub parent: Option<ParentUpdate>,
}

impl UpdatePartnerCmd {
    #[must_use]
    pub fn new(id: Uuid, owner_id: impl Into<String>) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
            name: None,
            contact: None,
            parent: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn contact(mut self, contact: PartnerContact) -> Self {
        self.contact = Some(contact);
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: Uuid) -> Self {
        self.parent = Some(ParentUpdate::Set(parent_id));
        self
    }

    #[must_use]
    pub fn clear_parent(mut self) -> Self {
        self.parent = Some(ParentUpdate::Clear);
        self
    }
}

/// Filters for [`Engine::list_transactions`](crate::Engine::list_transactions).
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    /// Matches either side of the transaction.
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub partner_id: Option<Uuid>,
    pub include_deleted: bool,
    pub limit: Option<u64>,
}

impl TransactionListFilter {
    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn partner_id(mut self, partner_id: Uuid) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    #[must_use]
    pub fn include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}
