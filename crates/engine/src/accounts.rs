//! The module contains the `Account` struct and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    AccountKind, Currency, EngineError, Money, ResultEngine,
    hierarchy::{Hierarchical, NodeRef},
    policy,
    util::{model_currency, parse_optional_uuid, parse_uuid},
};

/// An account.
///
/// An account holds a running balance of a fixed [`AccountKind`]. It can be
/// grouped under one parent account of the same kind; once a parent owns
/// children its balance is the sum of theirs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub currency: Currency,
    pub balance: Money,
    pub limit: Option<Money>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Builds a new account, enforcing the type policy.
    pub fn new(
        owner_id: String,
        name: String,
        kind: AccountKind,
        currency: Currency,
        balance: Money,
        limit: Option<Money>,
        parent_id: Option<Uuid>,
    ) -> ResultEngine<Self> {
        policy::validate(kind, balance, limit)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            kind,
            currency,
            balance,
            limit,
            parent_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Remaining credit for credit cards.
    #[must_use]
    pub fn available_limit(&self) -> Option<Money> {
        policy::available_limit(self.kind, self.balance, self.limit)
    }

    pub(crate) fn node(&self, has_children: bool) -> NodeRef<'_, AccountKind> {
        NodeRef {
            id: self.id,
            owner_id: &self.owner_id,
            parent_id: self.parent_id,
            kind: self.kind,
            has_children,
        }
    }
}

impl Hierarchical for Account {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub kind: String,
    pub currency: String,
    pub balance_minor: i64,
    pub limit_minor: Option<i64>,
    pub parent_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            balance_minor: ActiveValue::Set(value.balance.minor()),
            limit_minor: ActiveValue::Set(value.limit.map(Money::minor)),
            parent_id: ActiveValue::Set(value.parent_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            owner_id: model.owner_id,
            name: model.name,
            kind: AccountKind::try_from(model.kind.as_str())?,
            currency: model_currency(&model.currency)?,
            balance: Money::new(model.balance_minor),
            limit: model.limit_minor.map(Money::new),
            parent_id: parse_optional_uuid(model.parent_id.as_deref(), "parent account")?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_enforces_policy() {
        let account = Account::new(
            "alice".to_string(),
            "Visa".to_string(),
            AccountKind::CreditCard,
            Currency::Eur,
            Money::new(-300),
            Some(Money::new(1_000)),
            None,
        )
        .unwrap();
        assert_eq!(account.available_limit(), Some(Money::new(700)));

        let err = Account::new(
            "alice".to_string(),
            "Cash".to_string(),
            AccountKind::Payment,
            Currency::Eur,
            Money::new(-1),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidBalance(_)));
    }

    #[test]
    fn model_round_trip_keeps_parent() {
        let parent_id = Uuid::new_v4();
        let account = Account::new(
            "alice".to_string(),
            "Savings".to_string(),
            AccountKind::Saving,
            Currency::Usd,
            Money::new(42),
            None,
            Some(parent_id),
        )
        .unwrap();
        let active: ActiveModel = (&account).into();
        let model = Model {
            id: active.id.unwrap(),
            owner_id: active.owner_id.unwrap(),
            name: active.name.unwrap(),
            kind: active.kind.unwrap(),
            currency: active.currency.unwrap(),
            balance_minor: active.balance_minor.unwrap(),
            limit_minor: active.limit_minor.unwrap(),
            parent_id: active.parent_id.unwrap(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
        };
        assert_eq!(Account::try_from(model).unwrap(), account);
    }
}
