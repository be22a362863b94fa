//! Transaction primitives.
//!
//! A `Transaction` moves money between a source and a destination. Which
//! references are legal depends on its kind, so the pair is stored as a
//! [`Movement`] rather than four independent optional ids.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money, ResultEngine,
    util::{model_currency, parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Source and destination references as sent by callers.
///
/// Exactly one source and at most one destination may be set; which ones
/// depends on the kind (see [`Movement::from_refs`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRefs {
    pub from_account_id: Option<Uuid>,
    pub from_category_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
    pub to_category_id: Option<Uuid>,
}

/// Where the money of a transaction comes from and goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Movement {
    /// Category → account.
    Income {
        from_category_id: Uuid,
        to_account_id: Uuid,
    },
    /// Account → category (or nowhere).
    Expense {
        from_account_id: Uuid,
        to_category_id: Option<Uuid>,
    },
    /// Account → account.
    Transfer {
        from_account_id: Uuid,
        to_account_id: Uuid,
    },
}

impl Movement {
    /// Checks that `refs` has the shape required by `kind`.
    pub fn from_refs(kind: TransactionKind, refs: TransactionRefs) -> ResultEngine<Self> {
        let invalid = |msg: &str| Err(EngineError::Validation(format!("{kind}: {msg}")));
        match kind {
            TransactionKind::Income => match refs {
                TransactionRefs {
                    from_account_id: None,
                    from_category_id: Some(from_category_id),
                    to_account_id: Some(to_account_id),
                    to_category_id: None,
                } => Ok(Self::Income {
                    from_category_id,
                    to_account_id,
                }),
                _ => invalid("requires from_category_id and to_account_id only"),
            },
            TransactionKind::Expense => match refs {
                TransactionRefs {
                    from_account_id: Some(from_account_id),
                    from_category_id: None,
                    to_account_id: None,
                    to_category_id,
                } => Ok(Self::Expense {
                    from_account_id,
                    to_category_id,
                }),
                _ => invalid("requires from_account_id and an optional to_category_id"),
            },
            TransactionKind::Transfer => match refs {
                TransactionRefs {
                    from_account_id: Some(from_account_id),
                    from_category_id: None,
                    to_account_id: Some(to_account_id),
                    to_category_id: None,
                } => {
                    if from_account_id == to_account_id {
                        return invalid("from_account_id and to_account_id must differ");
                    }
                    Ok(Self::Transfer {
                        from_account_id,
                        to_account_id,
                    })
                }
                _ => invalid("requires from_account_id and to_account_id only"),
            },
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Income { .. } => TransactionKind::Income,
            Self::Expense { .. } => TransactionKind::Expense,
            Self::Transfer { .. } => TransactionKind::Transfer,
        }
    }

    pub fn refs(&self) -> TransactionRefs {
        match *self {
            Self::Income {
                from_category_id,
                to_account_id,
            } => TransactionRefs {
                from_category_id: Some(from_category_id),
                to_account_id: Some(to_account_id),
                ..Default::default()
            },
            Self::Expense {
                from_account_id,
                to_category_id,
            } => TransactionRefs {
                from_account_id: Some(from_account_id),
                to_category_id,
                ..Default::default()
            },
            Self::Transfer {
                from_account_id,
                to_account_id,
            } => TransactionRefs {
                from_account_id: Some(from_account_id),
                to_account_id: Some(to_account_id),
                ..Default::default()
            },
        }
    }

    /// Balance change applied to every account endpoint for `amount`.
    pub fn account_deltas(&self, amount: Money) -> Vec<(Uuid, Money)> {
        match *self {
            Self::Income { to_account_id, .. } => vec![(to_account_id, amount)],
            Self::Expense {
                from_account_id, ..
            } => vec![(from_account_id, -amount)],
            Self::Transfer {
                from_account_id,
                to_account_id,
            } => vec![(from_account_id, -amount), (to_account_id, amount)],
        }
    }

    pub fn category_id(&self) -> Option<Uuid> {
        match *self {
            Self::Income {
                from_category_id, ..
            } => Some(from_category_id),
            Self::Expense { to_category_id, .. } => to_category_id,
            Self::Transfer { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: String,
    pub movement: Movement,
    pub amount: Money,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
    pub partner_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl Transaction {
    pub fn new(
        owner_id: String,
        movement: Movement,
        amount: Money,
        currency: Currency,
        occurred_at: DateTime<Utc>,
        partner_id: Option<Uuid>,
        note: Option<String>,
        created_by: String,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            movement,
            amount,
            currency,
            occurred_at,
            partner_id,
            note,
            updated_by: created_by.clone(),
            created_by,
            created_at: Utc::now(),
            deleted_at: None,
            deleted_by: None,
        })
    }

    pub fn kind(&self) -> TransactionKind {
        self.movement.kind()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Amount as seen by categories and partners: income positive, expense
    /// negative, transfers ignored.
    pub fn signed_amount(&self) -> Option<Money> {
        signed_amount(self.kind(), self.amount)
    }
}

pub(crate) fn signed_amount(kind: TransactionKind, amount: Money) -> Option<Money> {
    match kind {
        TransactionKind::Income => Some(amount),
        TransactionKind::Expense => Some(-amount),
        TransactionKind::Transfer => None,
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub currency: String,
    pub occurred_at: DateTimeUtc,
    pub from_account_id: Option<String>,
    pub from_category_id: Option<String>,
    pub to_account_id: Option<String>,
    pub to_category_id: Option<String>,
    pub partner_id: Option<String>,
    pub note: Option<String>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        let refs = tx.movement.refs();
        let id = |value: Option<Uuid>| value.map(|id| id.to_string());
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            owner_id: ActiveValue::Set(tx.owner_id.clone()),
            kind: ActiveValue::Set(tx.kind().as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            from_account_id: ActiveValue::Set(id(refs.from_account_id)),
            from_category_id: ActiveValue::Set(id(refs.from_category_id)),
            to_account_id: ActiveValue::Set(id(refs.to_account_id)),
            to_category_id: ActiveValue::Set(id(refs.to_category_id)),
            partner_id: ActiveValue::Set(id(tx.partner_id)),
            note: ActiveValue::Set(tx.note.clone()),
            created_by: ActiveValue::Set(tx.created_by.clone()),
            updated_by: ActiveValue::Set(tx.updated_by.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            deleted_at: ActiveValue::Set(tx.deleted_at),
            deleted_by: ActiveValue::Set(tx.deleted_by.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = TransactionKind::try_from(model.kind.as_str())?;
        let refs = TransactionRefs {
            from_account_id: parse_optional_uuid(model.from_account_id.as_deref(), "account")?,
            from_category_id: parse_optional_uuid(model.from_category_id.as_deref(), "category")?,
            to_account_id: parse_optional_uuid(model.to_account_id.as_deref(), "account")?,
            to_category_id: parse_optional_uuid(model.to_category_id.as_deref(), "category")?,
        };
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            owner_id: model.owner_id,
            movement: Movement::from_refs(kind, refs)?,
            amount: Money::new(model.amount_minor),
            currency: model_currency(&model.currency)?,
            occurred_at: model.occurred_at,
            partner_id: parse_optional_uuid(model.partner_id.as_deref(), "partner")?,
            note: model.note,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            deleted_at: model.deleted_at,
            deleted_by: model.deleted_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_requires_category_to_account() {
        let category = Uuid::new_v4();
        let account = Uuid::new_v4();
        let movement = Movement::from_refs(
            TransactionKind::Income,
            TransactionRefs {
                from_category_id: Some(category),
                to_account_id: Some(account),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(movement.kind(), TransactionKind::Income);
        assert_eq!(movement.category_id(), Some(category));
        assert_eq!(
            movement.account_deltas(Money::new(5)),
            vec![(account, Money::new(5))]
        );

        let wrong = Movement::from_refs(
            TransactionKind::Income,
            TransactionRefs {
                from_account_id: Some(account),
                to_account_id: Some(account),
                ..Default::default()
            },
        );
        assert!(matches!(wrong, Err(EngineError::Validation(_))));
    }

    #[test]
    fn expense_destination_is_optional() {
        let account = Uuid::new_v4();
        let movement = Movement::from_refs(
            TransactionKind::Expense,
            TransactionRefs {
                from_account_id: Some(account),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(movement.category_id(), None);
        assert_eq!(
            movement.account_deltas(Money::new(7)),
            vec![(account, Money::new(-7))]
        );
    }

    #[test]
    fn transfer_moves_between_distinct_accounts() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let movement = Movement::from_refs(
            TransactionKind::Transfer,
            TransactionRefs {
                from_account_id: Some(from),
                to_account_id: Some(to),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            movement.account_deltas(Money::new(3)),
            vec![(from, Money::new(-3)), (to, Money::new(3))]
        );
        assert_eq!(movement.refs().to_account_id, Some(to));

        let same = Movement::from_refs(
            TransactionKind::Transfer,
            TransactionRefs {
                from_account_id: Some(from),
                to_account_id: Some(from),
                ..Default::default()
            },
        );
        assert!(matches!(same, Err(EngineError::Validation(_))));
    }

    #[test]
    fn new_rejects_non_positive_amounts() {
        let movement = Movement::Expense {
            from_account_id: Uuid::new_v4(),
            to_category_id: None,
        };
        for amount in [0, -10] {
            let err = Transaction::new(
                "alice".to_string(),
                movement,
                Money::new(amount),
                Currency::Eur,
                Utc::now(),
                None,
                None,
                "alice".to_string(),
            )
            .unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)));
        }
    }

    #[test]
    fn signed_amount_ignores_transfers() {
        assert_eq!(
            signed_amount(TransactionKind::Income, Money::new(10)),
            Some(Money::new(10))
        );
        assert_eq!(
            signed_amount(TransactionKind::Expense, Money::new(10)),
            Some(Money::new(-10))
        );
        assert_eq!(signed_amount(TransactionKind::Transfer, Money::new(10)), None);
    }
}
