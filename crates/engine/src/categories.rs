//! Income/expense categories.
//!
//! A category balance is never stored: it is recomputed from transactions on
//! every read (see [`Engine::categories_with_rollup`](crate::Engine::categories_with_rollup)).

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money,
    hierarchy::{Hierarchical, NodeRef},
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid category kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(owner_id: String, name: String, kind: CategoryKind, parent_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            kind,
            parent_id,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn node(&self, has_children: bool) -> NodeRef<'_, CategoryKind> {
        NodeRef {
            id: self.id,
            owner_id: &self.owner_id,
            parent_id: self.parent_id,
            kind: self.kind,
            has_children,
        }
    }
}

impl Hierarchical for Category {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }
}

/// A category with the balance computed at read time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryBalance {
    pub category: Category,
    /// Signed sum of the transactions that reference this category directly.
    pub own_balance: Money,
    /// `own_balance` plus the rollup of every child.
    pub balance: Money,
}

impl Hierarchical for CategoryBalance {
    fn id(&self) -> Uuid {
        self.category.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.category.parent_id
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub kind: String,
    pub parent_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            parent_id: ActiveValue::Set(value.parent_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            owner_id: model.owner_id,
            name: model.name,
            kind: CategoryKind::try_from(model.kind.as_str())?,
            parent_id: parse_optional_uuid(model.parent_id.as_deref(), "parent category")?,
            created_at: model.created_at,
        })
    }
}
