//! Partners: the people or organizations money is exchanged with.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Money,
    hierarchy::{Hierarchical, NodeRef},
    util::{parse_optional_uuid, parse_uuid},
};

/// Contact fields that must be unique per owner when present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PartnerContact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_no: Option<String>,
    pub identify: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Partner {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub contact: PartnerContact,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    pub fn new(
        owner_id: String,
        name: String,
        contact: PartnerContact,
        parent_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            contact,
            parent_id,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn node(&self, has_children: bool) -> NodeRef<'_, ()> {
        NodeRef {
            id: self.id,
            owner_id: &self.owner_id,
            parent_id: self.parent_id,
            kind: (),
            has_children,
        }
    }
}

impl Hierarchical for Partner {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }
}

/// A partner with the balance computed at read time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartnerBalance {
    pub partner: Partner,
    pub own_balance: Money,
    pub balance: Money,
}

impl Hierarchical for PartnerBalance {
    fn id(&self) -> Uuid {
        self.partner.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.partner.parent_id
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_no: Option<String>,
    pub identify: Option<String>,
    pub parent_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Partner> for ActiveModel {
    fn from(value: &Partner) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            email: ActiveValue::Set(value.contact.email.clone()),
            phone: ActiveValue::Set(value.contact.phone.clone()),
            tax_no: ActiveValue::Set(value.contact.tax_no.clone()),
            identify: ActiveValue::Set(value.contact.identify.clone()),
            parent_id: ActiveValue::Set(value.parent_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Partner {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "partner")?,
            owner_id: model.owner_id,
            name: model.name,
            contact: PartnerContact {
                email: model.email,
                phone: model.phone,
                tax_no: model.tax_no,
                identify: model.identify,
            },
            parent_id: parse_optional_uuid(model.parent_id.as_deref(), "parent partner")?,
            created_at: model.created_at,
        })
    }
}
