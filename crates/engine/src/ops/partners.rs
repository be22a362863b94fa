use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    EngineError, NewPartnerCmd, Partner, PartnerBalance, PartnerContact, PartnerTree,
    ResultEngine, UpdatePartnerCmd,
    hierarchy::{build_forest, validate_parent_assignment},
    partners,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{
    Engine,
    aggregation::{RollupKey, rollup},
};

fn normalize_contact(contact: &PartnerContact) -> PartnerContact {
    PartnerContact {
        email: normalize_optional_text(contact.email.as_deref()),
        phone: normalize_optional_text(contact.phone.as_deref()),
        tax_no: normalize_optional_text(contact.tax_no.as_deref()),
        identify: normalize_optional_text(contact.identify.as_deref()),
    }
}

impl Engine {
    /// Creates a partner. Each contact field that is set must be unique for
    /// the owner.
    pub async fn create_partner(&self, cmd: NewPartnerCmd) -> ResultEngine<Partner> {
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let name = normalize_required_name(&cmd.name, "partner")?;
                let contact = normalize_contact(&cmd.contact);
                let partner = Partner::new(cmd.owner_id, name, contact, cmd.parent_id);

                engine.ensure_unique_contact(db_tx, &partner).await?;
                if let Some(parent_id) = partner.parent_id {
                    engine
                        .check_partner_parent(db_tx, &partner, false, parent_id)
                        .await?;
                }

                partners::ActiveModel::from(&partner).insert(db_tx).await?;
                debug!(partner_id = %partner.id, "partner created");
                Ok(partner)
            })
        })
        .await
    }

    pub async fn update_partner(&self, cmd: UpdatePartnerCmd) -> ResultEngine<Partner> {
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let mut partner = engine
                    .require_partner(db_tx, cmd.id, &cmd.owner_id)
                    .await?;

                if let Some(name) = cmd.name.as_deref() {
                    partner.name = normalize_required_name(name, "partner")?;
                }
                if let Some(contact) = cmd.contact.as_ref() {
                    partner.contact = normalize_contact(contact);
                    engine.ensure_unique_contact(db_tx, &partner).await?;
                }
                if let Some(parent) = cmd.parent {
                    let target = parent.target();
                    if let Some(parent_id) = target
                        && target != partner.parent_id
                    {
                        let has_children = engine.partner_has_children(db_tx, partner.id).await?;
                        engine
                            .check_partner_parent(db_tx, &partner, has_children, parent_id)
                            .await?;
                    }
                    partner.parent_id = target;
                }

                partners::ActiveModel::from(&partner).update(db_tx).await?;
                debug!(partner_id = %partner.id, "partner updated");
                Ok(partner)
            })
        })
        .await
    }

    /// Returns the partners of `owner_id` with balances computed from live
    /// transactions, roots first with their children.
    pub async fn partners_with_rollup(&self, owner_id: &str) -> ResultEngine<Vec<PartnerTree>> {
        let owner_id = owner_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let rows = partners::Entity::find()
                    .filter(partners::Column::OwnerId.eq(owner_id.as_str()))
                    .order_by_asc(partners::Column::CreatedAt)
                    .all(db_tx)
                    .await?;
                let partners = rows
                    .into_iter()
                    .map(Partner::try_from)
                    .collect::<ResultEngine<Vec<_>>>()?;
                let forest = build_forest(partners)?;
                let own = engine
                    .own_balances(db_tx, &owner_id, RollupKey::Partner)
                    .await?;
                rollup(forest, &own, |partner, own_balance, balance| PartnerBalance {
                    partner,
                    own_balance,
                    balance,
                })
            })
        })
        .await
    }

    pub(super) async fn find_partner(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
        owner_id: &str,
    ) -> ResultEngine<Option<Partner>> {
        partners::Entity::find_by_id(id.to_string())
            .filter(partners::Column::OwnerId.eq(owner_id))
            .one(db_tx)
            .await?
            .map(Partner::try_from)
            .transpose()
    }

    pub(super) async fn require_partner(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
        owner_id: &str,
    ) -> ResultEngine<Partner> {
        self.find_partner(db_tx, id, owner_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("partner {id}")))
    }

    pub(super) async fn partner_has_children(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<bool> {
        let child = partners::Entity::find()
            .filter(partners::Column::ParentId.eq(id.to_string()))
            .one(db_tx)
            .await?;
        Ok(child.is_some())
    }

    async fn check_partner_parent(
        &self,
        db_tx: &DatabaseTransaction,
        partner: &Partner,
        has_children: bool,
        parent_id: Uuid,
    ) -> ResultEngine<()> {
        let parent = self
            .find_partner(db_tx, parent_id, &partner.owner_id)
            .await?;
        validate_parent_assignment(
            "partner",
            &partner.node(has_children),
            parent_id,
            parent.as_ref().map(|parent| parent.node(true)).as_ref(),
        )?;
        Ok(())
    }

    /// Rejects contact values already used by another partner of the owner.
    async fn ensure_unique_contact(
        &self,
        db_tx: &DatabaseTransaction,
        partner: &Partner,
    ) -> ResultEngine<()> {
        let fields = [
            ("email", partners::Column::Email, &partner.contact.email),
            ("phone", partners::Column::Phone, &partner.contact.phone),
            ("tax_no", partners::Column::TaxNo, &partner.contact.tax_no),
            ("identify", partners::Column::Identify, &partner.contact.identify),
        ];
        for (label, column, value) in fields {
            let Some(value) = value else {
                continue;
            };
            let clash = partners::Entity::find()
                .filter(partners::Column::OwnerId.eq(partner.owner_id.as_str()))
                .filter(column.eq(value.as_str()))
                .filter(partners::Column::Id.ne(partner.id.to_string()))
                .one(db_tx)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(format!("partner {label} {value}")));
            }
        }
        Ok(())
    }
}
