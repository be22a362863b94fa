//! Deletion of accounts, categories and partners.
//!
//! A node with children is never deleted. A node referenced by live
//! transactions is deleted only after every reference, including those of
//! soft-deleted transactions, has been moved to a replacement. Repointing,
//! verification and removal share one database transaction.

use sea_orm::{
    Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, prelude::*, sea_query::Expr,
};
use tracing::info;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, accounts, categories, partners, transactions};

use super::Engine;

impl Engine {
    /// Deletes an account without children or live transactions.
    ///
    /// Accounts take no replacement. The former parent, if any, is
    /// recomputed from the remaining children.
    pub async fn delete_account(&self, id: Uuid, owner_id: &str) -> ResultEngine<()> {
        let owner_id = owner_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let account = engine.require_account(db_tx, id, &owner_id, true).await?;
                if engine.account_has_children(db_tx, id).await? {
                    return Err(EngineError::HasChildren(format!("account {id}")));
                }
                if engine.count_account_references(db_tx, id).await? > 0 {
                    return Err(EngineError::HasReferencingTransactions(format!(
                        "account {id}"
                    )));
                }

                accounts::Entity::delete_by_id(id.to_string())
                    .exec(db_tx)
                    .await?;
                if let Some(parent_id) = account.parent_id {
                    engine.recompute_parent_balance(db_tx, parent_id).await?;
                }
                info!(account_id = %id, "account deleted");
                Ok(())
            })
        })
        .await
    }

    /// Deletes a category, moving its transactions to `replacement_id` first.
    ///
    /// The replacement must be another category of the same owner and kind.
    pub async fn delete_category(
        &self,
        id: Uuid,
        owner_id: &str,
        replacement_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        let owner_id = owner_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let category = engine.require_category(db_tx, id, &owner_id).await?;
                if engine.category_has_children(db_tx, id).await? {
                    return Err(EngineError::HasChildren(format!("category {id}")));
                }
                let live = engine.count_category_references(db_tx, id, true).await?;

                match replacement_id {
                    None if live > 0 => {
                        return Err(EngineError::HasReferencingTransactions(format!(
                            "category {id}"
                        )));
                    }
                    None => {}
                    Some(replacement_id) => {
                        if replacement_id == id {
                            return Err(EngineError::ReassignmentIncomplete(format!(
                                "category {id} cannot replace itself"
                            )));
                        }
                        let replacement = engine
                            .find_category(db_tx, replacement_id, &owner_id)
                            .await?
                            .ok_or_else(|| {
                                EngineError::ReassignmentIncomplete(format!(
                                    "replacement category {replacement_id} not found"
                                ))
                            })?;
                        if replacement.kind != category.kind {
                            return Err(EngineError::ReassignmentIncomplete(format!(
                                "replacement category {replacement_id} is {}, expected {}",
                                replacement.kind, category.kind
                            )));
                        }

                        for column in [
                            transactions::Column::FromCategoryId,
                            transactions::Column::ToCategoryId,
                        ] {
                            transactions::Entity::update_many()
                                .col_expr(column, Expr::value(replacement_id.to_string()))
                                .col_expr(
                                    transactions::Column::UpdatedBy,
                                    Expr::value(owner_id.clone()),
                                )
                                .filter(column.eq(id.to_string()))
                                .exec(db_tx)
                                .await?;
                        }
                        let left = engine.count_category_references(db_tx, id, false).await?;
                        if left > 0 {
                            return Err(EngineError::ReassignmentIncomplete(format!(
                                "{left} transactions still reference category {id}"
                            )));
                        }
                        info!(
                            category_id = %id,
                            replacement_id = %replacement_id,
                            moved = live,
                            "category transactions reassigned"
                        );
                    }
                }

                categories::Entity::delete_by_id(id.to_string())
                    .exec(db_tx)
                    .await?;
                info!(category_id = %id, "category deleted");
                Ok(())
            })
        })
        .await
    }

    /// Deletes a partner, moving its transactions to `replacement_id` first.
    pub async fn delete_partner(
        &self,
        id: Uuid,
        owner_id: &str,
        replacement_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        let owner_id = owner_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                engine.require_partner(db_tx, id, &owner_id).await?;
                if engine.partner_has_children(db_tx, id).await? {
                    return Err(EngineError::HasChildren(format!("partner {id}")));
                }
                let live = engine.count_partner_references(db_tx, id, true).await?;

                match replacement_id {
                    None if live > 0 => {
                        return Err(EngineError::HasReferencingTransactions(format!(
                            "partner {id}"
                        )));
                    }
                    None => {}
                    Some(replacement_id) => {
                        if replacement_id == id {
                            return Err(EngineError::ReassignmentIncomplete(format!(
                                "partner {id} cannot replace itself"
                            )));
                        }
                        if engine
                            .find_partner(db_tx, replacement_id, &owner_id)
                            .await?
                            .is_none()
                        {
                            return Err(EngineError::ReassignmentIncomplete(format!(
                                "replacement partner {replacement_id} not found"
                            )));
                        }

                        transactions::Entity::update_many()
                            .col_expr(
                                transactions::Column::PartnerId,
                                Expr::value(replacement_id.to_string()),
                            )
                            .col_expr(transactions::Column::UpdatedBy, Expr::value(owner_id.clone()))
                            .filter(transactions::Column::PartnerId.eq(id.to_string()))
                            .exec(db_tx)
                            .await?;
                        let left = engine.count_partner_references(db_tx, id, false).await?;
                        if left > 0 {
                            return Err(EngineError::ReassignmentIncomplete(format!(
                                "{left} transactions still reference partner {id}"
                            )));
                        }
                        info!(
                            partner_id = %id,
                            replacement_id = %replacement_id,
                            moved = live,
                            "partner transactions reassigned"
                        );
                    }
                }

                partners::Entity::delete_by_id(id.to_string())
                    .exec(db_tx)
                    .await?;
                info!(partner_id = %id, "partner deleted");
                Ok(())
            })
        })
        .await
    }

    async fn count_account_references(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<u64> {
        let id = id.to_string();
        let count = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::FromAccountId.eq(id.as_str()))
                    .add(transactions::Column::ToAccountId.eq(id.as_str())),
            )
            .filter(transactions::Column::DeletedAt.is_null())
            .count(db_tx)
            .await?;
        Ok(count)
    }

    /// Counts transactions pointing at a category; `live_only` skips
    /// soft-deleted ones.
    pub(super) async fn count_category_references(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
        live_only: bool,
    ) -> ResultEngine<u64> {
        let id = id.to_string();
        let mut query = transactions::Entity::find().filter(
            Condition::any()
                .add(transactions::Column::FromCategoryId.eq(id.as_str()))
                .add(transactions::Column::ToCategoryId.eq(id.as_str())),
        );
        if live_only {
            query = query.filter(transactions::Column::DeletedAt.is_null());
        }
        Ok(query.count(db_tx).await?)
    }

    async fn count_partner_references(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
        live_only: bool,
    ) -> ResultEngine<u64> {
        let mut query =
            transactions::Entity::find().filter(transactions::Column::PartnerId.eq(id.to_string()));
        if live_only {
            query = query.filter(transactions::Column::DeletedAt.is_null());
        }
        Ok(query.count(db_tx).await?)
    }
}
