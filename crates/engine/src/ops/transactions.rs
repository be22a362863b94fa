use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction, TransactionListFilter, transactions};

use super::Engine;

impl Engine {
    /// Returns a transaction of `owner_id`, soft-deleted ones included.
    pub async fn transaction(&self, id: Uuid, owner_id: &str) -> ResultEngine<Transaction> {
        let owner_id = owner_id.to_string();
        self.with_tx(|_, db_tx| {
            Box::pin(async move {
                let model = transactions::Entity::find_by_id(id.to_string())
                    .filter(transactions::Column::OwnerId.eq(owner_id.as_str()))
                    .one(db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")))?;
                Transaction::try_from(model)
            })
        })
        .await
    }

    /// Lists transactions of `owner_id`, newest first.
    ///
    /// Soft-deleted transactions are hidden unless `include_deleted` is set.
    pub async fn list_transactions(
        &self,
        owner_id: &str,
        filter: TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let owner_id = owner_id.to_string();
        self.with_tx(|_, db_tx| {
            Box::pin(async move {
                let mut query = transactions::Entity::find()
                    .filter(transactions::Column::OwnerId.eq(owner_id.as_str()));
                if !filter.include_deleted {
                    query = query.filter(transactions::Column::DeletedAt.is_null());
                }
                if let Some(account_id) = filter.account_id {
                    let account_id = account_id.to_string();
                    query = query.filter(
                        Condition::any()
                            .add(transactions::Column::FromAccountId.eq(account_id.as_str()))
                            .add(transactions::Column::ToAccountId.eq(account_id.as_str())),
                    );
                }
                if let Some(category_id) = filter.category_id {
                    let category_id = category_id.to_string();
                    query = query.filter(
                        Condition::any()
                            .add(transactions::Column::FromCategoryId.eq(category_id.as_str()))
                            .add(transactions::Column::ToCategoryId.eq(category_id.as_str())),
                    );
                }
                if let Some(partner_id) = filter.partner_id {
                    query = query.filter(transactions::Column::PartnerId.eq(partner_id.to_string()));
                }
                if let Some(limit) = filter.limit {
                    query = query.limit(limit);
                }

                query
                    .order_by_desc(transactions::Column::OccurredAt)
                    .order_by_desc(transactions::Column::CreatedAt)
                    .all(db_tx)
                    .await?
                    .into_iter()
                    .map(Transaction::try_from)
                    .collect()
            })
        })
        .await
    }
}
