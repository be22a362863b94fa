//! Money movements: the only path that changes account balances.
//!
//! Every movement is a list of `(account, delta)` pairs. Before anything is
//! written each endpoint, and the parent of each endpoint, is projected
//! through the account policy; the whole list is applied or none of it is.

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QuerySelect, prelude::*};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    Account, CategoryKind, Currency, EngineError, Money, Movement, NewTransactionCmd,
    ResultEngine, Transaction, policy, transactions,
    util::{ensure_same_currency, normalize_optional_text},
};

use super::Engine;

/// A validated balance change, ready to be written.
struct PlannedBalance {
    account: Account,
    balance: Money,
}

impl Engine {
    /// Records an income, expense or transfer and moves the money.
    ///
    /// Fails without side effects when any account involved, or its parent,
    /// would end up outside its policy.
    pub async fn create_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Transaction> {
        let movement = Movement::from_refs(cmd.kind, cmd.refs)?;
        let tx = Transaction::new(
            cmd.owner_id.clone(),
            movement,
            Money::new(cmd.amount_minor),
            cmd.currency,
            cmd.occurred_at,
            cmd.partner_id,
            normalize_optional_text(cmd.note.as_deref()),
            cmd.owner_id,
        )?;

        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                if let Some(category_id) = tx.movement.category_id() {
                    let category = engine
                        .require_category(db_tx, category_id, &tx.owner_id)
                        .await?;
                    let expected = match tx.movement {
                        Movement::Income { .. } => CategoryKind::Income,
                        _ => CategoryKind::Expense,
                    };
                    if category.kind != expected {
                        return Err(EngineError::Validation(format!(
                            "{} transaction needs an {expected} category, {} is {}",
                            tx.kind(),
                            category.id,
                            category.kind
                        )));
                    }
                }
                if let Some(partner_id) = tx.partner_id {
                    engine
                        .require_partner(db_tx, partner_id, &tx.owner_id)
                        .await?;
                }

                let deltas = tx.movement.account_deltas(tx.amount);
                engine
                    .apply_account_deltas(db_tx, &tx.owner_id, tx.currency, deltas)
                    .await?;

                transactions::ActiveModel::from(&tx).insert(db_tx).await?;
                debug!(
                    transaction_id = %tx.id,
                    kind = %tx.kind(),
                    amount = %tx.amount.display(tx.currency),
                    "transaction created"
                );
                Ok(tx)
            })
        })
        .await
    }

    /// Soft-deletes a transaction and reverses its effect on balances.
    ///
    /// The reversal is checked like any other movement: if it would break an
    /// account policy the transaction stays in place.
    pub async fn delete_transaction(&self, id: Uuid, owner_id: &str) -> ResultEngine<()> {
        let owner_id = owner_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let model = transactions::Entity::find_by_id(id.to_string())
                    .filter(transactions::Column::OwnerId.eq(owner_id.as_str()))
                    .filter(transactions::Column::DeletedAt.is_null())
                    .lock_exclusive()
                    .one(db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")))?;
                let tx = Transaction::try_from(model)?;

                let reversal = tx
                    .movement
                    .account_deltas(tx.amount)
                    .into_iter()
                    .map(|(account_id, delta)| (account_id, -delta))
                    .collect();
                engine
                    .apply_account_deltas(db_tx, &owner_id, tx.currency, reversal)
                    .await?;

                let active = transactions::ActiveModel {
                    id: ActiveValue::Set(id.to_string()),
                    deleted_at: ActiveValue::Set(Some(Utc::now())),
                    deleted_by: ActiveValue::Set(Some(owner_id.clone())),
                    updated_by: ActiveValue::Set(owner_id.clone()),
                    ..Default::default()
                };
                active.update(db_tx).await?;
                info!(transaction_id = %id, "transaction deleted");
                Ok(())
            })
        })
        .await
    }

    /// Applies `deltas` to the accounts of `owner_id`.
    ///
    /// Endpoints are locked in id order. A parent with children is never an
    /// endpoint: its balance only follows its children.
    async fn apply_account_deltas(
        &self,
        db_tx: &DatabaseTransaction,
        owner_id: &str,
        currency: Currency,
        mut deltas: Vec<(Uuid, Money)>,
    ) -> ResultEngine<()> {
        deltas.sort_by_key(|(account_id, _)| *account_id);

        let mut planned = Vec::with_capacity(deltas.len());
        let mut parent_deltas: BTreeMap<Uuid, Money> = BTreeMap::new();
        for (account_id, delta) in deltas {
            let account = self
                .require_account(db_tx, account_id, owner_id, true)
                .await?;
            ensure_same_currency(currency, account.currency)?;
            if self.account_has_children(db_tx, account.id).await? {
                return Err(EngineError::Validation(format!(
                    "account {} has children, move money through them",
                    account.id
                )));
            }

            let balance = account.balance.try_add(delta)?;
            policy::validate_projected(account.kind, balance, account.limit)?;
            if let Some(parent_id) = account.parent_id {
                let entry = parent_deltas.entry(parent_id).or_default();
                *entry = entry.try_add(delta)?;
            }
            planned.push(PlannedBalance { account, balance });
        }

        for (parent_id, delta) in &parent_deltas {
            let parent = self
                .require_account(db_tx, *parent_id, owner_id, true)
                .await?;
            let balance = parent.balance.try_add(*delta)?;
            policy::validate_projected(parent.kind, balance, parent.limit)?;
        }

        for PlannedBalance { account, balance } in planned {
            self.persist_account_balance(db_tx, account.id, balance)
                .await?;
            debug!(
                account_id = %account.id,
                from = account.balance.minor(),
                to = balance.minor(),
                "account balance changed"
            );
        }
        for parent_id in parent_deltas.into_keys() {
            self.recompute_parent_balance(db_tx, parent_id).await?;
        }
        Ok(())
    }
}
