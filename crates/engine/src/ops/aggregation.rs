//! Parent balances for accounts, read-time rollups for categories and
//! partners.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    AccountKind, EngineError, Money, ResultEngine, Transaction, TransactionKind, Tree, accounts,
    hierarchy::Hierarchical, policy, transactions,
};

use super::Engine;

/// Which reference of a transaction a rollup follows.
#[derive(Clone, Copy, Debug)]
pub(super) enum RollupKey {
    Category,
    Partner,
}

impl Engine {
    /// Sets the balance of `parent_id` to the sum of its direct children.
    ///
    /// A parent left without children keeps its balance. The new sum must
    /// satisfy the parent's kind, otherwise nothing is written.
    pub(super) async fn recompute_parent_balance(
        &self,
        db_tx: &DatabaseTransaction,
        parent_id: Uuid,
    ) -> ResultEngine<()> {
        let children = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(parent_id.to_string()))
            .all(db_tx)
            .await?;
        if children.is_empty() {
            return Ok(());
        }
        let sum = Money::try_sum(children.iter().map(|child| Money::new(child.balance_minor)))?;

        let parent = accounts::Entity::find_by_id(parent_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("account {parent_id}")))?;
        let kind = AccountKind::try_from(parent.kind.as_str())?;
        let limit = parent.limit_minor.map(Money::new);
        policy::validate(kind, sum, limit)?;

        if parent.balance_minor == sum.minor() {
            return Ok(());
        }
        let active = accounts::ActiveModel {
            id: ActiveValue::Set(parent.id),
            balance_minor: ActiveValue::Set(sum.minor()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        active.update(db_tx).await?;
        debug!(account_id = %parent_id, balance = sum.minor(), "parent balance recomputed");
        Ok(())
    }

    /// Signed sum of the live transactions of `owner_id`, per referenced
    /// category or partner.
    ///
    /// Income counts positive, expense negative. Transfers are skipped.
    pub(super) async fn own_balances(
        &self,
        db_tx: &DatabaseTransaction,
        owner_id: &str,
        key: RollupKey,
    ) -> ResultEngine<HashMap<Uuid, Money>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(owner_id))
            .filter(transactions::Column::DeletedAt.is_null())
            .filter(transactions::Column::Kind.ne(TransactionKind::Transfer.as_str()))
            .all(db_tx)
            .await?;

        let mut balances: HashMap<Uuid, Money> = HashMap::new();
        for row in rows {
            let tx = Transaction::try_from(row)?;
            let target = match key {
                RollupKey::Category => tx.movement.category_id(),
                RollupKey::Partner => tx.partner_id,
            };
            let (Some(target), Some(signed)) = (target, tx.signed_amount()) else {
                continue;
            };
            let entry = balances.entry(target).or_default();
            *entry = entry.try_add(signed)?;
        }
        Ok(balances)
    }
}

/// Attaches `own` balances to every node and rolls children into roots.
///
/// With depth capped at two, a root's rollup is its own balance plus the
/// own balance of each child.
pub(super) fn rollup<T, B>(
    forest: Vec<Tree<T>>,
    own: &HashMap<Uuid, Money>,
    make: impl Fn(T, Money, Money) -> B,
) -> ResultEngine<Vec<Tree<B>>>
where
    T: Hierarchical,
{
    let own_of = |node: &T| own.get(&node.id()).copied().unwrap_or_default();
    forest
        .into_iter()
        .map(|tree| {
            let root_own = own_of(&tree.root);
            let children_sum = Money::try_sum(tree.children.iter().map(own_of))?;
            let root_balance = root_own.try_add(children_sum)?;
            let children = tree
                .children
                .into_iter()
                .map(|child| {
                    let child_own = own_of(&child);
                    make(child, child_own, child_own)
                })
                .collect();
            Ok(Tree {
                root: make(tree.root, root_own, root_balance),
                children,
            })
        })
        .collect()
}
