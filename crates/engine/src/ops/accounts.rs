use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    Account, AccountTree, EngineError, Money, NewAccountCmd, ResultEngine, UpdateAccountCmd,
    accounts,
    hierarchy::{build_forest, validate_parent_assignment},
    policy,
    util::{ensure_same_currency, normalize_required_name},
};

use super::Engine;

impl Engine {
    /// Creates an account, optionally under a parent of the same kind.
    ///
    /// When a parent is given its balance is recomputed as the sum of its
    /// children, including the new one.
    pub async fn create_account(&self, cmd: NewAccountCmd) -> ResultEngine<Account> {
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let name = normalize_required_name(&cmd.name, "account")?;
                let account = Account::new(
                    cmd.owner_id,
                    name,
                    cmd.kind,
                    cmd.currency,
                    Money::new(cmd.balance_minor),
                    cmd.limit_minor.map(Money::new),
                    cmd.parent_id,
                )?;

                if let Some(parent_id) = account.parent_id {
                    engine
                        .check_account_parent(db_tx, &account, false, parent_id)
                        .await?;
                }

                accounts::ActiveModel::from(&account).insert(db_tx).await?;
                debug!(account_id = %account.id, kind = %account.kind, "account created");

                if let Some(parent_id) = account.parent_id {
                    engine.recompute_parent_balance(db_tx, parent_id).await?;
                }

                Ok(account)
            })
        })
        .await
    }

    /// Updates name, balance, limit, kind or parent of an account.
    ///
    /// Accounts inside a hierarchy cannot change kind, and a parent with
    /// children cannot have its balance edited.
    pub async fn update_account(&self, cmd: UpdateAccountCmd) -> ResultEngine<Account> {
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let mut account = engine
                    .require_account(db_tx, cmd.id, &cmd.owner_id, true)
                    .await?;
                let has_children = engine.account_has_children(db_tx, account.id).await?;
                let old_parent = account.parent_id;

                if let Some(name) = cmd.name.as_deref() {
                    account.name = normalize_required_name(name, "account")?;
                }

                if let Some(kind) = cmd.kind
                    && kind != account.kind
                {
                    if account.parent_id.is_some() || has_children {
                        return Err(EngineError::Validation(format!(
                            "account {} is part of a hierarchy, its kind is locked",
                            account.id
                        )));
                    }
                    account.kind = kind;
                }

                if let Some(limit) = cmd.limit_minor {
                    account.limit = limit.map(Money::new);
                }

                if let Some(balance) = cmd.balance_minor {
                    if has_children {
                        return Err(EngineError::InvalidBalance(format!(
                            "balance of account {} is the sum of its children",
                            account.id
                        )));
                    }
                    account.balance = Money::new(balance);
                }

                if let Some(parent) = cmd.parent {
                    let target = parent.target();
                    if let Some(parent_id) = target
                        && target != account.parent_id
                    {
                        engine
                            .check_account_parent(db_tx, &account, has_children, parent_id)
                            .await?;
                    }
                    account.parent_id = target;
                }

                policy::validate(account.kind, account.balance, account.limit)?;
                account.updated_at = Utc::now();
                accounts::ActiveModel::from(&account).update(db_tx).await?;
                debug!(account_id = %account.id, balance = account.balance.minor(), "account updated");

                if let Some(parent_id) = account.parent_id {
                    engine.recompute_parent_balance(db_tx, parent_id).await?;
                }
                if let Some(old_parent) = old_parent
                    && account.parent_id != Some(old_parent)
                {
                    engine.recompute_parent_balance(db_tx, old_parent).await?;
                }

                Ok(account)
            })
        })
        .await
    }

    /// Returns an account of `owner_id`.
    pub async fn account(&self, id: Uuid, owner_id: &str) -> ResultEngine<Account> {
        let owner_id = owner_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move { engine.require_account(db_tx, id, &owner_id, false).await })
        })
        .await
    }

    /// Returns every account of `owner_id` grouped as roots and children.
    ///
    /// Parent balances are the stored sums of their children.
    pub async fn accounts_with_rollup(&self, owner_id: &str) -> ResultEngine<Vec<AccountTree>> {
        let owner_id = owner_id.to_string();
        self.with_tx(|_, db_tx| {
            Box::pin(async move {
                let rows = accounts::Entity::find()
                    .filter(accounts::Column::OwnerId.eq(owner_id.as_str()))
                    .order_by_asc(accounts::Column::CreatedAt)
                    .all(db_tx)
                    .await?;
                let accounts = rows
                    .into_iter()
                    .map(Account::try_from)
                    .collect::<ResultEngine<Vec<_>>>()?;
                Ok(build_forest(accounts)?)
            })
        })
        .await
    }

    /// Loads an account of `owner_id`, taking a write lock when `lock` is set.
    pub(super) async fn find_account(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
        owner_id: &str,
        lock: bool,
    ) -> ResultEngine<Option<Account>> {
        let mut query = accounts::Entity::find_by_id(id.to_string())
            .filter(accounts::Column::OwnerId.eq(owner_id));
        if lock {
            query = query.lock_exclusive();
        }
        query.one(db_tx).await?.map(Account::try_from).transpose()
    }

    pub(super) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
        owner_id: &str,
        lock: bool,
    ) -> ResultEngine<Account> {
        self.find_account(db_tx, id, owner_id, lock)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("account {id}")))
    }

    pub(super) async fn account_has_children(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<bool> {
        let child = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(id.to_string()))
            .one(db_tx)
            .await?;
        Ok(child.is_some())
    }

    /// Checks that `account` may be placed under `parent_id`.
    async fn check_account_parent(
        &self,
        db_tx: &DatabaseTransaction,
        account: &Account,
        has_children: bool,
        parent_id: Uuid,
    ) -> ResultEngine<()> {
        let parent = self
            .find_account(db_tx, parent_id, &account.owner_id, true)
            .await?;
        validate_parent_assignment(
            "account",
            &account.node(has_children),
            parent_id,
            parent.as_ref().map(|parent| parent.node(true)).as_ref(),
        )?;
        if let Some(parent) = parent {
            ensure_same_currency(parent.currency, account.currency)?;
        }
        Ok(())
    }

    /// Writes the new balance of an account that is not a parent.
    pub(super) async fn persist_account_balance(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        balance: Money,
    ) -> ResultEngine<()> {
        let active = accounts::ActiveModel {
            id: ActiveValue::Set(account_id.to_string()),
            balance_minor: ActiveValue::Set(balance.minor()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        active.update(db_tx).await?;
        Ok(())
    }
}
