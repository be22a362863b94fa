use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    Category, CategoryBalance, CategoryTree, EngineError, NewCategoryCmd, ResultEngine,
    UpdateCategoryCmd, categories,
    hierarchy::{build_forest, validate_parent_assignment},
    util::normalize_required_name,
};

use super::{
    Engine,
    aggregation::{RollupKey, rollup},
};

impl Engine {
    /// Creates a category, optionally under a root category of the same kind.
    pub async fn create_category(&self, cmd: NewCategoryCmd) -> ResultEngine<Category> {
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let name = normalize_required_name(&cmd.name, "category")?;
                let category = Category::new(cmd.owner_id, name, cmd.kind, cmd.parent_id);
                if let Some(parent_id) = category.parent_id {
                    engine
                        .check_category_parent(db_tx, &category, false, parent_id)
                        .await?;
                }

                categories::ActiveModel::from(&category).insert(db_tx).await?;
                debug!(category_id = %category.id, kind = %category.kind, "category created");
                Ok(category)
            })
        })
        .await
    }

    /// Renames, re-parents or changes the kind of a category.
    ///
    /// The kind is locked while the category is in a hierarchy or referenced
    /// by live transactions.
    pub async fn update_category(&self, cmd: UpdateCategoryCmd) -> ResultEngine<Category> {
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let mut category = engine
                    .require_category(db_tx, cmd.id, &cmd.owner_id)
                    .await?;
                let has_children = engine.category_has_children(db_tx, category.id).await?;

                if let Some(name) = cmd.name.as_deref() {
                    category.name = normalize_required_name(name, "category")?;
                }

                if let Some(kind) = cmd.kind
                    && kind != category.kind
                {
                    if category.parent_id.is_some() || has_children {
                        return Err(EngineError::Validation(format!(
                            "category {} is part of a hierarchy, its kind is locked",
                            category.id
                        )));
                    }
                    if engine
                        .count_category_references(db_tx, category.id, true)
                        .await?
                        > 0
                    {
                        return Err(EngineError::Validation(format!(
                            "category {} is used by transactions, its kind is locked",
                            category.id
                        )));
                    }
                    category.kind = kind;
                }

                if let Some(parent) = cmd.parent {
                    let target = parent.target();
                    if let Some(parent_id) = target
                        && target != category.parent_id
                    {
                        engine
                            .check_category_parent(db_tx, &category, has_children, parent_id)
                            .await?;
                    }
                    category.parent_id = target;
                }

                categories::ActiveModel::from(&category).update(db_tx).await?;
                debug!(category_id = %category.id, "category updated");
                Ok(category)
            })
        })
        .await
    }

    /// Returns the categories of `owner_id` with balances computed from live
    /// transactions, roots first with their children.
    pub async fn categories_with_rollup(&self, owner_id: &str) -> ResultEngine<Vec<CategoryTree>> {
        let owner_id = owner_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let rows = categories::Entity::find()
                    .filter(categories::Column::OwnerId.eq(owner_id.as_str()))
                    .order_by_asc(categories::Column::CreatedAt)
                    .all(db_tx)
                    .await?;
                let categories = rows
                    .into_iter()
                    .map(Category::try_from)
                    .collect::<ResultEngine<Vec<_>>>()?;
                let forest = build_forest(categories)?;
                let own = engine
                    .own_balances(db_tx, &owner_id, RollupKey::Category)
                    .await?;
                rollup(forest, &own, |category, own_balance, balance| {
                    CategoryBalance {
                        category,
                        own_balance,
                        balance,
                    }
                })
            })
        })
        .await
    }

    pub(super) async fn find_category(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
        owner_id: &str,
    ) -> ResultEngine<Option<Category>> {
        categories::Entity::find_by_id(id.to_string())
            .filter(categories::Column::OwnerId.eq(owner_id))
            .one(db_tx)
            .await?
            .map(Category::try_from)
            .transpose()
    }

    pub(super) async fn require_category(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
        owner_id: &str,
    ) -> ResultEngine<Category> {
        self.find_category(db_tx, id, owner_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("category {id}")))
    }

    pub(super) async fn category_has_children(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<bool> {
        let child = categories::Entity::find()
            .filter(categories::Column::ParentId.eq(id.to_string()))
            .one(db_tx)
            .await?;
        Ok(child.is_some())
    }

    async fn check_category_parent(
        &self,
        db_tx: &DatabaseTransaction,
        category: &Category,
        has_children: bool,
        parent_id: Uuid,
    ) -> ResultEngine<()> {
        let parent = self
            .find_category(db_tx, parent_id, &category.owner_id)
            .await?;
        validate_parent_assignment(
            "category",
            &category.node(has_children),
            parent_id,
            parent.as_ref().map(|parent| parent.node(true)).as_ref(),
        )?;
        Ok(())
    }
}
