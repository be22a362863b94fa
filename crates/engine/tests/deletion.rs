mod common;

use common::{OWNER, account, category, engine_with_db, expense, income, record};
use engine::{
    AccountKind, CategoryKind, EngineError, NewCategoryCmd, NewPartnerCmd, TransactionListFilter,
};
use uuid::Uuid;

#[tokio::test]
async fn partner_with_child_and_transaction_reports_children_first() {
    let (engine, _db) = engine_with_db().await;
    let cash = account(&engine, "Cash", AccountKind::Payment, 100).await;
    let acme = engine
        .create_partner(NewPartnerCmd::new(OWNER, "Acme"))
        .await
        .unwrap();
    engine
        .create_partner(NewPartnerCmd::new(OWNER, "Acme Shop").parent_id(acme.id))
        .await
        .unwrap();
    record(&engine, expense(cash.id, 10).partner_id(acme.id)).await;

    let err = engine.delete_partner(acme.id, OWNER, None).await.unwrap_err();
    assert!(matches!(err, EngineError::HasChildren(_)));

    let err = engine
        .delete_partner(acme.id, OWNER, Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::HasChildren(_)));
}

#[tokio::test]
async fn referenced_category_needs_a_replacement() {
    let (engine, _db) = engine_with_db().await;
    let cash = account(&engine, "Cash", AccountKind::Payment, 100).await;
    let food = category(&engine, "Food", CategoryKind::Expense).await;
    record(&engine, expense(cash.id, 10).to_category(food.id)).await;

    let err = engine.delete_category(food.id, OWNER, None).await.unwrap_err();
    assert!(matches!(err, EngineError::HasReferencingTransactions(_)));

    let trees = engine.categories_with_rollup(OWNER).await.unwrap();
    assert_eq!(trees.len(), 1);
}

#[tokio::test]
async fn category_reassignment_moves_every_reference() {
    let (engine, _db) = engine_with_db().await;
    let cash = account(&engine, "Cash", AccountKind::Payment, 100).await;
    let food = category(&engine, "Food", CategoryKind::Expense).await;
    let groceries = category(&engine, "Groceries", CategoryKind::Expense).await;

    record(&engine, expense(cash.id, 10).to_category(food.id)).await;
    let cancelled = record(&engine, expense(cash.id, 20).to_category(food.id)).await;
    engine.delete_transaction(cancelled.id, OWNER).await.unwrap();

    engine
        .delete_category(food.id, OWNER, Some(groceries.id))
        .await
        .unwrap();

    let left = engine
        .list_transactions(
            OWNER,
            TransactionListFilter::default()
                .category_id(food.id)
                .include_deleted(true),
        )
        .await
        .unwrap();
    assert!(left.is_empty());

    let moved = engine
        .list_transactions(
            OWNER,
            TransactionListFilter::default()
                .category_id(groceries.id)
                .include_deleted(true),
        )
        .await
        .unwrap();
    assert_eq!(moved.len(), 2);
    assert!(
        moved
            .iter()
            .all(|tx| tx.movement.category_id() == Some(groceries.id))
    );

    let trees = engine.categories_with_rollup(OWNER).await.unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].root.category.id, groceries.id);
    assert_eq!(trees[0].root.balance.minor(), -10);
}

#[tokio::test]
async fn invalid_replacement_leaves_everything_in_place() {
    let (engine, _db) = engine_with_db().await;
    let cash = account(&engine, "Cash", AccountKind::Payment, 100).await;
    let salary = category(&engine, "Salary", CategoryKind::Income).await;
    let bonus = category(&engine, "Bonus", CategoryKind::Income).await;
    let food = category(&engine, "Food", CategoryKind::Expense).await;
    let foreign = engine
        .create_category(NewCategoryCmd::new("bob", "Salary", CategoryKind::Income))
        .await
        .unwrap();
    record(&engine, income(salary.id, cash.id, 50)).await;

    for replacement in [salary.id, food.id, foreign.id, Uuid::new_v4()] {
        let err = engine
            .delete_category(salary.id, OWNER, Some(replacement))
            .await
            .unwrap_err();
        assert!(
            matches!(err, EngineError::ReassignmentIncomplete(_)),
            "replacement {replacement}: {err}"
        );
    }

    let still_there = engine
        .list_transactions(OWNER, TransactionListFilter::default().category_id(salary.id))
        .await
        .unwrap();
    assert_eq!(still_there.len(), 1);

    engine
        .delete_category(salary.id, OWNER, Some(bonus.id))
        .await
        .unwrap();
    let err = engine.delete_category(salary.id, OWNER, None).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn category_with_children_or_only_deleted_transactions() {
    let (engine, _db) = engine_with_db().await;
    let cash = account(&engine, "Cash", AccountKind::Payment, 100).await;
    let food = category(&engine, "Food", CategoryKind::Expense).await;
    let snacks = engine
        .create_category(NewCategoryCmd::new(OWNER, "Snacks", CategoryKind::Expense).parent_id(food.id))
        .await
        .unwrap();

    let err = engine.delete_category(food.id, OWNER, None).await.unwrap_err();
    assert!(matches!(err, EngineError::HasChildren(_)));

    let tx = record(&engine, expense(cash.id, 5).to_category(snacks.id)).await;
    engine.delete_transaction(tx.id, OWNER).await.unwrap();

    // Only soft-deleted transactions are left, so no replacement is needed.
    engine.delete_category(snacks.id, OWNER, None).await.unwrap();
    engine.delete_category(food.id, OWNER, None).await.unwrap();
    assert!(engine.categories_with_rollup(OWNER).await.unwrap().is_empty());
}

#[tokio::test]
async fn partner_reassignment_moves_every_reference() {
    let (engine, _db) = engine_with_db().await;
    let cash = account(&engine, "Cash", AccountKind::Payment, 100).await;
    let old = engine
        .create_partner(NewPartnerCmd::new(OWNER, "Old shop"))
        .await
        .unwrap();
    let new = engine
        .create_partner(NewPartnerCmd::new(OWNER, "New shop"))
        .await
        .unwrap();
    record(&engine, expense(cash.id, 10).partner_id(old.id)).await;
    record(&engine, expense(cash.id, 15).partner_id(old.id)).await;

    let err = engine.delete_partner(old.id, OWNER, None).await.unwrap_err();
    assert!(matches!(err, EngineError::HasReferencingTransactions(_)));
    let err = engine
        .delete_partner(old.id, OWNER, Some(old.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ReassignmentIncomplete(_)));

    engine
        .delete_partner(old.id, OWNER, Some(new.id))
        .await
        .unwrap();

    let moved = engine
        .list_transactions(OWNER, TransactionListFilter::default().partner_id(new.id))
        .await
        .unwrap();
    assert_eq!(moved.len(), 2);
    let trees = engine.partners_with_rollup(OWNER).await.unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].root.partner.id, new.id);
    assert_eq!(trees[0].root.balance.minor(), -25);
}
