mod common;

use common::{OWNER, account, category, engine_with_db, expense, income, record, transfer};
use engine::{
    AccountKind, CategoryKind, EngineError, HierarchyError, NewCategoryCmd, NewPartnerCmd,
    PartnerContact, UpdateCategoryCmd, UpdatePartnerCmd,
};

#[tokio::test]
async fn category_rollup_sums_children() {
    let (engine, _db) = engine_with_db().await;
    let cash = account(&engine, "Cash", AccountKind::Payment, 1_000).await;
    let savings = account(&engine, "Savings", AccountKind::Saving, 0).await;
    let food = category(&engine, "Food", CategoryKind::Expense).await;
    let groceries = engine
        .create_category(
            NewCategoryCmd::new(OWNER, "Groceries", CategoryKind::Expense).parent_id(food.id),
        )
        .await
        .unwrap();
    let restaurants = engine
        .create_category(
            NewCategoryCmd::new(OWNER, "Restaurants", CategoryKind::Expense).parent_id(food.id),
        )
        .await
        .unwrap();
    let salary = category(&engine, "Salary", CategoryKind::Income).await;

    record(&engine, expense(cash.id, 30).to_category(groceries.id)).await;
    record(&engine, expense(cash.id, 20).to_category(restaurants.id)).await;
    record(&engine, expense(cash.id, 5).to_category(food.id)).await;
    record(&engine, income(salary.id, cash.id, 100)).await;
    record(&engine, transfer(cash.id, savings.id, 400)).await;
    let refunded = record(&engine, expense(cash.id, 70).to_category(groceries.id)).await;
    engine.delete_transaction(refunded.id, OWNER).await.unwrap();

    let trees = engine.categories_with_rollup(OWNER).await.unwrap();
    assert_eq!(trees.len(), 2);

    let food_tree = &trees[0];
    assert_eq!(food_tree.root.category.id, food.id);
    assert_eq!(food_tree.root.own_balance.minor(), -5);
    assert_eq!(food_tree.root.balance.minor(), -55);
    let children: Vec<(String, i64)> = food_tree
        .children
        .iter()
        .map(|child| (child.category.name.clone(), child.balance.minor()))
        .collect();
    assert_eq!(
        children,
        vec![("Groceries".to_string(), -30), ("Restaurants".to_string(), -20)]
    );

    let salary_tree = &trees[1];
    assert_eq!(salary_tree.root.category.id, salary.id);
    assert_eq!(salary_tree.root.balance.minor(), 100);
    assert!(salary_tree.children.is_empty());
}

#[tokio::test]
async fn category_hierarchy_rules() {
    let (engine, _db) = engine_with_db().await;
    let cash = account(&engine, "Cash", AccountKind::Payment, 100).await;
    let food = category(&engine, "Food", CategoryKind::Expense).await;
    let snacks = engine
        .create_category(NewCategoryCmd::new(OWNER, "Snacks", CategoryKind::Expense).parent_id(food.id))
        .await
        .unwrap();
    let salary = category(&engine, "Salary", CategoryKind::Income).await;

    let err = engine
        .create_category(
            NewCategoryCmd::new(OWNER, "Chips", CategoryKind::Expense).parent_id(snacks.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Hierarchy(HierarchyError::InvalidParentHierarchy(_))
    ));

    let err = engine
        .create_category(NewCategoryCmd::new(OWNER, "Tips", CategoryKind::Income).parent_id(food.id))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Hierarchy(HierarchyError::ParentTypeMismatch(_))
    ));

    let err = engine
        .update_category(UpdateCategoryCmd::new(food.id, OWNER).parent_id(food.id))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Hierarchy(HierarchyError::InvalidParentSelf(_))
    ));

    let err = engine
        .update_category(UpdateCategoryCmd::new(snacks.id, OWNER).kind(CategoryKind::Income))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    record(&engine, income(salary.id, cash.id, 10)).await;
    let err = engine
        .update_category(UpdateCategoryCmd::new(salary.id, OWNER).kind(CategoryKind::Expense))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let moved = engine
        .update_category(
            UpdateCategoryCmd::new(snacks.id, OWNER)
                .clear_parent()
                .name("Treats"),
        )
        .await
        .unwrap();
    assert_eq!(moved.parent_id, None);
    assert_eq!(moved.name, "Treats");
    assert_eq!(engine.categories_with_rollup(OWNER).await.unwrap().len(), 3);
}

#[tokio::test]
async fn partner_rollup_sums_children() {
    let (engine, _db) = engine_with_db().await;
    let cash = account(&engine, "Cash", AccountKind::Payment, 100).await;
    let salary = category(&engine, "Salary", CategoryKind::Income).await;
    let acme = engine
        .create_partner(NewPartnerCmd::new(OWNER, "Acme"))
        .await
        .unwrap();
    let branch = engine
        .create_partner(NewPartnerCmd::new(OWNER, "Acme Branch").parent_id(acme.id))
        .await
        .unwrap();

    record(&engine, income(salary.id, cash.id, 100).partner_id(branch.id)).await;
    record(&engine, expense(cash.id, 40).partner_id(acme.id)).await;

    let trees = engine.partners_with_rollup(OWNER).await.unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].root.own_balance.minor(), -40);
    assert_eq!(trees[0].root.balance.minor(), 60);
    assert_eq!(trees[0].children[0].partner.id, branch.id);
    assert_eq!(trees[0].children[0].balance.minor(), 100);

    let err = engine
        .create_partner(NewPartnerCmd::new(OWNER, "Acme Sub").parent_id(branch.id))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Hierarchy(HierarchyError::InvalidParentHierarchy(_))
    ));
}

#[tokio::test]
async fn partner_contacts_are_unique_per_owner() {
    let (engine, _db) = engine_with_db().await;
    let acme = engine
        .create_partner(
            NewPartnerCmd::new(OWNER, "Acme")
                .email("billing@acme.test")
                .tax_no("IT123"),
        )
        .await
        .unwrap();
    let other = engine
        .create_partner(NewPartnerCmd::new(OWNER, "Globex").phone("+39 555"))
        .await
        .unwrap();

    let err = engine
        .create_partner(NewPartnerCmd::new(OWNER, "Acme again").email(" billing@acme.test "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    engine
        .create_partner(NewPartnerCmd::new("bob", "Acme").email("billing@acme.test"))
        .await
        .unwrap();

    let err = engine
        .update_partner(UpdatePartnerCmd::new(other.id, OWNER).contact(PartnerContact {
            tax_no: Some("IT123".to_string()),
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // Updating a partner with its own values is fine.
    let updated = engine
        .update_partner(
            UpdatePartnerCmd::new(acme.id, OWNER)
                .name("Acme Corp")
                .contact(acme.contact.clone()),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Acme Corp");
    assert_eq!(updated.contact.email.as_deref(), Some("billing@acme.test"));

    // Blank values are dropped, not stored.
    let blank = engine
        .create_partner(NewPartnerCmd::new(OWNER, "Initech").email("   "))
        .await
        .unwrap();
    assert_eq!(blank.contact.email, None);
}
