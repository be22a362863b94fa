#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Account, AccountKind, Category, CategoryKind, Currency, Engine, NewAccountCmd,
    NewCategoryCmd, NewTransactionCmd, Transaction, TransactionKind,
};
use migration::MigratorTrait;
use uuid::Uuid;

pub const OWNER: &str = "alice";

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn account(engine: &Engine, name: &str, kind: AccountKind, balance: i64) -> Account {
    engine
        .create_account(NewAccountCmd::new(OWNER, name, kind, Currency::Eur).balance_minor(balance))
        .await
        .unwrap()
}

pub async fn credit_card(engine: &Engine, name: &str, balance: i64, limit: i64) -> Account {
    engine
        .create_account(
            NewAccountCmd::new(OWNER, name, AccountKind::CreditCard, Currency::Eur)
                .balance_minor(balance)
                .limit_minor(limit),
        )
        .await
        .unwrap()
}

pub async fn category(engine: &Engine, name: &str, kind: CategoryKind) -> Category {
    engine
        .create_category(NewCategoryCmd::new(OWNER, name, kind))
        .await
        .unwrap()
}

pub fn income(category_id: Uuid, account_id: Uuid, amount: i64) -> NewTransactionCmd {
    NewTransactionCmd::new(OWNER, TransactionKind::Income, amount, Currency::Eur, Utc::now())
        .from_category(category_id)
        .to_account(account_id)
}

pub fn expense(account_id: Uuid, amount: i64) -> NewTransactionCmd {
    NewTransactionCmd::new(OWNER, TransactionKind::Expense, amount, Currency::Eur, Utc::now())
        .from_account(account_id)
}

pub fn transfer(from: Uuid, to: Uuid, amount: i64) -> NewTransactionCmd {
    NewTransactionCmd::new(OWNER, TransactionKind::Transfer, amount, Currency::Eur, Utc::now())
        .from_account(from)
        .to_account(to)
}

pub async fn balance_of(engine: &Engine, id: Uuid) -> i64 {
    engine.account(id, OWNER).await.unwrap().balance.minor()
}

pub async fn record(engine: &Engine, cmd: NewTransactionCmd) -> Transaction {
    engine.create_transaction(cmd).await.unwrap()
}
