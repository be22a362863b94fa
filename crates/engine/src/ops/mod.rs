use std::{future::Future, pin::Pin};

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, warn};

use crate::ResultEngine;

mod accounts;
mod aggregation;
mod categories;
mod deletion;
mod partners;
mod transactions;
mod transfer;

/// Future returned by the closures passed to [`Engine::with_tx`].
pub(crate) type TxFuture<'c, T> = Pin<Box<dyn Future<Output = ResultEngine<T>> + Send + 'c>>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Runs `f` inside a DB transaction, committing on `Ok` and rolling back
    /// on `Err`.
    ///
    /// The closure receives the engine and the open transaction; every query
    /// it runs must go through `db_tx`. A panic drops the transaction, which
    /// rolls it back as well.
    pub(crate) async fn with_tx<T, F>(&self, f: F) -> ResultEngine<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c Engine, &'c DatabaseTransaction) -> TxFuture<'c, T> + Send,
    {
        let db_tx = self.database.begin().await?;
        let result = f(self, &db_tx).await;
        match result {
            Ok(value) => {
                db_tx.commit().await?;
                debug!("db transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = db_tx.rollback().await {
                    warn!(error = %rollback_err, "db transaction rollback failed");
                }
                debug!(error = %err, "db transaction rolled back");
                Err(err)
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
