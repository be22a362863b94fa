use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{Owner, run, run_with_listener, spawn_with_listener};

mod accounts;
mod categories;
mod convert;
mod partners;
mod server;
mod transactions;

pub mod types {
    pub mod account {
        pub use api_types::account::{AccountNew, AccountUpdate, AccountView, AccountsResponse};
    }

    pub mod category {
        pub use api_types::category::{
            CategoriesResponse, CategoryBalanceView, CategoryNew, CategoryUpdate, CategoryView,
        };
    }

    pub mod partner {
        pub use api_types::partner::{
            PartnerBalanceView, PartnerNew, PartnerUpdate, PartnerView, PartnersResponse,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionList, TransactionListResponse, TransactionNew, TransactionView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::HasChildren(_)
        | EngineError::HasReferencingTransactions(_)
        | EngineError::ReassignmentIncomplete(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidCurrency(_)
        | EngineError::InvalidBalance(_)
        | EngineError::Hierarchy(_)
        | EngineError::InsufficientBalance(_)
        | EngineError::InsufficientCreditLimit(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
