//! Transactions API endpoints

use api_types::transaction::{
    TransactionList, TransactionListResponse, TransactionNew, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{NewTransactionCmd, TransactionListFilter};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{currency_from_api, transaction_kind_from_api, transaction_view},
    server::{Owner, ServerState},
};

const DEFAULT_LIST_LIMIT: u64 = 50;
const MAX_LIST_LIMIT: u64 = 500;

/// Handle requests for recording an income, expense or transfer
pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = NewTransactionCmd::new(
        owner,
        transaction_kind_from_api(payload.kind),
        payload.amount_minor,
        currency_from_api(payload.currency),
        payload.occurred_at.with_timezone(&Utc),
    );
    if let Some(id) = payload.from_account_id {
        cmd = cmd.from_account(id);
    }
    if let Some(id) = payload.from_category_id {
        cmd = cmd.from_category(id);
    }
    if let Some(id) = payload.to_account_id {
        cmd = cmd.to_account(id);
    }
    if let Some(id) = payload.to_category_id {
        cmd = cmd.to_category(id);
    }
    if let Some(id) = payload.partner_id {
        cmd = cmd.partner_id(id);
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let tx = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if limit == 0 || limit > MAX_LIST_LIMIT {
        return Err(ServerError::Generic(format!(
            "limit must be between 1 and {MAX_LIST_LIMIT}"
        )));
    }

    let mut filter = TransactionListFilter::default()
        .include_deleted(query.include_deleted.unwrap_or(false))
        .limit(limit);
    if let Some(id) = query.account_id {
        filter = filter.account_id(id);
    }
    if let Some(id) = query.category_id {
        filter = filter.category_id(id);
    }
    if let Some(id) = query.partner_id {
        filter = filter.partner_id(id);
    }

    let txs = state.engine.list_transactions(&owner, filter).await?;
    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(transaction_view).collect(),
    }))
}

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, &owner).await?;
    Ok(Json(transaction_view(tx)))
}

/// Handle transaction deletion; the balance effect is reversed and the row
/// is kept as soft-deleted
pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id, &owner).await?;
    Ok(StatusCode::NO_CONTENT)
}
