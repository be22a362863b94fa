//! Accounts API endpoints

use api_types::account::{AccountNew, AccountUpdate, AccountView, AccountsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewAccountCmd, UpdateAccountCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{account_kind_from_api, account_view, currency_from_api, tree},
    server::{Owner, ServerState},
};

/// Handle requests for creating a new account
pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let mut cmd = NewAccountCmd::new(
        owner,
        payload.name,
        account_kind_from_api(payload.kind),
        currency_from_api(payload.currency),
    )
    .balance_minor(payload.balance_minor);
    if let Some(limit_minor) = payload.limit_minor {
        cmd = cmd.limit_minor(limit_minor);
    }
    if let Some(parent_id) = payload.parent_id {
        cmd = cmd.parent_id(parent_id);
    }

    let account = state.engine.create_account(cmd).await?;
    Ok((StatusCode::CREATED, Json(account_view(account))))
}

/// Handle requests for listing the account trees
pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<AccountsResponse>, ServerError> {
    let trees = state.engine.accounts_with_rollup(&owner).await?;
    Ok(Json(AccountsResponse {
        accounts: trees.into_iter().map(|t| tree(t, account_view)).collect(),
    }))
}

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(id, &owner).await?;
    Ok(Json(account_view(account)))
}

/// Handle partial account updates
pub async fn update(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let mut cmd = UpdateAccountCmd::new(id, owner);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(balance_minor) = payload.balance_minor {
        cmd = cmd.balance_minor(balance_minor);
    }
    if payload.clear_limit {
        cmd = cmd.clear_limit();
    } else if let Some(limit_minor) = payload.limit_minor {
        cmd = cmd.limit_minor(limit_minor);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(account_kind_from_api(kind));
    }
    if payload.clear_parent {
        cmd = cmd.clear_parent();
    } else if let Some(parent_id) = payload.parent_id {
        cmd = cmd.parent_id(parent_id);
    }

    let account = state.engine.update_account(cmd).await?;
    Ok(Json(account_view(account)))
}

pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(id, &owner).await?;
    Ok(StatusCode::NO_CONTENT)
}
