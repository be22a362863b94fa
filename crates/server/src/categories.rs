//! Categories API endpoints

use api_types::{
    DeleteQuery,
    category::{CategoriesResponse, CategoryNew, CategoryUpdate, CategoryView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NewCategoryCmd, UpdateCategoryCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{category_balance_view, category_kind_from_api, category_view, tree},
    server::{Owner, ServerState},
};

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let mut cmd = NewCategoryCmd::new(owner, payload.name, category_kind_from_api(payload.kind));
    if let Some(parent_id) = payload.parent_id {
        cmd = cmd.parent_id(parent_id);
    }

    let category = state.engine.create_category(cmd).await?;
    Ok((StatusCode::CREATED, Json(category_view(category))))
}

/// Handle requests for the category trees with their computed balances
pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<CategoriesResponse>, ServerError> {
    let trees = state.engine.categories_with_rollup(&owner).await?;
    Ok(Json(CategoriesResponse {
        categories: trees
            .into_iter()
            .map(|t| tree(t, category_balance_view))
            .collect(),
    }))
}

pub async fn update(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let mut cmd = UpdateCategoryCmd::new(id, owner);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(category_kind_from_api(kind));
    }
    if payload.clear_parent {
        cmd = cmd.clear_parent();
    } else if let Some(parent_id) = payload.parent_id {
        cmd = cmd.parent_id(parent_id);
    }

    let category = state.engine.update_category(cmd).await?;
    Ok(Json(category_view(category)))
}

/// Handle category deletion, optionally moving its transactions to
/// `replacement_id` first
pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_category(id, &owner, query.replacement_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
