//! Partners API endpoints

use api_types::{
    DeleteQuery,
    partner::{PartnerNew, PartnerUpdate, PartnerView, PartnersResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NewPartnerCmd, UpdatePartnerCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{contact_from_api, partner_balance_view, partner_view, tree},
    server::{Owner, ServerState},
};

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<PartnerNew>,
) -> Result<(StatusCode, Json<PartnerView>), ServerError> {
    let mut cmd =
        NewPartnerCmd::new(owner, payload.name).contact(contact_from_api(payload.contact));
    if let Some(parent_id) = payload.parent_id {
        cmd = cmd.parent_id(parent_id);
    }

    let partner = state.engine.create_partner(cmd).await?;
    Ok((StatusCode::CREATED, Json(partner_view(partner))))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<PartnersResponse>, ServerError> {
    let trees = state.engine.partners_with_rollup(&owner).await?;
    Ok(Json(PartnersResponse {
        partners: trees
            .into_iter()
            .map(|t| tree(t, partner_balance_view))
            .collect(),
    }))
}

pub async fn update(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PartnerUpdate>,
) -> Result<Json<PartnerView>, ServerError> {
    let mut cmd = UpdatePartnerCmd::new(id, owner);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(contact) = payload.contact {
        cmd = cmd.contact(contact_from_api(contact));
    }
    if payload.clear_parent {
        cmd = cmd.clear_parent();
    } else if let Some(parent_id) = payload.parent_id {
        cmd = cmd.parent_id(parent_id);
    }

    let partner = state.engine.update_partner(cmd).await?;
    Ok(Json(partner_view(partner)))
}

pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_partner(id, &owner, query.replacement_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
