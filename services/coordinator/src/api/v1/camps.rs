//! Camp API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use relief_id::CampId;
use serde::Deserialize;

use super::ListResponse;
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::state::AppState;
use crate::store::{Camp, NewCamp};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_camps).post(create_camp))
        .route("/{camp_id}", get(get_camp))
        .route("/{camp_id}/inventory", patch(set_inventory))
        .route("/{camp_id}/capacity", patch(set_capacity))
}

// =============================================================================
// Request Types
// =============================================================================

/// Request to set one inventory line.
#[derive(Debug, Deserialize)]
pub struct SetInventoryRequest {
    pub item: String,
    /// Signed so a negative value can be rejected as a validation error.
    pub quantity: i64,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Partial capacity update.
#[derive(Debug, Deserialize)]
pub struct SetCapacityRequest {
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub current_occupancy: Option<u32>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /v1/camps
async fn list_camps(State(state): State<AppState>) -> Json<ListResponse<Camp>> {
    Json(state.camps().list().await.into())
}

/// POST /v1/camps
async fn create_camp(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<NewCamp>,
) -> Result<impl IntoResponse, ApiError> {
    let camp = state
        .camps()
        .create(req)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok((StatusCode::CREATED, Json(camp)))
}

/// GET /v1/camps/{camp_id}
async fn get_camp(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(camp_id): Path<String>,
) -> Result<Json<Camp>, ApiError> {
    let camp_id: CampId = ctx.parse_id(&camp_id, CampId::KIND)?;
    let camp = state
        .camps()
        .get(camp_id)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(camp))
}

/// PATCH /v1/camps/{camp_id}/inventory
///
/// Field edits do not raise an inventory alert; field agents announce
/// changes on the push channel themselves.
async fn set_inventory(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(camp_id): Path<String>,
    Json(req): Json<SetInventoryRequest>,
) -> Result<Json<Camp>, ApiError> {
    let camp_id: CampId = ctx.parse_id(&camp_id, CampId::KIND)?;
    let camp = state
        .camps()
        .set_inventory_item(camp_id, &req.item, req.quantity, req.unit.as_deref())
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(camp))
}

/// PATCH /v1/camps/{camp_id}/capacity
async fn set_capacity(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(camp_id): Path<String>,
    Json(req): Json<SetCapacityRequest>,
) -> Result<Json<Camp>, ApiError> {
    let camp_id: CampId = ctx.parse_id(&camp_id, CampId::KIND)?;
    let camp = state
        .camps()
        .set_capacity(camp_id, req.total, req.current_occupancy)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(camp))
}
