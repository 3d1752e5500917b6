//! Volunteer API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use relief_events::VolunteerStatus;
use relief_id::VolunteerId;
use serde::Deserialize;

use super::tasks::{TaskResponse, TaskView};
use super::ListResponse;
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::geo::GeoPoint;
use crate::state::AppState;
use crate::store::{NewVolunteer, Volunteer, VolunteerFilter};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_volunteers).post(register_volunteer))
        .route("/{volunteer_id}", get(get_volunteer))
        .route("/{volunteer_id}/status", patch(set_status))
        .route("/{volunteer_id}/tasks", get(list_volunteer_tasks))
}

#[derive(Debug, Deserialize)]
pub struct ListVolunteersQuery {
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request to change availability and, optionally, position.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
    #[serde(default)]
    pub current_location: Option<GeoPoint>,
}

fn parse_status(raw: &str, request_id: &str) -> Result<VolunteerStatus, ApiError> {
    raw.parse().map_err(|e: relief_events::EventError| {
        ApiError::bad_request("invalid_status", e.to_string()).with_request_id(request_id)
    })
}

/// GET /v1/volunteers?skill=&status=
async fn list_volunteers(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListVolunteersQuery>,
) -> Result<Json<ListResponse<Volunteer>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| parse_status(s, &ctx.request_id))
        .transpose()?;
    let filter = VolunteerFilter {
        skill: query.skill,
        status,
    };
    Ok(Json(state.volunteers().list(&filter).await.into()))
}

/// POST /v1/volunteers
async fn register_volunteer(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<NewVolunteer>,
) -> Result<impl IntoResponse, ApiError> {
    let volunteer = state
        .volunteers()
        .register(req)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok((StatusCode::CREATED, Json(volunteer)))
}

/// GET /v1/volunteers/{volunteer_id}
async fn get_volunteer(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(volunteer_id): Path<String>,
) -> Result<Json<Volunteer>, ApiError> {
    let volunteer_id: VolunteerId = ctx.parse_id(&volunteer_id, VolunteerId::KIND)?;
    let volunteer = state
        .volunteers()
        .get(volunteer_id)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(volunteer))
}

/// PATCH /v1/volunteers/{volunteer_id}/status
async fn set_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(volunteer_id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<Volunteer>, ApiError> {
    let volunteer_id: VolunteerId = ctx.parse_id(&volunteer_id, VolunteerId::KIND)?;
    let status = parse_status(&req.status, &ctx.request_id)?;
    let volunteer = state
        .volunteers()
        .set_status(volunteer_id, status, req.current_location)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(volunteer))
}

/// GET /v1/volunteers/{volunteer_id}/tasks
///
/// Newest first.
async fn list_volunteer_tasks(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(volunteer_id): Path<String>,
) -> Result<Json<ListResponse<TaskResponse>>, ApiError> {
    let volunteer_id: VolunteerId = ctx.parse_id(&volunteer_id, VolunteerId::KIND)?;
    state
        .volunteers()
        .get(volunteer_id)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    let tasks = state.tasks().list_for_volunteer(volunteer_id).await;
    let view = TaskView::new(&state).await;
    Ok(Json(view.render_all(tasks).into()))
}
