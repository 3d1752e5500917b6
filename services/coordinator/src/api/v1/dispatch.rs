//! Dispatch API endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use super::ListResponse;
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::dispatch::{Candidate, MatchQuery};
use crate::geo::GeoPoint;
use crate::state::AppState;
use crate::store::CoordinationError;

pub fn routes() -> Router<AppState> {
    Router::new().route("/find-match", post(find_match))
}

/// Fields are optional so a missing one is reported as a typed validation
/// problem rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct FindMatchRequest {
    #[serde(default)]
    pub required_skill: Option<String>,
    /// `[lng, lat]`.
    #[serde(default)]
    pub camp_location: Option<GeoPoint>,
    #[serde(default)]
    pub max_distance_km: Option<f64>,
}

impl FindMatchRequest {
    fn into_query(self) -> Result<MatchQuery, CoordinationError> {
        let required_skill = self.required_skill.ok_or_else(|| {
            CoordinationError::validation("required_skill", "required_skill is missing")
        })?;
        let origin = self.camp_location.ok_or_else(|| {
            CoordinationError::validation("camp_location", "camp_location is missing")
        })?;
        let max_distance_km = self.max_distance_km.ok_or_else(|| {
            CoordinationError::validation("max_distance_km", "max_distance_km is missing")
        })?;
        Ok(MatchQuery {
            required_skill,
            origin,
            max_distance_km,
        })
    }
}

/// POST /v1/dispatch/find-match
///
/// Up to ten Available volunteers with the skill, nearest first. An empty
/// list is a normal answer.
async fn find_match(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<FindMatchRequest>,
) -> Result<Json<ListResponse<Candidate>>, ApiError> {
    let query = req
        .into_query()
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    let matches = state
        .matcher()
        .find_matches(&query)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(matches.into()))
}
