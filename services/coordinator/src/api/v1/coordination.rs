//! Cross-store read views.

use axum::{extract::State, routing::get, Json, Router};

use super::ListResponse;
use crate::state::AppState;
use crate::store::PrioritizedCamp;

pub fn routes() -> Router<AppState> {
    Router::new().route("/priority-camps", get(priority_camps))
}

/// GET /v1/coordination/priority-camps
///
/// Camps ordered by presentation score, most urgent first.
async fn priority_camps(State(state): State<AppState>) -> Json<ListResponse<PrioritizedCamp>> {
    Json(state.camps().priority_view().await.into())
}
